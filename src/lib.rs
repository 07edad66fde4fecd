#[macro_use]
extern crate rocket;

pub mod ai;
pub mod boot;
pub mod config;
pub mod export;
pub mod extract;
pub mod models;
pub mod preview;
pub mod routes;
pub mod store;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use rocket::{Build, Rocket};

use crate::ai::AiGateway;
use crate::config::AppConfig;
use crate::store::{BlobStore, DirBlobStore, KeywordFile};

/// Assemble the server. Everything the routes touch is created here from
/// `config` and handed over as managed state.
pub fn build(config: AppConfig) -> Rocket<Build> {
    let keywords = KeywordFile::new(config.keywords_file());
    let local_dir = config.local_dir();
    log::info!("Keyword store: {}", keywords.path().display());
    log::info!("Local storage: {}", local_dir.display());

    let blobs: Arc<dyn BlobStore> = Arc::new(DirBlobStore::new(local_dir));
    let gateway = AiGateway::new(config.ai);

    rocket::build()
        .manage(gateway)
        .manage(keywords)
        .manage(blobs)
        .mount("/api", routes::routes())
        .register("/api", routes::catchers())
}
