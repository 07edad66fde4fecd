pub mod ai;
pub mod analyses;
pub mod categories;
pub mod keywords;
pub mod local;
pub mod preview;

use std::fmt::Display;

use rocket::serde::json::Json;
use rocket::{Request, State};
use serde_json::{json, Value};

use crate::ai::AiGateway;
use crate::store::KeywordFile;

/// Log the real cause, hand the client only `message`.
pub(crate) fn failure(message: &str, cause: &dyn Display) -> Json<Value> {
    log::error!("{}: {}", message, cause);
    Json(json!({"success": false, "error": message}))
}

#[get("/health")]
pub fn health(gateway: &State<AiGateway>, store: &State<KeywordFile>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "keywords": store.load_all().len(),
        "providers": gateway.status(),
    }))
}

pub fn routes() -> Vec<rocket::Route> {
    let mut all = routes![health];
    all.extend(keywords::routes());
    all.extend(categories::routes());
    all.extend(analyses::routes());
    all.extend(local::routes());
    all.extend(ai::routes());
    all.extend(preview::routes());
    all
}

// ── Catchers ──────────────────────────────────────────

#[catch(400)]
fn bad_request(_req: &Request) -> Json<Value> {
    Json(json!({"success": false, "error": "Bad request"}))
}

#[catch(404)]
fn not_found(_req: &Request) -> Json<Value> {
    Json(json!({"success": false, "error": "Not found"}))
}

#[catch(422)]
fn unprocessable(_req: &Request) -> Json<Value> {
    Json(json!({"success": false, "error": "Invalid request body"}))
}

#[catch(500)]
fn server_error(_req: &Request) -> Json<Value> {
    Json(json!({"success": false, "error": "Internal server error"}))
}

pub fn catchers() -> Vec<rocket::Catcher> {
    catchers![bad_request, not_found, unprocessable, server_error]
}
