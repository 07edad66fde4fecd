use log::error;

use vanguardista::boot;
use vanguardista::config::AppConfig;

#[rocket::launch]
fn rocket() -> _ {
    env_logger::init();

    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Boot check: create data directories, report missing credentials
    boot::run(&config);

    eprintln!("API mounted at: /api");

    vanguardista::build(config)
}
