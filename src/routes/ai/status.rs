use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use crate::ai::AiGateway;

// ── Status Check ──────────────────────────────────────

#[get("/ai/status")]
pub fn ai_status(gateway: &State<AiGateway>) -> Json<Value> {
    let providers = gateway.status();
    let enabled = providers.iter().any(|p| p.configured);
    Json(json!({
        "enabled": enabled,
        "providers": providers,
    }))
}
