pub mod generate;
pub mod status;

use rocket::serde::json::Json;
use rocket::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ai::{prompts, AiError, AiGateway, AiRequest, AiResponse, Provider};
use crate::extract::{extract, strip_fences, Expected, Recovery};

// ── Helpers ───────────────────────────────────────────

/// Run one gateway call off the async workers; the HTTP client blocks.
pub(crate) async fn run_completion(gateway: &AiGateway, req: AiRequest) -> Result<AiResponse, AiError> {
    let gateway = gateway.clone();
    rocket::tokio::task::spawn_blocking(move || gateway.complete(&req))
        .await
        .map_err(|e| AiError::Transport(format!("AI task failed: {}", e)))?
}

/// Clamp a requested item count into a sane range.
pub(crate) fn clamp_count(requested: Option<u32>, default: u32, max: u32) -> u32 {
    requested.unwrap_or(default).clamp(1, max)
}

// ── Request Types ─────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    pub prompt: String,
    pub system: Option<String>,
    #[serde(default)]
    pub provider: Provider,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct OptimizePromptRequest {
    pub prompt: String,
    #[serde(default)]
    pub provider: Provider,
    pub model: Option<String>,
}

// ── Generic Proxy ─────────────────────────────────────

#[post("/openai", format = "json", data = "<body>")]
pub async fn openai_proxy(gateway: &State<AiGateway>, body: Json<ProxyRequest>) -> Json<Value> {
    let body = body.into_inner();
    if body.prompt.trim().is_empty() {
        return Json(json!({"success": false, "error": "Prompt is required"}));
    }

    let req = AiRequest {
        system: body
            .system
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "You are a helpful assistant.".to_string()),
        prompt: body.prompt,
        provider: body.provider,
        model: body.model,
        max_tokens: body.max_tokens,
        temperature: body.temperature,
    };

    match run_completion(gateway, req).await {
        Ok(resp) => Json(json!({
            "success": true,
            "text": resp.text,
            "provider": resp.provider,
            "model": resp.model,
        })),
        Err(e) => Json(json!({"success": false, "error": e.public_message()})),
    }
}

// ── Prompt Optimization ───────────────────────────────

#[post("/optimize-prompt", format = "json", data = "<body>")]
pub async fn optimize_prompt(
    gateway: &State<AiGateway>,
    body: Json<OptimizePromptRequest>,
) -> Json<Value> {
    let body = body.into_inner();
    if body.prompt.trim().is_empty() {
        return Json(json!({"success": false, "error": "Prompt is required"}));
    }

    let req = AiRequest {
        system: prompts::system(),
        prompt: prompts::optimize_prompt(&body.prompt),
        provider: body.provider,
        model: body.model,
        max_tokens: Some(1024),
        temperature: Some(0.7),
    };

    match run_completion(gateway, req).await {
        Ok(resp) => {
            let optimized = extract(&resp.text, Expected::Object, Recovery::Sentinel)
                .parsed()
                .and_then(|v| v.get("optimized").and_then(|o| o.as_str()).map(String::from))
                .filter(|s| !s.trim().is_empty())
                // models often answer with the bare rewritten prompt
                .unwrap_or_else(|| strip_fences(&resp.text));
            Json(json!({
                "success": true,
                "provider": resp.provider,
                "original": body.prompt,
                "optimized": optimized,
            }))
        }
        Err(e) => Json(json!({"success": false, "error": e.public_message()})),
    }
}

// ── Route Registration ────────────────────────────────

pub fn routes() -> Vec<rocket::Route> {
    routes![
        openai_proxy,
        optimize_prompt,
        generate::generate_prompts,
        generate::generate_clusters,
        generate::generate_domains,
        generate::generate_ad_copy,
        generate::generate_intent,
        status::ai_status,
    ]
}
