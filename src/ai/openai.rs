use serde_json::{json, Value};

use super::{resolve_model, AiError, AiRequest, AiResponse};
use crate::config::AiConfig;

pub fn call(config: &AiConfig, req: &AiRequest) -> Result<AiResponse, AiError> {
    let api_key = config.openai_api_key.as_deref().unwrap_or_default().trim();
    if api_key.is_empty() {
        return Err(AiError::Config(
            "OpenAI API key not configured (OPENAI_API_KEY)".into(),
        ));
    }

    let model = resolve_model(req.model.as_deref(), &config.openai_model);
    let url = format!("{}/chat/completions", config.openai_base_url.trim_end_matches('/'));

    chat_completion("openai", &url, api_key, &model, config.timeout_secs, req)
}

/// POST an OpenAI-style chat completion and return the first choice's text.
/// DeepSeek speaks the same protocol.
pub(super) fn chat_completion(
    provider: &'static str,
    url: &str,
    api_key: &str,
    model: &str,
    timeout_secs: u64,
    req: &AiRequest,
) -> Result<AiResponse, AiError> {
    let body = json!({
        "model": model,
        "messages": [
            {"role": "system", "content": req.system},
            {"role": "user", "content": req.prompt}
        ],
        "max_tokens": req.max_tokens.unwrap_or(1024),
        "temperature": req.temperature.unwrap_or(0.7)
    });

    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AiError::Transport(format!("HTTP client error: {}", e)))?;

    let resp = client
        .post(url)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .map_err(|e| AiError::Transport(format!("{} request failed: {}", provider, e)))?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let text = resp.text().unwrap_or_default();
        return Err(AiError::Provider {
            provider,
            status,
            message: error_message(&text),
        });
    }

    let json: Value = resp
        .json()
        .map_err(|e| AiError::Transport(format!("{} JSON parse error: {}", provider, e)))?;

    Ok(AiResponse {
        text: completion_text(&json),
        provider: provider.into(),
        model: model.to_string(),
    })
}

/// `error.message` from an error body, or the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

fn completion_text(json: &Value) -> String {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .unwrap_or("")
        .to_string()
}
