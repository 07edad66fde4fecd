use rocket::serde::json::Json;
use rocket::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ai::prompts::{self, PromptStyle};
use crate::ai::{AiError, AiGateway, AiRequest, Provider};
use crate::extract::{extract, sentinel, Expected, Extracted, Recovery, PARSE_FAILURE};
use crate::models::cluster::ClusterResult;
use crate::models::keyword::Intent;

use super::{clamp_count, run_completion};

// ── Request Types ─────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GeneratePromptsRequest {
    pub keyword: String,
    pub count: Option<u32>,
    #[serde(default)]
    pub style: PromptStyle,
    #[serde(default)]
    pub provider: Provider,
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRequest {
    pub keyword: String,
    pub cluster_count: Option<u32>,
    pub keywords_per_cluster: Option<u32>,
    #[serde(default)]
    pub provider: Provider,
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DomainRequest {
    pub keyword: String,
    pub count: Option<u32>,
    #[serde(default)]
    pub tlds: Vec<String>,
    #[serde(default)]
    pub provider: Provider,
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdCopyRequest {
    pub keyword: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub provider: Provider,
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IntentRequest {
    pub keyword: String,
    #[serde(default)]
    pub intents: Vec<Intent>,
    pub count: Option<u32>,
    #[serde(default)]
    pub provider: Provider,
    pub model: Option<String>,
}

fn missing_keyword() -> Json<Value> {
    Json(json!({"success": false, "error": "Keyword is required"}))
}

fn ai_failure(e: &AiError) -> Json<Value> {
    Json(json!({"success": false, "error": e.public_message()}))
}

/// Tag a successful reply with the provider that produced it.
fn with_provider(mut body: Value, provider: &str) -> Json<Value> {
    if body["success"] == true {
        body["provider"] = json!(provider);
    }
    Json(body)
}

fn parse_failure(sentinel: Value) -> Value {
    json!({"success": false, "error": PARSE_FAILURE, "sentinel": sentinel})
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

// ── Reply Mapping ─────────────────────────────────────

pub(crate) fn prompts_reply(text: &str) -> Value {
    match extract(text, Expected::Object, Recovery::Sentinel) {
        Extracted::Parsed(parsed) => json!({
            "success": true,
            "prompts": string_list(parsed.get("prompts")),
        }),
        other => parse_failure(other.into_value()),
    }
}

/// A parsed object without a usable `clusters` array is a parse failure too.
pub(crate) fn clusters_reply(text: &str, keyword: &str) -> Value {
    match extract(text, Expected::Object, Recovery::Sentinel) {
        Extracted::Parsed(v) => match ClusterResult::from_value(&v, keyword) {
            Some(result) => json!({"success": true, "result": result}),
            None => parse_failure(sentinel(text)),
        },
        other => parse_failure(other.into_value()),
    }
}

/// Flat list: a lossy comma split beats an error here.
pub(crate) fn domains_reply(text: &str) -> Value {
    let extracted = extract(text, Expected::Array, Recovery::SplitList);
    let recovered = matches!(extracted, Extracted::Recovered(_));
    let domains = string_list(Some(&extracted.into_value()));
    json!({
        "success": true,
        "recovered": recovered,
        "domains": domains,
    })
}

pub(crate) fn ad_copy_reply(text: &str) -> Value {
    match extract(text, Expected::Object, Recovery::Sentinel) {
        Extracted::Parsed(parsed) => json!({
            "success": true,
            "headlines": string_list(parsed.get("headlines")),
            "descriptions": string_list(parsed.get("descriptions")),
            "callToAction": parsed.get("callToAction").and_then(|v| v.as_str()).unwrap_or(""),
        }),
        other => parse_failure(other.into_value()),
    }
}

/// Rows whose intent is outside `allowed` (compared case-insensitively) are
/// dropped.
pub(crate) fn intent_reply(text: &str, allowed: &[Intent]) -> Value {
    let parsed = match extract(text, Expected::Object, Recovery::Sentinel) {
        Extracted::Parsed(parsed) => parsed,
        other => return parse_failure(other.into_value()),
    };
    let rows: Vec<Value> = parsed
        .get("keywords")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter(|row| {
                    row.get("intent")
                        .and_then(|i| i.as_str())
                        .map(|i| i.trim().to_lowercase())
                        .map(|i| allowed.iter().any(|a| a.as_str() == i))
                        .unwrap_or(false)
                })
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    json!({"success": true, "keywords": rows})
}

// ── Design Prompts ────────────────────────────────────

#[post("/generate/prompts", format = "json", data = "<body>")]
pub async fn generate_prompts(
    gateway: &State<AiGateway>,
    body: Json<GeneratePromptsRequest>,
) -> Json<Value> {
    let body = body.into_inner();
    let keyword = body.keyword.trim();
    if keyword.is_empty() {
        return missing_keyword();
    }

    let req = AiRequest {
        system: prompts::system(),
        prompt: prompts::generate_prompts(keyword, clamp_count(body.count, 5, 20), body.style),
        provider: body.provider,
        model: body.model.clone(),
        max_tokens: Some(2048),
        temperature: Some(0.9),
    };

    match run_completion(gateway, req).await {
        Ok(resp) => with_provider(prompts_reply(&resp.text), &resp.provider),
        Err(e) => ai_failure(&e),
    }
}

// ── Keyword Clusters ──────────────────────────────────

#[post("/generate/clusters", format = "json", data = "<body>")]
pub async fn generate_clusters(gateway: &State<AiGateway>, body: Json<ClusterRequest>) -> Json<Value> {
    let body = body.into_inner();
    let keyword = body.keyword.trim();
    if keyword.is_empty() {
        return missing_keyword();
    }

    let req = AiRequest {
        system: prompts::system(),
        prompt: prompts::keyword_clusters(
            keyword,
            clamp_count(body.cluster_count, 5, 12),
            clamp_count(body.keywords_per_cluster, 8, 25),
        ),
        provider: body.provider,
        model: body.model.clone(),
        max_tokens: Some(3000),
        temperature: Some(0.7),
    };

    match run_completion(gateway, req).await {
        Ok(resp) => with_provider(clusters_reply(&resp.text, keyword), &resp.provider),
        Err(e) => ai_failure(&e),
    }
}

// ── Domain Names ──────────────────────────────────────

#[post("/generate/domains", format = "json", data = "<body>")]
pub async fn generate_domains(gateway: &State<AiGateway>, body: Json<DomainRequest>) -> Json<Value> {
    let body = body.into_inner();
    let keyword = body.keyword.trim();
    if keyword.is_empty() {
        return missing_keyword();
    }

    let req = AiRequest {
        system: prompts::system(),
        prompt: prompts::domain_names(keyword, clamp_count(body.count, 10, 50), &body.tlds),
        provider: body.provider,
        model: body.model.clone(),
        max_tokens: Some(1024),
        temperature: Some(0.9),
    };

    match run_completion(gateway, req).await {
        Ok(resp) => with_provider(domains_reply(&resp.text), &resp.provider),
        Err(e) => ai_failure(&e),
    }
}

// ── Ad Copy ───────────────────────────────────────────

#[post("/generate/ad-copy", format = "json", data = "<body>")]
pub async fn generate_ad_copy(gateway: &State<AiGateway>, body: Json<AdCopyRequest>) -> Json<Value> {
    let body = body.into_inner();
    let keyword = body.keyword.trim();
    if keyword.is_empty() {
        return missing_keyword();
    }

    let req = AiRequest {
        system: prompts::system(),
        prompt: prompts::ad_copy(keyword, &body.product, &body.tone),
        provider: body.provider,
        model: body.model.clone(),
        max_tokens: Some(1024),
        temperature: Some(0.8),
    };

    match run_completion(gateway, req).await {
        Ok(resp) => with_provider(ad_copy_reply(&resp.text), &resp.provider),
        Err(e) => ai_failure(&e),
    }
}

// ── Intent Analysis ───────────────────────────────────

#[post("/generate/intent", format = "json", data = "<body>")]
pub async fn generate_intent(gateway: &State<AiGateway>, body: Json<IntentRequest>) -> Json<Value> {
    let body = body.into_inner();
    let keyword = body.keyword.trim();
    if keyword.is_empty() {
        return missing_keyword();
    }
    let allowed: Vec<Intent> = if body.intents.is_empty() {
        Intent::ALL.to_vec()
    } else {
        body.intents.clone()
    };

    let req = AiRequest {
        system: prompts::system(),
        prompt: prompts::intent_analysis(keyword, &allowed, clamp_count(body.count, 20, 100)),
        provider: body.provider,
        model: body.model.clone(),
        max_tokens: Some(2048),
        temperature: Some(0.5),
    };

    match run_completion(gateway, req).await {
        Ok(resp) => with_provider(intent_reply(&resp.text, &allowed), &resp.provider),
        Err(e) => ai_failure(&e),
    }
}
