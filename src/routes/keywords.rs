use std::io::Cursor;
use std::sync::Arc;

use rocket::http::{ContentType, Status};
use rocket::response::{self, status, Responder, Response};
use rocket::serde::json::Json;
use rocket::{Request, State};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ai::{prompts, AiGateway, AiRequest, Provider};
use crate::export::{self, ExportFormat};
use crate::extract::{extract, Expected, Recovery, PARSE_FAILURE};
use crate::models::category::KeywordCategory;
use crate::models::keyword::{
    add_tags, apply_categorization, assign_category, remove_tags, CategorizationResult, Keyword,
    KeywordFilter,
};
use crate::models::research::ResearchKeyword;
use crate::store::{BlobStore, Collection, KeywordFile, CATEGORIES_KEY};

use super::ai::run_completion;
use super::failure;

// ── Request Types ─────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    pub keywords: Vec<Keyword>,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub keywords: Vec<ResearchKeyword>,
}

/// `categories` may be omitted; the stored category set is used then.
#[derive(Debug, Deserialize)]
pub struct CategorizeRequest {
    pub keywords: Vec<Keyword>,
    #[serde(default)]
    pub categories: Vec<KeywordCategory>,
    #[serde(default)]
    pub provider: Provider,
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TagRequest {
    pub ids: Vec<String>,
    #[serde(default)]
    pub add: Vec<String>,
    #[serde(default)]
    pub remove: Vec<String>,
}

/// A `null` or missing category clears the assignment.
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub ids: Vec<String>,
    pub category: Option<String>,
}

// ── Download Response ─────────────────────────────────

/// A file body sent with `Content-Disposition: attachment`.
pub struct Download {
    pub body: String,
    pub content_type: ContentType,
    pub filename: String,
}

impl<'r> Responder<'r, 'static> for Download {
    fn respond_to(self, _req: &'r Request<'_>) -> response::Result<'static> {
        Response::build()
            .header(self.content_type)
            .raw_header(
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", self.filename),
            )
            .sized_body(self.body.len(), Cursor::new(self.body))
            .ok()
    }
}

// ── Load / Save / Delete ──────────────────────────────

#[get("/keywords/load")]
pub fn load(store: &State<KeywordFile>) -> Json<Value> {
    let keywords = store.load_all();
    Json(json!({"success": true, "keywords": keywords}))
}

#[post("/keywords/save", format = "json", data = "<body>")]
pub fn save(store: &State<KeywordFile>, body: Json<SaveRequest>) -> Json<Value> {
    let body = body.into_inner();
    if let Some(err) = body.keywords.iter().find_map(|k| k.validate().err()) {
        return Json(json!({"success": false, "error": err}));
    }
    match store.save(body.keywords) {
        Ok(keywords) => Json(json!({
            "success": true,
            "count": keywords.len(),
            "keywords": keywords,
        })),
        Err(e) => failure("Failed to save keywords", &e),
    }
}

#[delete("/keywords/<id>")]
pub fn delete(store: &State<KeywordFile>, id: &str) -> Json<Value> {
    match store.delete(id) {
        Ok(deleted) => Json(json!({"success": true, "deleted": deleted})),
        Err(e) => failure("Failed to delete keyword", &e),
    }
}

// ── Export ────────────────────────────────────────────

#[post("/keywords/export?<format>", data = "<body>")]
pub fn export_keywords(
    format: Option<&str>,
    body: Json<ExportRequest>,
) -> Result<Download, status::Custom<Json<Value>>> {
    let format_name = format.unwrap_or("json");
    let Some(format) = ExportFormat::from_str(format_name) else {
        return Err(status::Custom(
            Status::BadRequest,
            Json(json!({"success": false, "error": format!("Unsupported export format: {}", format_name)})),
        ));
    };

    let body = export::render(format, &body.keywords).map_err(|e| {
        log::error!("Keyword export failed: {}", e);
        status::Custom(
            Status::InternalServerError,
            Json(json!({"success": false, "error": "Export failed"})),
        )
    })?;

    let content_type = match format {
        ExportFormat::Json => ContentType::JSON,
        ExportFormat::Csv => ContentType::CSV,
    };

    Ok(Download {
        body,
        content_type,
        filename: export::filename(format, chrono::Utc::now().date_naive()),
    })
}

// ── Tags / Category Assignment / Filter ───────────────

#[post("/keywords/tags", format = "json", data = "<body>")]
pub fn tag_keywords(store: &State<KeywordFile>, body: Json<TagRequest>) -> Json<Value> {
    let mut keywords = store.load_all();
    let added = add_tags(&mut keywords, &body.ids, &body.add);
    let removed = remove_tags(&mut keywords, &body.ids, &body.remove);
    if added + removed > 0 {
        if let Err(e) = store.replace_all(&keywords) {
            return failure("Failed to update tags", &e);
        }
    }
    Json(json!({
        "success": true,
        "added": added,
        "removed": removed,
        "keywords": keywords,
    }))
}

#[post("/keywords/assign", format = "json", data = "<body>")]
pub fn assign_keywords(
    store: &State<KeywordFile>,
    blobs: &State<Arc<dyn BlobStore>>,
    body: Json<AssignRequest>,
) -> Json<Value> {
    let categories = Collection::<KeywordCategory>::new(blobs.inner().clone(), CATEGORIES_KEY).load_all();
    let mut keywords = store.load_all();
    let changed = match assign_category(&mut keywords, &body.ids, body.category.as_deref(), &categories) {
        Ok(n) => n,
        Err(e) => return Json(json!({"success": false, "error": e})),
    };
    if changed > 0 {
        if let Err(e) = store.replace_all(&keywords) {
            return failure("Failed to assign category", &e);
        }
    }
    Json(json!({"success": true, "changed": changed, "keywords": keywords}))
}

#[post("/keywords/filter", format = "json", data = "<body>")]
pub fn filter_keywords(store: &State<KeywordFile>, body: Json<KeywordFilter>) -> Json<Value> {
    let keywords = store.load_all();
    let hits = body.apply(&keywords);
    Json(json!({"success": true, "count": hits.len(), "keywords": hits}))
}

// ── Categorize ────────────────────────────────────────

/// Map a categorization answer onto `keywords`. Results naming a category the
/// set does not contain are ignored.
pub(crate) fn categorize_reply(
    text: &str,
    mut keywords: Vec<Keyword>,
    categories: &[KeywordCategory],
) -> Value {
    let Some(parsed) = extract(text, Expected::Object, Recovery::Sentinel).parsed() else {
        return json!({"success": false, "error": PARSE_FAILURE});
    };
    let results: Vec<CategorizationResult> = parsed
        .get("results")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|i| serde_json::from_value(i.clone()).ok())
                .collect()
        })
        .unwrap_or_default();

    let applied = apply_categorization(&mut keywords, &results, categories);
    log::info!("Categorized {} of {} keywords", applied, keywords.len());

    json!({
        "success": true,
        "applied": applied,
        "results": results,
        "keywords": keywords,
    })
}

#[post("/keywords/categorize", format = "json", data = "<body>")]
pub async fn categorize(
    gateway: &State<AiGateway>,
    blobs: &State<Arc<dyn BlobStore>>,
    body: Json<CategorizeRequest>,
) -> Json<Value> {
    let mut body = body.into_inner();
    if body.keywords.is_empty() {
        return Json(json!({"success": false, "error": "No keywords to categorize"}));
    }
    if body.categories.is_empty() {
        body.categories = Collection::<KeywordCategory>::new(blobs.inner().clone(), CATEGORIES_KEY).load_all();
    }
    if body.categories.is_empty() {
        return Json(json!({"success": false, "error": "At least one category is required"}));
    }

    let texts: Vec<String> = body.keywords.iter().map(|k| k.keyword.clone()).collect();
    let req = AiRequest {
        system: prompts::system(),
        prompt: prompts::categorize_keywords(&texts, &body.categories),
        provider: body.provider,
        model: body.model.clone(),
        max_tokens: Some(2048),
        temperature: Some(0.3),
    };

    match run_completion(gateway, req).await {
        Ok(resp) => {
            let mut reply = categorize_reply(&resp.text, body.keywords, &body.categories);
            if reply["success"] == true {
                reply["provider"] = json!(resp.provider);
            }
            Json(reply)
        }
        Err(e) => Json(json!({"success": false, "error": e.public_message()})),
    }
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        load,
        save,
        delete,
        export_keywords,
        tag_keywords,
        assign_keywords,
        filter_keywords,
        categorize
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Vec<KeywordCategory> {
        vec![
            KeywordCategory::new("Tarot", "#7c3aed", None),
            KeywordCategory::new("Crystals", "#0ea5e9", None),
        ]
    }

    #[test]
    fn categorize_applies_known_categories_only() {
        let keywords = vec![
            Keyword::new("Tarot Deck"),
            Keyword::new("rose quartz"),
            Keyword::new("sage bundle"),
        ];
        let text = r#"```json
{"results": [
  {"keyword": "tarot deck", "category": "tarot"},
  {"keyword": "rose quartz", "category": "Crystals"},
  {"keyword": "sage bundle", "category": "Herbs"}
]}
```"#;
        let body = categorize_reply(text, keywords, &categories());
        assert_eq!(body["success"], true);
        assert_eq!(body["applied"], 2);
        assert_eq!(body["results"].as_array().unwrap().len(), 3);
        assert_eq!(body["keywords"][0]["category"], "Tarot");
        assert_eq!(body["keywords"][1]["category"], "Crystals");
        assert!(body["keywords"][2].get("category").is_none());
    }

    #[test]
    fn categorize_unparseable_answer() {
        let body = categorize_reply("Sorry, no.", vec![Keyword::new("tarot")], &categories());
        assert_eq!(body, json!({"success": false, "error": PARSE_FAILURE}));
    }

    #[test]
    fn categorize_skips_malformed_rows() {
        let text = r#"{"results": [{"keyword": "tarot"}, {"keyword": "tarot", "category": "Tarot"}]}"#;
        let body = categorize_reply(text, vec![Keyword::new("tarot")], &categories());
        assert_eq!(body["applied"], 1);
        assert_eq!(body["results"].as_array().unwrap().len(), 1);
    }
}
