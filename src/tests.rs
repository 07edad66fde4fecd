#![cfg(test)]

use rocket::http::{ContentType, Status};
use rocket::local::blocking::Client;
use serde_json::{json, Value};

use crate::config::{AiConfig, AppConfig};
use crate::models::keyword::Keyword;
use crate::store::KeywordFile;

/// A server over a fresh temp data directory with no AI credentials, so every
/// AI route fails fast without touching the network.
fn test_client() -> (tempfile::TempDir, Client) {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = AppConfig {
        data_dir: dir.path().join("data"),
        ai: AiConfig::default(),
    };
    let client = Client::tracked(crate::build(config)).expect("valid rocket instance");
    (dir, client)
}

fn post_json(client: &Client, uri: &str, body: Value) -> (Status, Value) {
    let resp = client
        .post(uri.to_string())
        .header(ContentType::JSON)
        .body(body.to_string())
        .dispatch();
    let status = resp.status();
    (status, resp.into_json::<Value>().unwrap_or(Value::Null))
}

// ═══════════════════════════════════════════════════════════
// Keyword store
// ═══════════════════════════════════════════════════════════

#[test]
fn load_is_empty_on_a_fresh_install() {
    let (_dir, client) = test_client();
    let resp = client.get("/api/keywords/load").dispatch();
    assert_eq!(resp.status(), Status::Ok);
    let body: Value = resp.into_json().unwrap();
    assert_eq!(body, json!({"success": true, "keywords": []}));
}

#[test]
fn save_then_resave_with_different_case_keeps_one_entry() {
    let (dir, client) = test_client();

    let (_, first) = post_json(
        &client,
        "/api/keywords/save",
        json!({"keywords": [{"keyword": "Tarot", "volume": 100}]}),
    );
    assert_eq!(first["success"], true);
    assert_eq!(first["count"], 1);

    let (_, second) = post_json(
        &client,
        "/api/keywords/save",
        json!({"keywords": [{"id": "kw-2", "keyword": "tarot", "notes": "second"}]}),
    );
    assert_eq!(second["count"], 1);

    let body: Value = client.get("/api/keywords/load").dispatch().into_json().unwrap();
    let keywords = body["keywords"].as_array().unwrap();
    assert_eq!(keywords.len(), 1);
    assert_eq!(keywords[0], json!({"id": "kw-2", "keyword": "tarot", "notes": "second"}));

    // same data is visible straight from the file
    let file = KeywordFile::new(dir.path().join("data/keywords.json"));
    assert_eq!(file.load_all().len(), 1);
}

#[test]
fn saving_a_new_keyword_grows_the_store() {
    let (_dir, client) = test_client();
    post_json(&client, "/api/keywords/save", json!({"keywords": [{"keyword": "sage"}]}));
    let (_, body) = post_json(
        &client,
        "/api/keywords/save",
        json!({"keywords": [{"keyword": "palo santo"}]}),
    );
    assert_eq!(body["count"], 2);
}

#[test]
fn empty_keyword_text_is_rejected() {
    let (_dir, client) = test_client();
    let (status, body) = post_json(
        &client,
        "/api/keywords/save",
        json!({"keywords": [{"keyword": "   "}]}),
    );
    assert_eq!(status, Status::Ok);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("empty"));
}

#[test]
fn delete_keyword_by_id() {
    let (_dir, client) = test_client();
    let (_, saved) = post_json(
        &client,
        "/api/keywords/save",
        json!({"keywords": [{"id": "a", "keyword": "amethyst"}, {"id": "b", "keyword": "quartz"}]}),
    );
    assert_eq!(saved["count"], 2);

    let body: Value = client.delete("/api/keywords/a").dispatch().into_json().unwrap();
    assert_eq!(body, json!({"success": true, "deleted": true}));
    let body: Value = client.delete("/api/keywords/a").dispatch().into_json().unwrap();
    assert_eq!(body["deleted"], false);

    let body: Value = client.get("/api/keywords/load").dispatch().into_json().unwrap();
    assert_eq!(body["keywords"], json!([{"id": "b", "keyword": "quartz"}]));
}

#[test]
fn malformed_body_gets_json_error() {
    let (_dir, client) = test_client();
    let resp = client
        .post("/api/keywords/save")
        .header(ContentType::JSON)
        .body("{\"keywords\": \"nope\"}")
        .dispatch();
    assert_eq!(resp.status(), Status::UnprocessableEntity);
    let body: Value = resp.into_json().unwrap();
    assert_eq!(body["success"], false);
}

#[test]
fn keyword_round_trips_through_the_file_store() {
    let (dir, client) = test_client();
    let file = KeywordFile::new(dir.path().join("data/keywords.json"));
    let mut kw = Keyword::new("moon water");
    kw.tags.insert("ritual".into());
    file.save(vec![kw.clone()]).unwrap();

    let body: Value = client.get("/api/keywords/load").dispatch().into_json().unwrap();
    let loaded: Vec<Keyword> = serde_json::from_value(body["keywords"].clone()).unwrap();
    assert_eq!(loaded, vec![kw]);
}

#[test]
fn reused_id_does_not_shadow_another_keyword() {
    let (_dir, client) = test_client();
    post_json(&client, "/api/keywords/save", json!({"keywords": [{"id": "a", "keyword": "amethyst"}]}));
    let (_, body) = post_json(&client, "/api/keywords/save", json!({"keywords": [{"id": "a", "keyword": "quartz"}]}));
    assert_eq!(body["count"], 2);
    assert_ne!(body["keywords"][1]["id"], "a");

    client.delete("/api/keywords/a").dispatch();
    let body: Value = client.get("/api/keywords/load").dispatch().into_json().unwrap();
    assert_eq!(body["keywords"].as_array().unwrap().len(), 1);
    assert_eq!(body["keywords"][0]["keyword"], "quartz");
}

// ═══════════════════════════════════════════════════════════
// Tags, categories and filtering
// ═══════════════════════════════════════════════════════════

#[test]
fn category_crud_over_http() {
    let (dir, client) = test_client();
    let (_, created) = post_json(&client, "/api/categories", json!({"name": "Tarot", "color": "#7c3aed"}));
    assert_eq!(created["success"], true);
    let id = created["category"]["id"].as_str().unwrap().to_string();
    assert!(dir.path().join("data/local/vanguardista-keyword-categories.json").exists());

    let (_, body) = post_json(&client, "/api/categories", json!({"name": " ", "color": "#000"}));
    assert_eq!(body["error"], "Category name is required");

    let resp = client
        .put(format!("/api/categories/{}", id))
        .header(ContentType::JSON)
        .body(json!({"name": "Tarot & Oracle", "color": "#111"}).to_string())
        .dispatch();
    let body: Value = resp.into_json().unwrap();
    assert_eq!(body["category"]["name"], "Tarot & Oracle");

    let resp = client
        .put("/api/categories/missing")
        .header(ContentType::JSON)
        .body(json!({"name": "x", "color": "#111"}).to_string())
        .dispatch();
    let body: Value = resp.into_json().unwrap();
    assert_eq!(body["error"], "Category not found");

    let body: Value = client.get("/api/categories").dispatch().into_json().unwrap();
    assert_eq!(body["categories"].as_array().unwrap().len(), 1);

    let body: Value = client.delete(format!("/api/categories/{}", id)).dispatch().into_json().unwrap();
    assert_eq!(body["deleted"], true);
    let body: Value = client.get("/api/categories").dispatch().into_json().unwrap();
    assert_eq!(body["categories"], json!([]));
}

#[test]
fn tag_assign_and_filter_keywords() {
    let (_dir, client) = test_client();
    post_json(&client, "/api/categories", json!({"name": "Tarot", "color": "#7c3aed"}));
    post_json(
        &client,
        "/api/keywords/save",
        json!({"keywords": [
            {"id": "k1", "keyword": "tarot deck", "volume": 5000},
            {"id": "k2", "keyword": "tarot cloth", "volume": 300},
            {"id": "k3", "keyword": "sage bundle", "volume": 9000}
        ]}),
    );

    let (_, body) = post_json(
        &client,
        "/api/keywords/tags",
        json!({"ids": ["k1", "k2"], "add": ["Altar", "altar "]}),
    );
    assert_eq!(body["added"], 2);
    let (_, body) = post_json(&client, "/api/keywords/tags", json!({"ids": ["k1"], "remove": ["ALTAR"]}));
    assert_eq!(body["removed"], 1);

    let (_, body) = post_json(&client, "/api/keywords/assign", json!({"ids": ["k2"], "category": "Runes"}));
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Unknown category: Runes");
    let (_, body) = post_json(&client, "/api/keywords/assign", json!({"ids": ["k2"], "category": "Tarot"}));
    assert_eq!(body["changed"], 1);

    let (_, body) = post_json(
        &client,
        "/api/keywords/filter",
        json!({"query": "TAROT", "tag": "altar", "category": "Tarot"}),
    );
    assert_eq!(body["count"], 1);
    assert_eq!(body["keywords"][0]["id"], "k2");

    let (_, body) = post_json(&client, "/api/keywords/filter", json!({"minVolume": 1000}));
    assert_eq!(body["count"], 2);

    // edits were persisted
    let body: Value = client.get("/api/keywords/load").dispatch().into_json().unwrap();
    assert_eq!(body["keywords"][1]["tags"], json!(["altar"]));
    assert_eq!(body["keywords"][1]["category"], "Tarot");
    assert!(body["keywords"][0].get("tags").is_none());
}

#[test]
fn categorize_falls_back_to_stored_categories() {
    let (_dir, client) = test_client();
    post_json(&client, "/api/categories", json!({"name": "Tarot", "color": "#7c3aed"}));
    let (_, body) = post_json(
        &client,
        "/api/keywords/categorize",
        json!({"keywords": [{"keyword": "tarot"}]}),
    );
    // past the category check, stopped only by the missing credential
    assert!(body["error"].as_str().unwrap().contains("not configured"));
}

// ═══════════════════════════════════════════════════════════
// Saved analyses and local storage
// ═══════════════════════════════════════════════════════════

#[test]
fn saved_analyses_round_trip() {
    let (_dir, client) = test_client();
    let (_, saved) = post_json(
        &client,
        "/api/analyses",
        json!({
            "type": "cluster",
            "name": "Tarot map",
            "cluster": {"mainKeyword": "tarot", "clusters": [{"title": "Decks", "keywords": ["thoth deck"]}]}
        }),
    );
    assert_eq!(saved["success"], true);
    assert_eq!(saved["analysis"]["primaryKeyword"], "tarot");
    let id = saved["analysis"]["id"].as_str().unwrap().to_string();

    post_json(
        &client,
        "/api/analyses",
        json!({"type": "intent", "name": "Intent", "primaryKeyword": "sage", "data": [{"keyword": "buy sage", "intent": "transactional"}]}),
    );

    let body: Value = client.get("/api/analyses").dispatch().into_json().unwrap();
    assert_eq!(body["analyses"].as_array().unwrap().len(), 2);
    let body: Value = client.get("/api/analyses?kind=cluster").dispatch().into_json().unwrap();
    assert_eq!(body["analyses"].as_array().unwrap().len(), 1);
    assert_eq!(body["analyses"][0]["data"][0]["title"], "Decks");
    let body: Value = client.get("/api/analyses?kind=audit").dispatch().into_json().unwrap();
    assert_eq!(body["success"], false);

    let body: Value = client.delete(format!("/api/analyses/{}", id)).dispatch().into_json().unwrap();
    assert_eq!(body["deleted"], true);
    let body: Value = client.get("/api/analyses").dispatch().into_json().unwrap();
    assert_eq!(body["analyses"][0]["type"], "intent");
}

#[test]
fn local_storage_blobs_keep_their_shape() {
    let (_dir, client) = test_client();
    let body: Value = client.get("/api/local/vanguardista-users").dispatch().into_json().unwrap();
    assert_eq!(body["value"], json!({}));

    let put = |uri: &str, value: Value| {
        let resp = client
            .put(uri.to_string())
            .header(ContentType::JSON)
            .body(value.to_string())
            .dispatch();
        resp.status()
    };
    assert_eq!(put("/api/local/vanguardista-users", json!({"ada@example.com": {"name": "Ada"}})), Status::Ok);
    assert_eq!(put("/api/local/vanguardista-users", json!([])), Status::BadRequest);
    assert_eq!(put("/api/local/vanguardista-keyword-tags", json!([{"id": "t", "keyword": "sage"}])), Status::Ok);
    assert_eq!(put("/api/local/elsewhere", json!([])), Status::NotFound);

    let body: Value = client.get("/api/local/vanguardista-users").dispatch().into_json().unwrap();
    assert_eq!(body["value"]["ada@example.com"]["name"], "Ada");

    let resp = client.delete("/api/local/vanguardista-keyword-tags").dispatch();
    assert_eq!(resp.status(), Status::Ok);
    let body: Value = client.get("/api/local/vanguardista-keyword-tags").dispatch().into_json().unwrap();
    assert_eq!(body["value"], json!([]));
}

// ═══════════════════════════════════════════════════════════
// Export
// ═══════════════════════════════════════════════════════════

fn export_body() -> Value {
    json!({"keywords": [
        {"keyword": "tarot deck", "searchVolume": 1000, "tags": ["cards", "decks"], "intent": "transactional"},
        {"keyword": "crystal grid", "cpc": 0.75, "seasonality": ["Dec"]},
        {"keyword": "sage smudge"}
    ]})
}

#[test]
fn csv_export_is_a_download_with_header_and_rows() {
    let (_dir, client) = test_client();
    let resp = client
        .post("/api/keywords/export?format=csv")
        .header(ContentType::JSON)
        .body(export_body().to_string())
        .dispatch();
    assert_eq!(resp.status(), Status::Ok);
    assert_eq!(resp.content_type(), Some(ContentType::CSV));
    let disposition = resp.headers().get_one("Content-Disposition").unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"keywords-"));
    assert!(disposition.ends_with(".csv\""));

    let csv = resp.into_string().unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        "keyword,searchVolume,difficulty,cpc,competition,seasonality,intent,tags,source"
    );
    assert!(lines[1].contains("\"cards, decks\""));
}

#[test]
fn json_export_defaults_when_format_is_missing() {
    let (_dir, client) = test_client();
    let resp = client
        .post("/api/keywords/export")
        .header(ContentType::JSON)
        .body(export_body().to_string())
        .dispatch();
    assert_eq!(resp.status(), Status::Ok);
    assert!(resp
        .headers()
        .get_one("Content-Disposition")
        .unwrap()
        .ends_with(".json\""));
    let body: Value = resp.into_json().unwrap();
    assert_eq!(body.as_array().unwrap().len(), 3);
    assert_eq!(body[0]["searchVolume"], 1000);
}

#[test]
fn unknown_export_format_is_rejected() {
    let (_dir, client) = test_client();
    let (status, body) = post_json(&client, "/api/keywords/export?format=xml", export_body());
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["success"], false);
}

// ═══════════════════════════════════════════════════════════
// AI routes without credentials
// ═══════════════════════════════════════════════════════════

#[test]
fn proxy_without_credentials_reports_configuration_error() {
    let (_dir, client) = test_client();
    let (status, body) = post_json(&client, "/api/openai", json!({"prompt": "hello"}));
    assert_eq!(status, Status::Ok);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("OPENAI_API_KEY"));

    let (_, body) = post_json(
        &client,
        "/api/openai",
        json!({"prompt": "hello", "provider": "deepseek"}),
    );
    assert!(body["error"].as_str().unwrap().contains("DEEPSEEK_API_KEY"));
}

#[test]
fn generation_routes_validate_before_calling_out() {
    let (_dir, client) = test_client();
    for uri in [
        "/api/generate/prompts",
        "/api/generate/clusters",
        "/api/generate/domains",
        "/api/generate/ad-copy",
        "/api/generate/intent",
    ] {
        let (_, body) = post_json(&client, uri, json!({"keyword": "  "}));
        assert_eq!(body, json!({"success": false, "error": "Keyword is required"}), "{}", uri);

        let (_, body) = post_json(&client, uri, json!({"keyword": "tarot"}));
        assert_eq!(body["success"], false, "{}", uri);
        assert!(body["error"].as_str().unwrap().contains("not configured"), "{}", uri);
    }
}

#[test]
fn categorize_requires_categories() {
    let (_dir, client) = test_client();
    let (_, body) = post_json(
        &client,
        "/api/keywords/categorize",
        json!({"keywords": [{"keyword": "tarot"}], "categories": []}),
    );
    assert_eq!(body["error"], "At least one category is required");

    let (_, body) = post_json(
        &client,
        "/api/keywords/categorize",
        json!({
            "keywords": [{"keyword": "tarot"}],
            "categories": [{"id": "c1", "name": "Tarot", "color": "#000"}]
        }),
    );
    assert_eq!(body["success"], false);
}

#[test]
fn optimize_prompt_requires_text() {
    let (_dir, client) = test_client();
    let (_, body) = post_json(&client, "/api/optimize-prompt", json!({"prompt": ""}));
    assert_eq!(body["error"], "Prompt is required");
}

#[test]
fn status_and_health() {
    let (_dir, client) = test_client();
    let body: Value = client.get("/api/ai/status").dispatch().into_json().unwrap();
    assert_eq!(body["enabled"], false);
    assert_eq!(body["providers"][0]["provider"], "openai");

    let body: Value = client.get("/api/health").dispatch().into_json().unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["keywords"], 0);
}

// ═══════════════════════════════════════════════════════════
// Preview
// ═══════════════════════════════════════════════════════════

#[test]
fn preview_returns_html_page() {
    let (_dir, client) = test_client();
    let resp = client
        .post("/api/preview")
        .header(ContentType::JSON)
        .body(json!({"html": "<h1>Moon</h1>", "css": "h1{color:gold}"}).to_string())
        .dispatch();
    assert_eq!(resp.status(), Status::Ok);
    assert_eq!(resp.content_type(), Some(ContentType::HTML));
    let html = resp.into_string().unwrap();
    assert!(html.contains("<h1>Moon</h1>"));
    assert!(html.contains("h1{color:gold}"));
}

#[test]
fn unknown_route_is_json_404() {
    let (_dir, client) = test_client();
    let resp = client.get("/api/nope").dispatch();
    assert_eq!(resp.status(), Status::NotFound);
    let body: Value = resp.into_json().unwrap();
    assert_eq!(body["error"], "Not found");
}
