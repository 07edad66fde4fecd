use std::sync::Arc;

use rocket::serde::json::Json;
use rocket::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::analysis::{AnalysisKind, SavedAnalysis};
use crate::models::cluster::ClusterResult;
use crate::store::{BlobStore, Collection, SAVED_ANALYSES_KEY};

use super::failure;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAnalysisRequest {
    #[serde(rename = "type")]
    pub kind: AnalysisKind,
    pub name: String,
    #[serde(default)]
    pub primary_keyword: String,
    #[serde(default)]
    pub data: Vec<Value>,
    /// A cluster generation result; its groups become `data` and its main
    /// keyword fills in a missing `primaryKeyword`.
    pub cluster: Option<ClusterResult>,
}

impl SaveAnalysisRequest {
    fn into_analysis(self) -> Result<SavedAnalysis, &'static str> {
        let mut primary = self.primary_keyword.trim().to_string();
        let mut data = self.data;
        if let Some(cluster) = self.cluster {
            if primary.is_empty() {
                primary = cluster.main_keyword.trim().to_string();
            }
            data = cluster.to_rows();
        }
        if self.name.trim().is_empty() {
            return Err("Analysis name is required");
        }
        if primary.is_empty() {
            return Err("Primary keyword is required");
        }
        Ok(SavedAnalysis::new(self.kind, self.name.trim(), &primary, data))
    }
}

fn collection(blobs: &State<Arc<dyn BlobStore>>) -> Collection<SavedAnalysis> {
    Collection::new(blobs.inner().clone(), SAVED_ANALYSES_KEY)
}

/// Oldest first, optionally narrowed to one kind (`intent` or `cluster`).
#[get("/analyses?<kind>")]
pub fn list(blobs: &State<Arc<dyn BlobStore>>, kind: Option<&str>) -> Json<Value> {
    let mut analyses = collection(blobs).load_all();
    if let Some(name) = kind {
        let Some(kind) = AnalysisKind::from_str(name) else {
            return Json(json!({"success": false, "error": format!("Unknown analysis type: {}", name)}));
        };
        analyses.retain(|a| a.kind == kind);
    }
    Json(json!({"success": true, "analyses": analyses}))
}

#[post("/analyses", format = "json", data = "<body>")]
pub fn save(blobs: &State<Arc<dyn BlobStore>>, body: Json<SaveAnalysisRequest>) -> Json<Value> {
    let analysis = match body.into_inner().into_analysis() {
        Ok(a) => a,
        Err(msg) => return Json(json!({"success": false, "error": msg})),
    };
    match collection(blobs).upsert(analysis.clone()) {
        Ok(()) => Json(json!({"success": true, "analysis": analysis})),
        Err(e) => failure("Failed to save analysis", &e),
    }
}

#[delete("/analyses/<id>")]
pub fn delete(blobs: &State<Arc<dyn BlobStore>>, id: &str) -> Json<Value> {
    match collection(blobs).delete(id) {
        Ok(deleted) => Json(json!({"success": true, "deleted": deleted})),
        Err(e) => failure("Failed to delete analysis", &e),
    }
}

pub fn routes() -> Vec<rocket::Route> {
    routes![list, save, delete]
}
