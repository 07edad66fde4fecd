use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Intent,
    Cluster,
}

impl AnalysisKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "intent" => Some(Self::Intent),
            "cluster" => Some(Self::Cluster),
            _ => None,
        }
    }
}

/// A named snapshot of an intent or cluster analysis, kept client-side.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedAnalysis {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AnalysisKind,
    pub name: String,
    pub primary_keyword: String,
    /// Shape depends on `kind`; stored as-is.
    pub data: Vec<Value>,
    /// RFC 3339 timestamp.
    pub date: String,
}

impl Record for SavedAnalysis {
    fn id(&self) -> &str {
        &self.id
    }
}

impl SavedAnalysis {
    pub fn new(kind: AnalysisKind, name: &str, primary_keyword: &str, data: Vec<Value>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            name: name.to_string(),
            primary_keyword: primary_keyword.to_string(),
            data,
            date: chrono::Utc::now().to_rfc3339(),
        }
    }
}
