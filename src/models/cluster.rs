use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ClusterGroup {
    pub title: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Output of one cluster generation call. Transient unless wrapped in a
/// saved analysis.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterResult {
    pub main_keyword: String,
    pub clusters: Vec<ClusterGroup>,
}

impl ClusterResult {
    /// Read a parsed model answer. A missing `mainKeyword` falls back to the
    /// requested one; groups without a title are dropped.
    pub fn from_value(value: &Value, requested: &str) -> Option<Self> {
        let clusters = value.get("clusters")?.as_array()?;
        let clusters: Vec<ClusterGroup> = clusters
            .iter()
            .filter_map(|g| serde_json::from_value::<ClusterGroup>(g.clone()).ok())
            .filter(|g| !g.title.trim().is_empty())
            .collect();
        let main_keyword = value
            .get("mainKeyword")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(requested)
            .to_string();
        Some(Self {
            main_keyword,
            clusters,
        })
    }

    /// Cluster groups as saved-analysis data rows.
    pub fn to_rows(&self) -> Vec<Value> {
        self.clusters
            .iter()
            .filter_map(|g| serde_json::to_value(g).ok())
            .collect()
    }
}
