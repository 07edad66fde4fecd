use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::category::KeywordCategory;
use crate::store::Record;

/// Coarse search-purpose classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Informational,
    Navigational,
    Transactional,
    Commercial,
}

impl Intent {
    pub const ALL: [Intent; 4] = [
        Intent::Informational,
        Intent::Navigational,
        Intent::Transactional,
        Intent::Commercial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Informational => "informational",
            Self::Navigational => "navigational",
            Self::Transactional => "transactional",
            Self::Commercial => "commercial",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Keyword {
    #[serde(default)]
    pub id: String,
    pub keyword: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
    /// 0.0 (open) to 1.0 (saturated).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competition: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpc: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Record for Keyword {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Keyword {
    pub fn new(keyword: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            keyword: keyword.trim().to_string(),
            volume: None,
            competition: None,
            cpc: None,
            category: None,
            tags: BTreeSet::new(),
            notes: None,
        }
    }

    /// Lower-cased keyword text; the natural key used when merging saves.
    pub fn merge_key(&self) -> String {
        self.keyword.trim().to_lowercase()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.keyword.trim().is_empty() {
            return Err("Keyword text must not be empty".into());
        }
        if let Some(c) = self.competition {
            if !(0.0..=1.0).contains(&c) {
                return Err(format!(
                    "Competition for '{}' must be between 0 and 1, got {}",
                    self.keyword, c
                ));
            }
        }
        Ok(())
    }
}

fn normalize_tag(tag: &str) -> Option<String> {
    let t = tag.trim().to_lowercase();
    if t.is_empty() {
        None
    } else {
        Some(t)
    }
}

// ── Bulk Operations ───────────────────────────────────

/// Set (or clear, with `None`) the category of every keyword whose id is in
/// `ids`. The name must exist in `categories`. Returns how many changed.
pub fn assign_category(
    keywords: &mut [Keyword],
    ids: &[String],
    category: Option<&str>,
    categories: &[KeywordCategory],
) -> Result<usize, String> {
    if let Some(name) = category {
        if !categories.iter().any(|c| c.name == name) {
            return Err(format!("Unknown category: {}", name));
        }
    }
    let ids: HashSet<&str> = ids.iter().map(String::as_str).collect();
    let mut changed = 0;
    for kw in keywords.iter_mut().filter(|k| ids.contains(k.id.as_str())) {
        kw.category = category.map(String::from);
        changed += 1;
    }
    Ok(changed)
}

pub fn add_tags(keywords: &mut [Keyword], ids: &[String], tags: &[String]) -> usize {
    let ids: HashSet<&str> = ids.iter().map(String::as_str).collect();
    let tags: Vec<String> = tags.iter().filter_map(|t| normalize_tag(t)).collect();
    let mut changed = 0;
    for kw in keywords.iter_mut().filter(|k| ids.contains(k.id.as_str())) {
        let before = kw.tags.len();
        kw.tags.extend(tags.iter().cloned());
        if kw.tags.len() != before {
            changed += 1;
        }
    }
    changed
}

pub fn remove_tags(keywords: &mut [Keyword], ids: &[String], tags: &[String]) -> usize {
    let ids: HashSet<&str> = ids.iter().map(String::as_str).collect();
    let tags: Vec<String> = tags.iter().filter_map(|t| normalize_tag(t)).collect();
    let mut changed = 0;
    for kw in keywords.iter_mut().filter(|k| ids.contains(k.id.as_str())) {
        let before = kw.tags.len();
        kw.tags.retain(|t| !tags.contains(t));
        if kw.tags.len() != before {
            changed += 1;
        }
    }
    changed
}

/// One line of a categorization answer from the model.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CategorizationResult {
    pub keyword: String,
    pub category: String,
}

/// Apply model-proposed categories. Keywords are matched case-insensitively;
/// category names the set does not contain are skipped.
pub fn apply_categorization(
    keywords: &mut [Keyword],
    results: &[CategorizationResult],
    categories: &[KeywordCategory],
) -> usize {
    let mut applied = 0;
    for result in results {
        let Some(category) = categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(result.category.trim()))
        else {
            log::debug!("Skipping unknown category '{}' for '{}'", result.category, result.keyword);
            continue;
        };
        let key = result.keyword.trim().to_lowercase();
        for kw in keywords.iter_mut().filter(|k| k.merge_key() == key) {
            kw.category = Some(category.name.clone());
            applied += 1;
        }
    }
    applied
}

// ── Filtering ─────────────────────────────────────────

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordFilter {
    /// Case-insensitive substring of the keyword text.
    pub query: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub min_volume: Option<u64>,
    pub max_competition: Option<f64>,
}

impl KeywordFilter {
    pub fn matches(&self, kw: &Keyword) -> bool {
        if let Some(q) = self.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            if !kw.keyword.to_lowercase().contains(&q.to_lowercase()) {
                return false;
            }
        }
        if let Some(cat) = &self.category {
            if kw.category.as_deref() != Some(cat.as_str()) {
                return false;
            }
        }
        if let Some(tag) = self.tag.as_deref().and_then(normalize_tag) {
            if !kw.tags.contains(&tag) {
                return false;
            }
        }
        if let Some(min) = self.min_volume {
            if kw.volume.unwrap_or(0) < min {
                return false;
            }
        }
        if let Some(max) = self.max_competition {
            match kw.competition {
                Some(c) if c <= max => {}
                _ => return false,
            }
        }
        true
    }

    pub fn apply<'a>(&self, keywords: &'a [Keyword]) -> Vec<&'a Keyword> {
        keywords.iter().filter(|k| self.matches(k)).collect()
    }
}
