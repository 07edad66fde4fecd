use serde::{Deserialize, Serialize};

use crate::store::{Collection, Record, StorageError};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct KeywordCategory {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    pub color: String,
    pub description: Option<String>,
}

impl Record for KeywordCategory {
    fn id(&self) -> &str {
        &self.id
    }
}

impl KeywordCategory {
    pub fn new(name: &str, color: &str, description: Option<&str>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            color: color.trim().to_string(),
            description: description.map(String::from),
        }
    }

    pub fn list(categories: &Collection<Self>) -> Vec<Self> {
        let mut all = categories.load_all();
        all.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        all
    }

    pub fn find_by_name(categories: &[Self], name: &str) -> Option<Self> {
        categories.iter().find(|c| c.name == name).cloned()
    }

    pub fn create(categories: &Collection<Self>, form: &CategoryForm) -> Result<Self, StorageError> {
        if form.name.trim().is_empty() {
            return Err(StorageError("Category name must not be empty".into()));
        }
        let cat = Self::new(&form.name, &form.color, form.description.as_deref());
        categories.upsert(cat.clone())?;
        Ok(cat)
    }

    /// Returns `None` when no category has that id.
    pub fn update(
        categories: &Collection<Self>,
        id: &str,
        form: &CategoryForm,
    ) -> Result<Option<Self>, StorageError> {
        if form.name.trim().is_empty() {
            return Err(StorageError("Category name must not be empty".into()));
        }
        let Some(existing) = categories.find(id) else {
            return Ok(None);
        };
        let updated = Self {
            name: form.name.trim().to_string(),
            color: form.color.trim().to_string(),
            description: form.description.clone(),
            ..existing
        };
        categories.upsert(updated.clone())?;
        Ok(Some(updated))
    }

    /// Keywords keep pointing at the deleted name; nothing cascades.
    pub fn delete(categories: &Collection<Self>, id: &str) -> Result<bool, StorageError> {
        categories.delete(id)
    }
}
