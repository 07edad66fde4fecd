use std::sync::Arc;

use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use crate::models::category::{CategoryForm, KeywordCategory};
use crate::store::{BlobStore, Collection, CATEGORIES_KEY};

use super::failure;

fn collection(blobs: &State<Arc<dyn BlobStore>>) -> Collection<KeywordCategory> {
    Collection::new(blobs.inner().clone(), CATEGORIES_KEY)
}

fn missing_name() -> Json<Value> {
    Json(json!({"success": false, "error": "Category name is required"}))
}

#[get("/categories")]
pub fn list(blobs: &State<Arc<dyn BlobStore>>) -> Json<Value> {
    Json(json!({"success": true, "categories": KeywordCategory::list(&collection(blobs))}))
}

#[post("/categories", format = "json", data = "<form>")]
pub fn create(blobs: &State<Arc<dyn BlobStore>>, form: Json<CategoryForm>) -> Json<Value> {
    if form.name.trim().is_empty() {
        return missing_name();
    }
    match KeywordCategory::create(&collection(blobs), &form) {
        Ok(category) => Json(json!({"success": true, "category": category})),
        Err(e) => failure("Failed to create category", &e),
    }
}

#[put("/categories/<id>", format = "json", data = "<form>")]
pub fn update(blobs: &State<Arc<dyn BlobStore>>, id: &str, form: Json<CategoryForm>) -> Json<Value> {
    if form.name.trim().is_empty() {
        return missing_name();
    }
    match KeywordCategory::update(&collection(blobs), id, &form) {
        Ok(Some(category)) => Json(json!({"success": true, "category": category})),
        Ok(None) => Json(json!({"success": false, "error": "Category not found"})),
        Err(e) => failure("Failed to update category", &e),
    }
}

/// Keywords assigned to the category keep its name.
#[delete("/categories/<id>")]
pub fn delete(blobs: &State<Arc<dyn BlobStore>>, id: &str) -> Json<Value> {
    match KeywordCategory::delete(&collection(blobs), id) {
        Ok(deleted) => Json(json!({"success": true, "deleted": deleted})),
        Err(e) => failure("Failed to delete category", &e),
    }
}

pub fn routes() -> Vec<rocket::Route> {
    routes![list, create, update, delete]
}
