//! Raw access to the client-side blobs, one whole JSON document per fixed key.

use std::sync::Arc;

use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use crate::extract::Expected;
use crate::store::{BlobStore, CATEGORIES_KEY, KEYWORD_TAGS_KEY, SAVED_ANALYSES_KEY, USERS_KEY};

type Reply = Result<Json<Value>, status::Custom<Json<Value>>>;

/// The shape stored under `key`, or `None` for keys outside the fixed set.
pub(crate) fn shape_of(key: &str) -> Option<Expected> {
    match key {
        SAVED_ANALYSES_KEY | KEYWORD_TAGS_KEY | CATEGORIES_KEY => Some(Expected::Array),
        USERS_KEY => Some(Expected::Object),
        _ => None,
    }
}

fn empty(shape: Expected) -> Value {
    match shape {
        Expected::Array => json!([]),
        Expected::Object => json!({}),
    }
}

fn reject(code: Status, message: String) -> status::Custom<Json<Value>> {
    status::Custom(code, Json(json!({"success": false, "error": message})))
}

fn known(key: &str) -> Result<Expected, status::Custom<Json<Value>>> {
    shape_of(key).ok_or_else(|| reject(Status::NotFound, format!("Unknown storage key: {}", key)))
}

/// Missing or malformed blobs read as the empty shape.
#[get("/local/<key>")]
pub fn read(blobs: &State<Arc<dyn BlobStore>>, key: &str) -> Reply {
    let shape = known(key)?;
    let value = blobs
        .inner()
        .get(key)
        .and_then(|text| match serde_json::from_str::<Value>(&text) {
            Ok(v) if shape.matches(&v) => Some(v),
            _ => {
                log::warn!("Discarding malformed data under '{}'", key);
                None
            }
        })
        .unwrap_or_else(|| empty(shape));
    Ok(Json(json!({"success": true, "key": key, "value": value})))
}

#[put("/local/<key>", format = "json", data = "<body>")]
pub fn write(blobs: &State<Arc<dyn BlobStore>>, key: &str, body: Json<Value>) -> Reply {
    let shape = known(key)?;
    let value = body.into_inner();
    if !shape.matches(&value) {
        let kind = match shape {
            Expected::Array => "array",
            Expected::Object => "object",
        };
        return Err(reject(Status::BadRequest, format!("{} must hold a JSON {}", key, kind)));
    }
    match blobs.inner().set(key, &value.to_string()) {
        Ok(()) => Ok(Json(json!({"success": true}))),
        Err(e) => Ok(super::failure("Failed to write local storage", &e)),
    }
}

#[delete("/local/<key>")]
pub fn remove(blobs: &State<Arc<dyn BlobStore>>, key: &str) -> Reply {
    known(key)?;
    match blobs.inner().remove(key) {
        Ok(()) => Ok(Json(json!({"success": true}))),
        Err(e) => Ok(super::failure("Failed to clear local storage", &e)),
    }
}

pub fn routes() -> Vec<rocket::Route> {
    routes![read, write, remove]
}
