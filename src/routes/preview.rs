use rocket::response::content::RawHtml;
use rocket::serde::json::Json;

use crate::preview::{render_preview, Snippet};

#[post("/preview", format = "json", data = "<body>")]
pub fn preview(body: Json<Snippet>) -> RawHtml<String> {
    RawHtml(render_preview(&body))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![preview]
}
