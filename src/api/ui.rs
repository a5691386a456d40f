//! Embedded single-page UI
//!
//! One form: rule text, API key, threshold, and display cap. The page
//! calls the JSON API and renders the report as a table.

use actix_web::{get, HttpResponse, Responder};

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Serve the analysis form
#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(INDEX_HTML)
}

/// Configure UI routes
pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(index);
}
