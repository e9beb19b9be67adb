//! Embedded static assets.

use axum::response::IntoResponse;
use http::header::CONTENT_TYPE;

use crate::templates::STYLESHEET;

pub async fn stylesheet() -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}
