//! The single-page front-end, compiled into the binary.

use axum::response::Html;

pub async fn ui_handler() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}
