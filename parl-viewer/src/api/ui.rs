//! Static asset serving

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

const APP_CSS: &str = include_str!("../../ui/app.css");

/// GET /static/app.css
pub async fn serve_app_css() -> Response {
    (
        StatusCode::OK,
        [
            ("content-type", "text/css"),
            ("cache-control", "no-cache, no-store, must-revalidate"),
        ],
        APP_CSS,
    )
        .into_response()
}
