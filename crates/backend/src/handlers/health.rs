use std::time::Instant;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use once_cell::sync::Lazy;
use serde_json::json;

use crate::shared::data::db;

static START: Lazy<Instant> = Lazy::new(Instant::now);

/// Fija el instante de arranque; se llama una vez desde `main` para que el
/// uptime no dependa de la primera petición al endpoint.
pub fn mark_start() {
    Lazy::force(&START);
}

/// GET /health
pub async fn health() -> Response {
    match db::ping().await {
        Ok(()) => Json(json!({
            "status": "ok",
            "db": "connected",
            "uptime": START.elapsed().as_secs(),
            "version": env!("CARGO_PKG_VERSION"),
        }))
        .into_response(),
        Err(err) => {
            tracing::error!("Health check sin base de datos: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "DOWN", "error": err.to_string() })),
            )
                .into_response()
        }
    }
}
