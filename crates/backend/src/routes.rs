use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::handlers;

/// Configuración de todos los routes de la aplicación
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        // ========================================
        // FACTURAS (solo lectura)
        // ========================================
        .route("/api/facturas", get(handlers::a001_factura::listar))
        .route(
            "/api/facturas/facDetail",
            get(handlers::a001_factura::obtener_una),
        )
        .route(
            "/api/facturas/facDetailOnly",
            get(handlers::a001_factura::solo_detalles),
        )
        // ========================================
        // ALBARANES (solo lectura)
        // ========================================
        .route("/api/albaranes", get(handlers::a002_albaran::listar))
        .route(
            "/api/albaranes/alDetail",
            get(handlers::a002_albaran::obtener_una),
        )
        .route(
            "/api/albaranes/alDetailOnly",
            get(handlers::a002_albaran::solo_detalles),
        )
        // ========================================
        // CLIENTES (solo lectura)
        // ========================================
        .route("/api/clientes", get(handlers::a003_cliente::listar))
        .route(
            "/api/clientes/cliente",
            get(handlers::a003_cliente::obtener_uno),
        )
        // ========================================
        // DESPACHOS (lectura + ingesta por lotes)
        // ========================================
        .route("/api/despachos", get(handlers::a004_despacho::listar))
        .route(
            "/api/despachos/despDetail",
            get(handlers::a004_despacho::despacho_completo),
        )
        .route(
            "/api/despachos/subirDespachos",
            post(handlers::a004_despacho::subir),
        )
        // Manejo del 404
        .fallback(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Ruta no encontrada" })),
            )
        })
}
