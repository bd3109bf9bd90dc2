use axum::extract::Query;
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a004_despacho::aggregate::{DespachoCompleto, DespachoConDocumentos};
use contracts::domain::a004_despacho::ingest::{DespachoEntrada, ResumenIngesta};
use contracts::shared::pagination::Paginated;
use contracts::shared::query::{DespachoKeyQuery, DespachoSearchQuery};

use crate::domain::a004_despacho::service;
use crate::shared::data::db;
use crate::shared::error::ApiError;

/// GET /api/despachos
pub async fn listar(
    Query(params): Query<DespachoSearchQuery>,
) -> Result<Json<Paginated<DespachoConDocumentos>>, ApiError> {
    let conn = db::acquire().await?;
    Ok(Json(service::listar(conn, &params).await?))
}

/// GET /api/despachos/despDetail?numDespacho=numDespacho
pub async fn despacho_completo(
    Query(params): Query<DespachoKeyQuery>,
) -> Result<Json<DespachoCompleto>, ApiError> {
    let conn = db::acquire().await?;
    service::despacho_completo(conn, &params)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Despacho no encontrado"))
}

/// POST /api/despachos/subirDespachos
pub async fn subir(
    Json(entrada): Json<DespachoEntrada>,
) -> Result<(StatusCode, Json<ResumenIngesta>), ApiError> {
    let conn = db::acquire().await?;
    let resumen = service::procesar_despachos(conn, entrada).await?;
    Ok((StatusCode::CREATED, Json(resumen)))
}
