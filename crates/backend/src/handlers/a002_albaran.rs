use axum::extract::Query;
use axum::Json;
use contracts::domain::a002_albaran::aggregate::{Albaran, AlbaranConDetalles, LineaAlbaran};
use contracts::shared::pagination::Paginated;
use contracts::shared::query::{DocKeyQuery, VentasSearchQuery};

use crate::domain::a002_albaran::service;
use crate::shared::data::db;
use crate::shared::error::ApiError;

/// GET /api/albaranes
pub async fn listar(
    Query(params): Query<VentasSearchQuery>,
) -> Result<Json<Paginated<Albaran>>, ApiError> {
    let conn = db::acquire().await?;
    Ok(Json(service::listar(conn, &params).await?))
}

/// GET /api/albaranes/alDetail?serie=serie&numero=numero
pub async fn obtener_una(
    Query(params): Query<DocKeyQuery>,
) -> Result<Json<AlbaranConDetalles>, ApiError> {
    let conn = db::acquire().await?;
    service::obtener_una(conn, &params)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Albaran no encontrado"))
}

/// GET /api/albaranes/alDetailOnly?serie=serie&numero=numero
pub async fn solo_detalles(
    Query(params): Query<DocKeyQuery>,
) -> Result<Json<Vec<LineaAlbaran>>, ApiError> {
    let conn = db::acquire().await?;
    Ok(Json(service::solo_detalles(conn, &params).await?))
}
