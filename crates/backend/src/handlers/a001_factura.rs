use axum::extract::Query;
use axum::Json;
use contracts::domain::a001_factura::aggregate::{Factura, FacturaConDetalles, LineaFactura};
use contracts::shared::pagination::Paginated;
use contracts::shared::query::{DocKeyQuery, VentasSearchQuery};

use crate::domain::a001_factura::service;
use crate::shared::data::db;
use crate::shared::error::ApiError;

/// GET /api/facturas
pub async fn listar(
    Query(params): Query<VentasSearchQuery>,
) -> Result<Json<Paginated<Factura>>, ApiError> {
    let conn = db::acquire().await?;
    Ok(Json(service::listar(conn, &params).await?))
}

/// GET /api/facturas/facDetail?serie=serie&numero=numero
pub async fn obtener_una(
    Query(params): Query<DocKeyQuery>,
) -> Result<Json<FacturaConDetalles>, ApiError> {
    let conn = db::acquire().await?;
    service::obtener_una(conn, &params)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Factura no encontrada"))
}

/// GET /api/facturas/facDetailOnly?serie=serie&numero=numero
pub async fn solo_detalles(
    Query(params): Query<DocKeyQuery>,
) -> Result<Json<Vec<LineaFactura>>, ApiError> {
    let conn = db::acquire().await?;
    Ok(Json(service::solo_detalles(conn, &params).await?))
}
