use axum::extract::Query;
use axum::Json;
use contracts::domain::a003_cliente::aggregate::Cliente;
use contracts::shared::pagination::Paginated;
use contracts::shared::query::{ClienteKeyQuery, PageQuery};

use crate::domain::a003_cliente::service;
use crate::shared::data::db;
use crate::shared::error::ApiError;

/// GET /api/clientes
pub async fn listar(Query(params): Query<PageQuery>) -> Result<Json<Paginated<Cliente>>, ApiError> {
    let conn = db::acquire().await?;
    Ok(Json(service::listar(conn, &params).await?))
}

/// GET /api/clientes/cliente?codCliente=codCliente
pub async fn obtener_uno(
    Query(params): Query<ClienteKeyQuery>,
) -> Result<Json<Cliente>, ApiError> {
    let conn = db::acquire().await?;
    service::obtener_uno(conn, &params)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Cliente no encontrado"))
}
