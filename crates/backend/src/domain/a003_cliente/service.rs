use contracts::domain::a003_cliente::aggregate::Cliente;
use contracts::shared::pagination::Paginated;
use contracts::shared::query::{ClienteKeyQuery, PageQuery};
use sea_orm::DatabaseConnection;

use super::repository;
use crate::shared::error::ApiError;
use crate::shared::query::{filters, shape};

pub async fn listar(
    conn: &DatabaseConnection,
    query: &PageQuery,
) -> Result<Paginated<Cliente>, ApiError> {
    let page = filters::validate_pagination(query)?;
    let (data, total) = repository::list(conn, &page).await?;
    Ok(Paginated {
        data,
        meta: shape::page_meta(total, page.page, page.limit),
    })
}

pub async fn obtener_uno(
    conn: &DatabaseConnection,
    query: &ClienteKeyQuery,
) -> Result<Option<Cliente>, ApiError> {
    let cod = filters::validate_cliente_key(query)?;
    repository::get_one(conn, cod).await
}
