use contracts::domain::a003_cliente::aggregate::Cliente;
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, FromQueryResult, Statement};

use crate::shared::error::ApiError;
use crate::shared::query::builder::SelectBuilder;
use crate::shared::query::filters::Pagination;
use crate::shared::query::shape;

const SELECT_BASE: &str = "SELECT cod_cliente, nombre, nif20, direccion FROM clientes";
const COUNT_BASE: &str = "SELECT COUNT(*) AS total FROM clientes";
const ORDER_BY: &str = "cod_cliente DESC";

#[derive(Debug, FromQueryResult)]
struct ClienteRow {
    cod_cliente: i64,
    nombre: String,
    nif20: String,
    direccion: String,
}

impl From<ClienteRow> for Cliente {
    fn from(r: ClienteRow) -> Self {
        Cliente {
            cod_cliente: r.cod_cliente,
            nombre: r.nombre,
            nif20: r.nif20,
            direccion: r.direccion,
        }
    }
}

pub async fn list(
    conn: &DatabaseConnection,
    page: &Pagination,
) -> Result<(Vec<Cliente>, u64), ApiError> {
    let qb = SelectBuilder::new(SELECT_BASE, COUNT_BASE, ORDER_BY);
    let (rows, count_row) = tokio::try_join!(
        ClienteRow::find_by_statement(qb.build(page.page, page.limit)).all(conn),
        conn.query_one(qb.build_count()),
    )?;
    let total = shape::total_from(count_row)?;
    Ok((rows.into_iter().map(Into::into).collect(), total))
}

pub async fn get_one(conn: &DatabaseConnection, cod: i64) -> Result<Option<Cliente>, ApiError> {
    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        &format!("{SELECT_BASE} WHERE cod_cliente = ?"),
        [cod.into()],
    );
    let row = ClienteRow::find_by_statement(stmt).one(conn).await?;
    Ok(row.map(Into::into))
}
