use contracts::domain::a002_albaran::aggregate::{Albaran, LineaAlbaran};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, FromQueryResult, Statement};

use crate::shared::error::ApiError;
use crate::shared::query::builder::{like_pattern, SelectBuilder};
use crate::shared::query::filters::VentasFilter;
use crate::shared::query::shape;

const SELECT_BASE: &str = "SELECT c.serie, c.numero, c.fecha, c.cod_cliente, \
     cl.nombre AS nombre_cliente, cl.nif20, c.factor_moneda, c.total_neto, \
     c.total_neto * c.factor_moneda AS total_divisa \
     FROM cab_albaranes c \
     JOIN clientes cl ON cl.cod_cliente = c.cod_cliente";

const COUNT_BASE: &str = "SELECT COUNT(*) AS total \
     FROM cab_albaranes c \
     JOIN clientes cl ON cl.cod_cliente = c.cod_cliente";

const ORDER_BY: &str = "c.fecha DESC, c.numero DESC";

#[derive(Debug, FromQueryResult)]
struct AlbaranRow {
    serie: String,
    numero: i64,
    fecha: String,
    cod_cliente: i64,
    nombre_cliente: String,
    nif20: String,
    factor_moneda: f64,
    total_neto: f64,
    total_divisa: f64,
}

impl From<AlbaranRow> for Albaran {
    fn from(r: AlbaranRow) -> Self {
        Albaran {
            serie: r.serie,
            numero: r.numero,
            fecha: r.fecha,
            cod_cliente: r.cod_cliente,
            nombre_cliente: r.nombre_cliente,
            nif20: r.nif20,
            factor_moneda: r.factor_moneda,
            total_neto: r.total_neto,
            total_divisa: r.total_divisa,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct LineaRow {
    cod_articulo: String,
    descripcion: String,
    precio: f64,
    unidades: f64,
}

impl From<LineaRow> for LineaAlbaran {
    fn from(r: LineaRow) -> Self {
        LineaAlbaran {
            cod_articulo: r.cod_articulo,
            descripcion: r.descripcion,
            precio: r.precio,
            unidades: r.unidades,
        }
    }
}

fn builder_for(filter: &VentasFilter) -> SelectBuilder {
    let mut qb = SelectBuilder::new(SELECT_BASE, COUNT_BASE, ORDER_BY);
    if let Some(serie) = &filter.serie {
        qb.and("c.serie = ?", serie.clone());
    }
    if let Some(numero) = filter.numero {
        qb.and("c.numero = ?", numero);
    }
    if let Some(cod) = filter.cod_cliente {
        qb.and("c.cod_cliente = ?", cod);
    }
    if let Some(desde) = &filter.fecha_desde {
        qb.and("c.fecha >= ?", desde.clone());
    }
    if let Some(hasta) = &filter.fecha_hasta {
        qb.and("c.fecha <= ?", hasta.clone());
    }
    if let Some(termino) = &filter.termino {
        qb.and_any(
            &["LOWER(cl.nombre) LIKE ?", "LOWER(cl.nif20) LIKE ?"],
            like_pattern(termino),
        );
    }
    qb
}

pub async fn list(
    conn: &DatabaseConnection,
    filter: &VentasFilter,
) -> Result<(Vec<Albaran>, u64), ApiError> {
    let qb = builder_for(filter);
    let (rows, count_row) = tokio::try_join!(
        AlbaranRow::find_by_statement(qb.build(filter.page.page, filter.page.limit)).all(conn),
        conn.query_one(qb.build_count()),
    )?;
    let total = shape::total_from(count_row)?;
    Ok((rows.into_iter().map(Into::into).collect(), total))
}

pub async fn get_one(
    conn: &DatabaseConnection,
    serie: &str,
    numero: i64,
) -> Result<Option<Albaran>, ApiError> {
    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        &format!("{SELECT_BASE} WHERE c.serie = ? AND c.numero = ?"),
        [serie.into(), numero.into()],
    );
    let row = AlbaranRow::find_by_statement(stmt).one(conn).await?;
    Ok(row.map(Into::into))
}

pub async fn detalles(
    conn: &DatabaseConnection,
    serie: &str,
    numero: i64,
) -> Result<Vec<LineaAlbaran>, ApiError> {
    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "SELECT cod_articulo, descripcion, precio, unidades \
         FROM lin_albaranes WHERE serie = ? AND numero = ? ORDER BY rowid",
        [serie.into(), numero.into()],
    );
    let rows = LineaRow::find_by_statement(stmt).all(conn).await?;
    Ok(rows.into_iter().map(Into::into).collect())
}
