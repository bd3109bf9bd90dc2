use contracts::domain::a004_despacho::aggregate::{
    Despacho, DespachoConDocumentos, DocumentoDespacho,
};
use contracts::domain::a004_despacho::ingest::DespachoInput;
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, FromQueryResult, QueryResult,
    Statement, TransactionTrait,
};

use crate::shared::error::ApiError;
use crate::shared::query::builder::{like_pattern, SelectBuilder};
use crate::shared::query::filters::DespachoFilter;
use crate::shared::query::shape;

// Columnas de cabecera más la colección de documentos preagregada como
// JSON por una subconsulta correlacionada, en un solo viaje.
const CABECERA_COLS: &str = "c.num_despacho, c.ruta, c.transportista, c.nif20, c.unidad, \
     c.placa1, c.trasbordo, c.placa2, c.despachado, c.rutero, c.fecha_creacion";

const DETALLE_JSON: &str = "(SELECT json_group_array(json_object(\
     'serieDoc', d.serie_doc, 'numDoc', d.num_doc, 'tipoDoc', d.tipo_doc, \
     'idPedido', d.id_pedido, 'codCliente', d.cod_cliente)) \
     FROM det_despachos d WHERE d.num_despacho = c.num_despacho) AS detalleJson";

const ORDER_BY: &str = "c.fecha_creacion DESC, c.num_despacho DESC";

/// Cadena de predicados en el orden canónico. Cuando un filtro alcanza las
/// líneas, la base cambia a la variante con JOIN: el SELECT pasa a
/// DISTINCT sobre la cabecera y el COUNT cuenta claves distintas, para que
/// el abanico del JOIN no duplique filas.
fn builder_for(filter: &DespachoFilter) -> SelectBuilder {
    let (select_base, count_base) = if filter.needs_line_join() {
        (
            format!(
                "SELECT DISTINCT {CABECERA_COLS}, {DETALLE_JSON} FROM cab_despachos c \
                 JOIN det_despachos dd ON dd.num_despacho = c.num_despacho"
            ),
            "SELECT COUNT(DISTINCT c.num_despacho) AS total FROM cab_despachos c \
             JOIN det_despachos dd ON dd.num_despacho = c.num_despacho"
                .to_string(),
        )
    } else {
        (
            format!("SELECT {CABECERA_COLS}, {DETALLE_JSON} FROM cab_despachos c"),
            "SELECT COUNT(*) AS total FROM cab_despachos c".to_string(),
        )
    };

    let mut qb = SelectBuilder::new(&select_base, &count_base, ORDER_BY);
    if let Some(ruta) = &filter.ruta {
        qb.and("c.ruta = ?", ruta.clone());
    }
    if let Some(transportista) = &filter.transportista {
        qb.and("LOWER(c.transportista) LIKE ?", like_pattern(transportista));
    }
    if let Some(flag) = &filter.despachado {
        qb.and("c.despachado = ?", flag.clone());
    }
    if let Some(cod) = filter.cod_cliente {
        qb.and("dd.cod_cliente = ?", cod);
    }
    if let Some(num_doc) = &filter.num_doc {
        // "¿dónde está mi factura?": el número puede ser de documento o de pedido
        qb.and_any(&["dd.num_doc = ?", "dd.id_pedido = ?"], num_doc.clone());
    }
    if let Some(desde) = &filter.fecha_desde {
        qb.and("c.fecha_creacion >= ?", desde.clone());
    }
    if let Some(hasta) = &filter.fecha_hasta {
        qb.and("c.fecha_creacion <= ?", hasta.clone());
    }
    if let Some(termino) = &filter.termino {
        qb.and_any(
            &[
                "LOWER(c.num_despacho) LIKE ?",
                "LOWER(c.placa1) LIKE ?",
                "LOWER(c.transportista) LIKE ?",
            ],
            like_pattern(termino),
        );
    }
    qb
}

fn cabecera_from(row: &QueryResult) -> Result<Despacho, DbErr> {
    Ok(Despacho {
        num_despacho: row.try_get("", "num_despacho")?,
        ruta: row.try_get("", "ruta")?,
        transportista: row.try_get("", "transportista")?,
        nif20: row.try_get("", "nif20")?,
        unidad: row.try_get("", "unidad")?,
        placa1: row.try_get("", "placa1")?,
        trasbordo: row.try_get("", "trasbordo")?,
        placa2: row.try_get("", "placa2")?,
        despachado: row.try_get("", "despachado")?,
        rutero: row.try_get("", "rutero")?,
        fecha_creacion: row.try_get("", "fecha_creacion")?,
    })
}

pub async fn list(
    conn: &DatabaseConnection,
    filter: &DespachoFilter,
) -> Result<(Vec<DespachoConDocumentos>, u64), ApiError> {
    let qb = builder_for(filter);
    let (rows, count_row) = tokio::try_join!(
        conn.query_all(qb.build(filter.page.page, filter.page.limit)),
        conn.query_one(qb.build_count()),
    )?;

    let mut data = Vec::with_capacity(rows.len());
    for row in &rows {
        let cabecera = cabecera_from(row)?;
        let documentos = shape::embedded_json_rows(row, "detalleJson", "DetalleJson")?;
        data.push(DespachoConDocumentos {
            cabecera,
            documentos,
        });
    }

    let total = shape::total_from(count_row)?;
    Ok((data, total))
}

pub async fn get_header(
    conn: &DatabaseConnection,
    num_despacho: &str,
) -> Result<Option<Despacho>, ApiError> {
    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        &format!("SELECT {CABECERA_COLS} FROM cab_despachos c WHERE c.num_despacho = ?"),
        [num_despacho.into()],
    );
    let row = conn.query_one(stmt).await?;
    Ok(match row {
        Some(row) => Some(cabecera_from(&row)?),
        None => None,
    })
}

#[derive(Debug, FromQueryResult)]
struct DocumentoRow {
    serie_doc: String,
    num_doc: String,
    tipo_doc: String,
    id_pedido: String,
    cod_cliente: i64,
}

impl From<DocumentoRow> for DocumentoDespacho {
    fn from(r: DocumentoRow) -> Self {
        DocumentoDespacho {
            serie_doc: r.serie_doc,
            num_doc: r.num_doc,
            tipo_doc: r.tipo_doc,
            id_pedido: r.id_pedido,
            cod_cliente: r.cod_cliente,
        }
    }
}

pub async fn get_lineas(
    conn: &DatabaseConnection,
    num_despacho: &str,
) -> Result<Vec<DocumentoDespacho>, ApiError> {
    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "SELECT serie_doc, num_doc, tipo_doc, id_pedido, cod_cliente \
         FROM det_despachos WHERE num_despacho = ? ORDER BY rowid",
        [num_despacho.into()],
    );
    let rows = DocumentoRow::find_by_statement(stmt).all(conn).await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

// El lote viaja serializado una sola vez y el motor lo expande en el
// servidor con json_each: un INSERT para las cabeceras y otro para las
// líneas, sin un viaje por registro. La transacción hace del lote una
// unidad atómica; nada abarca más de un lote.
const INSERT_CABECERAS: &str = "INSERT INTO cab_despachos \
     (num_despacho, ruta, transportista, nif20, unidad, placa1, trasbordo, placa2, despachado, rutero) \
     SELECT json_extract(value, '$.numDespacho'), json_extract(value, '$.ruta'), \
     json_extract(value, '$.transportista'), json_extract(value, '$.nif20'), \
     json_extract(value, '$.unidad'), json_extract(value, '$.placa1'), \
     json_extract(value, '$.trasbordo'), json_extract(value, '$.placa2'), \
     json_extract(value, '$.despachado'), json_extract(value, '$.rutero') \
     FROM json_each(?)";

const INSERT_DETALLES: &str = "INSERT INTO det_despachos \
     (num_despacho, serie_doc, num_doc, tipo_doc, id_pedido, cod_cliente) \
     SELECT json_extract(d.value, '$.numDespacho'), json_extract(l.value, '$.serieDoc'), \
     json_extract(l.value, '$.numDoc'), json_extract(l.value, '$.tipoDoc'), \
     json_extract(l.value, '$.idPedido'), json_extract(l.value, '$.codCliente') \
     FROM json_each(?) AS d, json_each(d.value, '$.documentos') AS l";

pub async fn insert_chunk(conn: &DatabaseConnection, chunk: &[DespachoInput]) -> Result<(), DbErr> {
    let payload = serde_json::to_string(chunk).map_err(|e| DbErr::Custom(e.to_string()))?;

    let txn = conn.begin().await?;
    txn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        INSERT_CABECERAS,
        [payload.clone().into()],
    ))
    .await?;
    txn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        INSERT_DETALLES,
        [payload.into()],
    ))
    .await?;
    txn.commit().await?;
    Ok(())
}
