use contracts::domain::a001_factura::aggregate::{Factura, FacturaConDetalles, LineaFactura};
use contracts::shared::pagination::Paginated;
use contracts::shared::query::{DocKeyQuery, VentasSearchQuery};
use sea_orm::DatabaseConnection;

use super::repository;
use crate::shared::error::ApiError;
use crate::shared::query::{filters, shape};

pub async fn listar(
    conn: &DatabaseConnection,
    query: &VentasSearchQuery,
) -> Result<Paginated<Factura>, ApiError> {
    let filter = filters::validate_ventas(query)?;
    let (data, total) = repository::list(conn, &filter).await?;
    Ok(Paginated {
        data,
        meta: shape::page_meta(total, filter.page.page, filter.page.limit),
    })
}

/// Cabecera y líneas viajan en paralelo. Si la cabecera no existe el
/// resultado es `None` y las líneas se descartan aunque existieran.
pub async fn obtener_una(
    conn: &DatabaseConnection,
    query: &DocKeyQuery,
) -> Result<Option<FacturaConDetalles>, ApiError> {
    let (serie, numero) = filters::validate_doc_key(query)?;
    let (cabecera, detalles) = tokio::try_join!(
        repository::get_one(conn, &serie, numero),
        repository::detalles(conn, &serie, numero),
    )?;
    Ok(cabecera.map(|cabecera| FacturaConDetalles { cabecera, detalles }))
}

pub async fn solo_detalles(
    conn: &DatabaseConnection,
    query: &DocKeyQuery,
) -> Result<Vec<LineaFactura>, ApiError> {
    let (serie, numero) = filters::validate_doc_key(query)?;
    repository::detalles(conn, &serie, numero).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_memory;
    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

    async fn exec(conn: &DatabaseConnection, sql: String) {
        conn.execute(Statement::from_string(DatabaseBackend::Sqlite, sql))
            .await
            .unwrap();
    }

    /// 25 facturas de dos series, repartidas entre dos clientes.
    async fn seed(conn: &DatabaseConnection) {
        exec(
            conn,
            "INSERT INTO clientes (cod_cliente, nombre, nif20, direccion) VALUES \
             (1, 'Drogueria Garcia', 'B11111111', 'Calle Mayor 1'), \
             (2, 'Farmacia Lopez', 'B22222222', 'Avenida Sur 2')"
                .to_string(),
        )
        .await;

        for i in 1..=25 {
            let serie = if i % 2 == 0 { "FA" } else { "FB" };
            let cliente = if i <= 20 { 1 } else { 2 };
            exec(
                conn,
                format!(
                    "INSERT INTO cab_facturas (serie, numero, fecha, cod_cliente, factor_moneda, total_neto) \
                     VALUES ('{serie}', {i}, '2026-07-{:02}', {cliente}, 1.1, {}.0)",
                    (i % 28) + 1,
                    100 + i
                ),
            )
            .await;
            exec(
                conn,
                format!(
                    "INSERT INTO lin_facturas (serie, numero, cod_articulo, descripcion, precio, unidades) \
                     VALUES ('{serie}', {i}, 'ART-{i}', 'Articulo {i}', 10.0, 2.0)"
                ),
            )
            .await;
        }
    }

    fn query(pairs: &[(&str, &str)]) -> VentasSearchQuery {
        let mut q = VentasSearchQuery::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "page" => q.page = v,
                "limit" => q.limit = v,
                "serie" => q.serie = v,
                "codCliente" => q.cod_cliente = v,
                "fechaDesde" => q.fecha_desde = v,
                "termino" => q.termino = v,
                _ => unreachable!(),
            }
        }
        q
    }

    #[tokio::test]
    async fn test_envelope_invariants() {
        let conn = connect_memory().await;
        seed(&conn).await;

        let page1 = listar(&conn, &query(&[])).await.unwrap();
        assert_eq!(page1.meta.total, 25);
        assert_eq!(page1.meta.total_pages, 3);
        assert_eq!(page1.meta.page, 1);
        assert_eq!(page1.meta.limit, 10);
        assert_eq!(page1.data.len(), 10);

        let page3 = listar(&conn, &query(&[("page", "3")])).await.unwrap();
        assert_eq!(page3.data.len(), 5);
        assert!(page3.data.len() as u64 <= page3.meta.limit);
    }

    #[tokio::test]
    async fn test_ordering_is_stable_across_calls() {
        let conn = connect_memory().await;
        seed(&conn).await;

        let a = listar(&conn, &query(&[("limit", "25")])).await.unwrap();
        let b = listar(&conn, &query(&[("limit", "25")])).await.unwrap();
        let keys =
            |p: &Paginated<Factura>| p.data.iter().map(|f| (f.serie.clone(), f.numero)).collect::<Vec<_>>();
        assert_eq!(keys(&a), keys(&b));

        // descendente por fecha con desempate por numero
        for pair in a.data.windows(2) {
            assert!((&pair[0].fecha, pair[0].numero) >= (&pair[1].fecha, pair[1].numero));
        }
    }

    #[tokio::test]
    async fn test_each_added_filter_narrows_total() {
        let conn = connect_memory().await;
        seed(&conn).await;

        let todos = listar(&conn, &query(&[])).await.unwrap().meta.total;
        let serie = listar(&conn, &query(&[("serie", "FA")])).await.unwrap().meta.total;
        let serie_cliente = listar(&conn, &query(&[("serie", "FA"), ("codCliente", "1")]))
            .await
            .unwrap()
            .meta
            .total;
        let con_fecha = listar(
            &conn,
            &query(&[("serie", "FA"), ("codCliente", "1"), ("fechaDesde", "2026-07-10")]),
        )
        .await
        .unwrap()
        .meta
        .total;

        assert!(serie <= todos);
        assert!(serie_cliente <= serie);
        assert!(con_fecha <= serie_cliente);
    }

    #[tokio::test]
    async fn test_termino_blank_equals_unfiltered() {
        let conn = connect_memory().await;
        seed(&conn).await;

        let sin = listar(&conn, &query(&[])).await.unwrap().meta.total;
        let blanco = listar(&conn, &query(&[("termino", "  ")])).await.unwrap().meta.total;
        assert_eq!(sin, blanco);

        // subcadena sobre nombre de cliente, sin distinguir mayúsculas
        let garcia = listar(&conn, &query(&[("termino", "GARCIA")])).await.unwrap();
        assert_eq!(garcia.meta.total, 20);

        // y sobre el NIF
        let nif = listar(&conn, &query(&[("termino", "b2222")])).await.unwrap();
        assert_eq!(nif.meta.total, 5);
    }

    #[tokio::test]
    async fn test_totaldivisa_is_derived() {
        let conn = connect_memory().await;
        seed(&conn).await;

        let page = listar(&conn, &query(&[("limit", "1")])).await.unwrap();
        let factura = &page.data[0];
        assert!((factura.total_divisa - factura.total_neto * factura.factor_moneda).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_detail_found_and_not_found() {
        let conn = connect_memory().await;
        seed(&conn).await;

        let key = DocKeyQuery {
            serie: Some("FA".to_string()),
            numero: Some("2".to_string()),
        };
        let factura = obtener_una(&conn, &key).await.unwrap().unwrap();
        assert_eq!(factura.cabecera.numero, 2);
        assert_eq!(factura.detalles.len(), 1);
        assert_eq!(factura.detalles[0].cod_articulo, "ART-2");

        // ausencia definida, no excepción; sin líneas adjuntas
        let missing = DocKeyQuery {
            serie: Some("ZZ".to_string()),
            numero: Some("999".to_string()),
        };
        assert!(obtener_una(&conn, &missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_table_yields_zero_pages() {
        let conn = connect_memory().await;
        let vacio = listar(&conn, &query(&[])).await.unwrap();
        assert_eq!(vacio.meta.total, 0);
        assert_eq!(vacio.meta.total_pages, 0);
        assert!(vacio.data.is_empty());
    }
}
