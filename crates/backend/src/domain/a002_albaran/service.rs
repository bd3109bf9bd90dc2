use contracts::domain::a002_albaran::aggregate::{Albaran, AlbaranConDetalles, LineaAlbaran};
use contracts::shared::pagination::Paginated;
use contracts::shared::query::{DocKeyQuery, VentasSearchQuery};
use sea_orm::DatabaseConnection;

use super::repository;
use crate::shared::error::ApiError;
use crate::shared::query::{filters, shape};

pub async fn listar(
    conn: &DatabaseConnection,
    query: &VentasSearchQuery,
) -> Result<Paginated<Albaran>, ApiError> {
    let filter = filters::validate_ventas(query)?;
    let (data, total) = repository::list(conn, &filter).await?;
    Ok(Paginated {
        data,
        meta: shape::page_meta(total, filter.page.page, filter.page.limit),
    })
}

pub async fn obtener_una(
    conn: &DatabaseConnection,
    query: &DocKeyQuery,
) -> Result<Option<AlbaranConDetalles>, ApiError> {
    let (serie, numero) = filters::validate_doc_key(query)?;
    let (cabecera, detalles) = tokio::try_join!(
        repository::get_one(conn, &serie, numero),
        repository::detalles(conn, &serie, numero),
    )?;
    Ok(cabecera.map(|cabecera| AlbaranConDetalles { cabecera, detalles }))
}

pub async fn solo_detalles(
    conn: &DatabaseConnection,
    query: &DocKeyQuery,
) -> Result<Vec<LineaAlbaran>, ApiError> {
    let (serie, numero) = filters::validate_doc_key(query)?;
    repository::detalles(conn, &serie, numero).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_memory;
    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

    async fn seed(conn: &DatabaseConnection) {
        for sql in [
            "INSERT INTO clientes (cod_cliente, nombre, nif20, direccion) VALUES \
             (7, 'Almacenes Ruiz', 'B77777777', 'Poligono Norte 7')",
            "INSERT INTO cab_albaranes (serie, numero, fecha, cod_cliente, factor_moneda, total_neto) \
             VALUES ('AL', 1, '2026-08-01', 7, 2.0, 50.0), ('AL', 2, '2026-08-02', 7, 1.0, 80.0)",
            "INSERT INTO lin_albaranes (serie, numero, cod_articulo, descripcion, precio, unidades) \
             VALUES ('AL', 2, 'ART-9', 'Gel', 4.0, 20.0)",
        ] {
            conn.execute(Statement::from_string(
                DatabaseBackend::Sqlite,
                sql.to_string(),
            ))
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    async fn test_list_and_detail_over_albaran_tables() {
        let conn = connect_memory().await;
        seed(&conn).await;

        let page = listar(&conn, &VentasSearchQuery::default()).await.unwrap();
        assert_eq!(page.meta.total, 2);
        // el más reciente primero
        assert_eq!(page.data[0].numero, 2);
        assert!((page.data[1].total_divisa - 100.0).abs() < 1e-9);

        let key = DocKeyQuery {
            serie: Some("AL".to_string()),
            numero: Some("2".to_string()),
        };
        let albaran = obtener_una(&conn, &key).await.unwrap().unwrap();
        assert_eq!(albaran.detalles.len(), 1);
        assert_eq!(albaran.detalles[0].cod_articulo, "ART-9");

        let solo = solo_detalles(&conn, &key).await.unwrap();
        assert_eq!(solo.len(), 1);
    }

    #[tokio::test]
    async fn test_detail_absent_is_none() {
        let conn = connect_memory().await;
        seed(&conn).await;
        let key = DocKeyQuery {
            serie: Some("AL".to_string()),
            numero: Some("99".to_string()),
        };
        assert!(obtener_una(&conn, &key).await.unwrap().is_none());
    }
}
