use contracts::shared::pagination::PageMeta;
use sea_orm::QueryResult;
use serde::de::DeserializeOwned;

use crate::shared::error::ApiError;

/// Metadatos de la envoltura paginada. División con redondeo hacia arriba;
/// con `total == 0` el resultado es 0 páginas, no un error.
pub fn page_meta(total: u64, page: u64, limit: u64) -> PageMeta {
    let total_pages = if total == 0 {
        0
    } else {
        (total + limit - 1) / limit
    };
    PageMeta {
        total,
        page,
        limit,
        total_pages,
    }
}

/// Lee la columna de detalle preagregada como JSON por la consulta. El
/// motor puede devolverla bajo cualquiera de las dos variantes de
/// capitalización, y aquí se normaliza: NULL, columna ausente o cadena
/// vacía equivalen a una colección vacía, nunca a `null`.
pub fn embedded_json_rows<T: DeserializeOwned>(
    row: &QueryResult,
    column: &str,
    alt: &str,
) -> Result<Vec<T>, ApiError> {
    let raw: Option<String> = match row.try_get::<Option<String>>("", column) {
        Ok(value) => value,
        Err(_) => row.try_get::<Option<String>>("", alt).unwrap_or(None),
    };

    match raw {
        None => Ok(Vec::new()),
        Some(s) if s.trim().is_empty() => Ok(Vec::new()),
        Some(s) => serde_json::from_str(&s)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("columna de detalle ilegible: {e}"))),
    }
}

/// Total del COUNT. La consulta siempre produce una fila; la ausencia se
/// trata como cero por simetría con un conjunto vacío.
pub fn total_from(row: Option<QueryResult>) -> Result<u64, ApiError> {
    let total: i64 = match row {
        Some(row) => row.try_get("", "total").map_err(ApiError::Db)?,
        None => 0,
    };
    Ok(total.max(0) as u64)
}
