use serde::{Deserialize, Serialize};

/// Cabecera de albarán de venta. Misma forma que la factura; lo que cambia
/// es la tabla de origen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Albaran {
    pub serie: String,
    pub numero: i64,
    pub fecha: String,
    pub cod_cliente: i64,
    pub nombre_cliente: String,
    pub nif20: String,
    pub factor_moneda: f64,
    pub total_neto: f64,
    pub total_divisa: f64,
}

/// Línea de albarán.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineaAlbaran {
    pub cod_articulo: String,
    pub descripcion: String,
    pub precio: f64,
    pub unidades: f64,
}

/// Albarán con sus líneas, tal y como lo devuelve `alDetail`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbaranConDetalles {
    #[serde(flatten)]
    pub cabecera: Albaran,
    pub detalles: Vec<LineaAlbaran>,
}
