use serde::{Deserialize, Serialize};

/// Cabecera de factura de venta, con los datos del cliente ya unidos y el
/// total en divisa derivado en la propia consulta (nunca almacenado).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Factura {
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

/// Línea de factura.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineaFactura {
    pub cod_articulo: String,
    pub descripcion: String,
    pub precio: f64,
    pub unidades: f64,
}

/// Factura con sus líneas, tal y como la devuelve `facDetail`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacturaConDetalles {
    #[serde(flatten)]
    pub cabecera: Factura,
    pub detalles: Vec<LineaFactura>,
}
