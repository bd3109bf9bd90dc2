use serde::Deserialize;

/// Parámetros crudos de paginación. Todo llega como texto en la URL;
/// la validación y coerción se hace en el backend, no aquí.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Parámetros de búsqueda de documentos de venta (facturas y albaranes).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VentasSearchQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub serie: Option<String>,
    pub numero: Option<String>,
    pub cod_cliente: Option<String>,
    pub fecha_desde: Option<String>,
    pub fecha_hasta: Option<String>,
    pub termino: Option<String>,
}

/// Parámetros de búsqueda de despachos.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DespachoSearchQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    // Filtros de cabecera
    pub ruta: Option<String>,
    pub transportista: Option<String>,
    pub estado: Option<String>,
    // Filtros de contenido (requieren unir con las líneas)
    pub cod_cliente: Option<String>,
    pub num_doc: Option<String>,
    // Fechas
    pub fecha_desde: Option<String>,
    pub fecha_hasta: Option<String>,
    // Búsqueda general (placa, transportista, número de despacho)
    pub termino: Option<String>,
}

/// Clave compuesta de un documento de venta.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocKeyQuery {
    pub serie: Option<String>,
    pub numero: Option<String>,
}

/// Clave de un cliente.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClienteKeyQuery {
    pub cod_cliente: Option<String>,
}

/// Clave de un despacho.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DespachoKeyQuery {
    pub num_despacho: Option<String>,
}
