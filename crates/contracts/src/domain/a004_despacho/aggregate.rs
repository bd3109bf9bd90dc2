use serde::{Deserialize, Serialize};

/// Cabecera de despacho. `fechaCreacion` la asigna el servidor al insertar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Despacho {
    pub num_despacho: String,
    pub ruta: String,
    pub transportista: String,
    pub nif20: String,
    pub unidad: String,
    pub placa1: String,
    pub trasbordo: String,
    pub placa2: String,
    pub despachado: String,
    pub rutero: String,
    pub fecha_creacion: String,
}

/// Documento asociado a un despacho (línea del manifiesto).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentoDespacho {
    pub serie_doc: String,
    pub num_doc: String,
    pub tipo_doc: String,
    pub id_pedido: String,
    pub cod_cliente: i64,
}

/// Fila de listado: la cabecera más los documentos reagrupados desde la
/// columna JSON preagregada por la consulta.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DespachoConDocumentos {
    #[serde(flatten)]
    pub cabecera: Despacho,
    pub documentos: Vec<DocumentoDespacho>,
}

/// Respuesta de `despDetail`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DespachoCompleto {
    pub cabecera: Despacho,
    pub detalle: Vec<DocumentoDespacho>,
}
