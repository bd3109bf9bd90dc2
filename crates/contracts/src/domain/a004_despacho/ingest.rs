use serde::{Deserialize, Serialize};

/// Registro de entrada del endpoint de ingesta. Los campos ausentes se
/// materializan vacíos para que la validación pueda enumerar todos los
/// errores de todos los registros en una sola pasada, en lugar de
/// rechazar el cuerpo entero al deserializar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DespachoInput {
    #[serde(default)]
    pub num_despacho: String,
    #[serde(default)]
    pub ruta: String,
    #[serde(default)]
    pub transportista: String,
    #[serde(default)]
    pub nif20: String,
    #[serde(default)]
    pub unidad: String,
    #[serde(default)]
    pub placa1: String,
    #[serde(default)]
    pub trasbordo: String,
    #[serde(default)]
    pub placa2: String,
    #[serde(default)]
    pub despachado: String,
    #[serde(default)]
    pub rutero: String,
    #[serde(default)]
    pub documentos: Vec<DocumentoInput>,
}

/// Línea de un registro de ingesta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentoInput {
    #[serde(default)]
    pub serie_doc: String,
    #[serde(default)]
    pub num_doc: String,
    #[serde(default)]
    pub tipo_doc: String,
    #[serde(default)]
    pub id_pedido: String,
    pub cod_cliente: Option<i64>,
}

/// El cuerpo puede ser un despacho suelto o una lista de despachos.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DespachoEntrada {
    Lote(Vec<DespachoInput>),
    Unico(Box<DespachoInput>),
}

impl DespachoEntrada {
    /// Normaliza la entrada a una lista.
    pub fn into_lista(self) -> Vec<DespachoInput> {
        match self {
            DespachoEntrada::Lote(lote) => lote,
            DespachoEntrada::Unico(uno) => vec![*uno],
        }
    }
}

/// Modo con el que se procesó la entrada: un registro suelto o un lote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModoIngesta {
    #[serde(rename = "SINGLE")]
    Single,
    #[serde(rename = "BULK")]
    Bulk,
}

/// Resumen devuelto cuando la ingesta completa termina con éxito.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumenIngesta {
    pub success: bool,
    pub total: u64,
    pub mode: ModoIngesta,
}
