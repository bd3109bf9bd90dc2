use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cliente {
    pub cod_cliente: i64,
    pub nombre: String,
    pub nif20: String,
    pub direccion: String,
}
