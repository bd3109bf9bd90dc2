use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sea_orm::DbErr;
use serde::Serialize;
use serde_json::json;

/// Un campo rechazado por la validación, con su mensaje.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Taxonomía de errores del servicio. `IntoResponse` es el único punto
/// donde se decide el código HTTP y la forma del cuerpo.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Entrada malformada o fuera de rango; lista todos los campos
    /// rechazados, no solo el primero.
    #[error("Datos inválidos")]
    Validation(Vec<FieldError>),

    /// Ausencia definida, no una excepción. El texto ya viene formado
    /// ("Factura no encontrada", "Cliente no encontrado", ...).
    #[error("{0}")]
    NotFound(&'static str),

    /// Violación de unicidad en una escritura.
    #[error("{0}")]
    Conflict(String),

    /// La ingesta por lotes se detuvo en el lote `lote` (base cero) con
    /// `procesados` registros ya confirmados. Los lotes confirmados no se
    /// revierten; el llamante puede reanudar desde ahí.
    #[error("Error al procesar lote {lote}")]
    BatchFailed {
        procesados: u64,
        lote: usize,
        #[source]
        causa: DbErr,
    },

    #[error(transparent)]
    Db(#[from] DbErr),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Violación de unicidad según el motor. SQLite la señala con
/// "UNIQUE constraint failed"; se conserva la marca "PRIMARY KEY" que
/// usan otros motores para la misma condición.
pub fn is_unique_violation(err: &DbErr) -> bool {
    let msg = err.to_string();
    msg.contains("UNIQUE constraint failed") || msg.contains("PRIMARY KEY")
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": "Datos inválidos", "errors": errors })),
            )
                .into_response(),

            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }

            ApiError::Conflict(msg) => {
                (StatusCode::CONFLICT, Json(json!({ "message": msg }))).into_response()
            }

            ApiError::BatchFailed {
                procesados,
                lote,
                causa,
            } => {
                tracing::error!("Error al procesar lote {lote}: {causa}");
                let (status, message) = if is_unique_violation(&causa) {
                    (
                        StatusCode::CONFLICT,
                        "Uno de los despachos ya existe en la base de datos.".to_string(),
                    )
                } else {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Error al procesar lote {lote}"),
                    )
                };
                (
                    status,
                    Json(json!({
                        "message": message,
                        "procesados": procesados,
                        "lote": lote,
                    })),
                )
                    .into_response()
            }

            ApiError::Db(err) => {
                tracing::error!("Error de base de datos: {err}");
                internal_error()
            }

            ApiError::Internal(err) => {
                tracing::error!("Error interno: {err:#}");
                internal_error()
            }
        }
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Error interno del servidor" })),
    )
        .into_response()
}
