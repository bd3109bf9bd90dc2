use chrono::NaiveDate;
use contracts::shared::query::{
    ClienteKeyQuery, DespachoKeyQuery, DespachoSearchQuery, DocKeyQuery, PageQuery,
    VentasSearchQuery,
};

use crate::shared::error::{ApiError, FieldError};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Límites de paginación ya validados: `page >= 1`, `1 <= limit <= 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// FilterSet de facturas y albaranes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VentasFilter {
    pub page: Pagination,
    pub serie: Option<String>,
    pub numero: Option<i64>,
    pub cod_cliente: Option<i64>,
    pub fecha_desde: Option<String>,
    pub fecha_hasta: Option<String>,
    pub termino: Option<String>,
}

/// FilterSet de despachos.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DespachoFilter {
    pub page: Pagination,
    pub ruta: Option<String>,
    pub transportista: Option<String>,
    pub despachado: Option<String>,
    pub cod_cliente: Option<i64>,
    pub num_doc: Option<String>,
    pub fecha_desde: Option<String>,
    pub fecha_hasta: Option<String>,
    pub termino: Option<String>,
}

impl DespachoFilter {
    /// Los filtros por contenido obligan a unir con `det_despachos`.
    pub fn needs_line_join(&self) -> bool {
        self.cod_cliente.is_some() || self.num_doc.is_some()
    }
}

pub fn validate_pagination(query: &PageQuery) -> Result<Pagination, ApiError> {
    let mut errors = Vec::new();
    let page = parse_page_limit(&query.page, &query.limit, &mut errors);
    finish(page, errors)
}

pub fn validate_ventas(query: &VentasSearchQuery) -> Result<VentasFilter, ApiError> {
    let mut errors = Vec::new();

    let page = parse_page_limit(&query.page, &query.limit, &mut errors);
    let filter = VentasFilter {
        page,
        serie: normalize(&query.serie),
        numero: parse_int(&query.numero, "numero", &mut errors),
        cod_cliente: parse_int(&query.cod_cliente, "codCliente", &mut errors),
        fecha_desde: parse_date(&query.fecha_desde, "fechaDesde", &mut errors),
        fecha_hasta: parse_date(&query.fecha_hasta, "fechaHasta", &mut errors),
        termino: normalize(&query.termino),
    };

    finish(filter, errors)
}

pub fn validate_despachos(query: &DespachoSearchQuery) -> Result<DespachoFilter, ApiError> {
    let mut errors = Vec::new();

    let page = parse_page_limit(&query.page, &query.limit, &mut errors);
    let filter = DespachoFilter {
        page,
        ruta: normalize(&query.ruta),
        transportista: normalize(&query.transportista),
        despachado: parse_flag(&query.estado, "estado", &mut errors),
        cod_cliente: parse_int(&query.cod_cliente, "codCliente", &mut errors),
        num_doc: normalize(&query.num_doc),
        fecha_desde: parse_date(&query.fecha_desde, "fechaDesde", &mut errors),
        fecha_hasta: parse_date(&query.fecha_hasta, "fechaHasta", &mut errors),
        termino: normalize(&query.termino),
    };

    finish(filter, errors)
}

/// Clave (serie, numero) de facturas y albaranes.
pub fn validate_doc_key(query: &DocKeyQuery) -> Result<(String, i64), ApiError> {
    let mut errors = Vec::new();

    let serie = match normalize(&query.serie) {
        Some(serie) => serie,
        None => {
            errors.push(FieldError::new("serie", "es obligatoria"));
            String::new()
        }
    };
    let numero = require_positive_int(&query.numero, "numero", &mut errors);

    finish((serie, numero), errors)
}

pub fn validate_cliente_key(query: &ClienteKeyQuery) -> Result<i64, ApiError> {
    let mut errors = Vec::new();
    let cod = require_positive_int(&query.cod_cliente, "codCliente", &mut errors);
    finish(cod, errors)
}

pub fn validate_despacho_key(query: &DespachoKeyQuery) -> Result<String, ApiError> {
    match normalize(&query.num_despacho) {
        Some(num) => Ok(num),
        None => Err(ApiError::Validation(vec![FieldError::new(
            "numDespacho",
            "es obligatorio",
        )])),
    }
}

fn finish<T>(value: T, errors: Vec<FieldError>) -> Result<T, ApiError> {
    if errors.is_empty() {
        Ok(value)
    } else {
        Err(ApiError::Validation(errors))
    }
}

fn parse_page_limit(
    page: &Option<String>,
    limit: &Option<String>,
    errors: &mut Vec<FieldError>,
) -> Pagination {
    let page = match page.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => DEFAULT_PAGE,
        Some(raw) => match raw.parse::<u64>() {
            Ok(p) if p >= 1 => p,
            _ => {
                errors.push(FieldError::new("page", "debe ser un entero mayor o igual a 1"));
                DEFAULT_PAGE
            }
        },
    };

    let limit = match limit.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => DEFAULT_LIMIT,
        Some(raw) => match raw.parse::<u64>() {
            Ok(l) if (1..=MAX_LIMIT).contains(&l) => l,
            // fuera de rango es error de validación, nunca recorte silencioso
            _ => {
                errors.push(FieldError::new("limit", "debe ser un entero entre 1 y 100"));
                DEFAULT_LIMIT
            }
        },
    };

    Pagination { page, limit }
}

/// Recorta espacios y trata el vacío como ausencia de filtro. Aplica a
/// todos los filtros de texto, incluido `termino` (ver DESIGN.md).
fn normalize(raw: &Option<String>) -> Option<String> {
    raw.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_int(raw: &Option<String>, field: &str, errors: &mut Vec<FieldError>) -> Option<i64> {
    let raw = normalize(raw)?;
    match raw.parse::<i64>() {
        Ok(n) => Some(n),
        Err(_) => {
            errors.push(FieldError::new(field, "debe ser numérico"));
            None
        }
    }
}

fn require_positive_int(raw: &Option<String>, field: &str, errors: &mut Vec<FieldError>) -> i64 {
    match normalize(raw) {
        None => {
            errors.push(FieldError::new(field, "es obligatorio"));
            0
        }
        Some(s) => match s.parse::<i64>() {
            Ok(n) if n > 0 => n,
            _ => {
                errors.push(FieldError::new(field, "debe ser un entero positivo"));
                0
            }
        },
    }
}

fn parse_date(raw: &Option<String>, field: &str, errors: &mut Vec<FieldError>) -> Option<String> {
    let raw = normalize(raw)?;
    match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        Ok(_) => Some(raw),
        Err(_) => {
            errors.push(FieldError::new(field, "debe tener formato YYYY-MM-DD"));
            None
        }
    }
}

fn parse_flag(raw: &Option<String>, field: &str, errors: &mut Vec<FieldError>) -> Option<String> {
    let raw = normalize(raw)?;
    match raw.to_uppercase().as_str() {
        "S" => Some("S".to_string()),
        "N" => Some("N".to_string()),
        _ => {
            errors.push(FieldError::new(field, "debe ser 'S' o 'N'"));
            None
        }
    }
}
