use sea_orm::{DatabaseBackend, Statement, Value};

/// Par SELECT/COUNT parametrizado, construido a partir de una cláusula base
/// fija y una cadena ordenada de predicados. La presencia de un filtro
/// determina el texto SQL; su valor viaja siempre como parámetro ligado,
/// nunca interpolado. El COUNT comparte exactamente la misma cadena de
/// predicados que el SELECT, así que no pueden divergir.
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    select_base: String,
    count_base: String,
    order_by: String,
    predicates: Vec<String>,
    params: Vec<Value>,
}

impl SelectBuilder {
    pub fn new(select_base: &str, count_base: &str, order_by: &str) -> Self {
        Self {
            select_base: select_base.to_string(),
            count_base: count_base.to_string(),
            order_by: order_by.to_string(),
            predicates: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Añade un predicado `AND` con un único valor ligado. El orden de las
    /// llamadas es el orden canónico del recurso y queda fijado en el SQL.
    pub fn and(&mut self, clause: &str, value: impl Into<Value>) {
        self.predicates.push(clause.to_string());
        self.params.push(value.into());
    }

    /// Añade un grupo `OR` entre paréntesis (búsqueda libre sobre un
    /// conjunto fijo de columnas). El mismo valor se liga una vez por
    /// columna del grupo.
    pub fn and_any(&mut self, clauses: &[&str], value: impl Into<Value>) {
        self.predicates.push(format!("({})", clauses.join(" OR ")));
        let value = value.into();
        for _ in 0..clauses.len() {
            self.params.push(value.clone());
        }
    }

    fn where_clause(&self) -> String {
        if self.predicates.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.predicates.join(" AND "))
        }
    }

    /// Consulta de datos: ORDER BY determinista y paginación ligada como
    /// parámetros (`LIMIT ?`, `OFFSET (page-1)*limit`).
    pub fn build(&self, page: u64, limit: u64) -> Statement {
        let sql = format!(
            "{}{} ORDER BY {} LIMIT ? OFFSET ?",
            self.select_base,
            self.where_clause(),
            self.order_by
        );
        let mut params = self.params.clone();
        params.push(Value::from(limit as i64));
        params.push(Value::from(page.saturating_sub(1).saturating_mul(limit) as i64));
        Statement::from_sql_and_values(DatabaseBackend::Sqlite, &sql, params)
    }

    /// Consulta de recuento: misma cadena de predicados, sin ORDER BY ni
    /// paginación.
    pub fn build_count(&self) -> Statement {
        let sql = format!("{}{}", self.count_base, self.where_clause());
        Statement::from_sql_and_values(DatabaseBackend::Sqlite, &sql, self.params.clone())
    }
}

/// Patrón para búsquedas por subcadena, sin distinguir mayúsculas. Se usa
/// junto a columnas envueltas en `LOWER(...)`.
pub fn like_pattern(term: &str) -> String {
    format!("%{}%", term.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param_count(stmt: &Statement) -> usize {
        stmt.values.as_ref().map(|v| v.0.len()).unwrap_or(0)
    }

    #[test]
    fn test_no_filters_has_no_where() {
        let qb = SelectBuilder::new("SELECT * FROM t", "SELECT COUNT(*) AS total FROM t", "t.id DESC");
        let data = qb.build(1, 10);
        assert_eq!(data.sql, "SELECT * FROM t ORDER BY t.id DESC LIMIT ? OFFSET ?");
        assert_eq!(param_count(&data), 2);

        let count = qb.build_count();
        assert_eq!(count.sql, "SELECT COUNT(*) AS total FROM t");
        assert_eq!(param_count(&count), 0);
    }

    #[test]
    fn test_predicates_keep_call_order() {
        let mut qb = SelectBuilder::new("SELECT * FROM t", "SELECT COUNT(*) AS total FROM t", "t.id DESC");
        qb.and("t.serie = ?", "FA".to_string());
        qb.and("t.numero = ?", 42i64);
        let data = qb.build(1, 10);
        assert_eq!(
            data.sql,
            "SELECT * FROM t WHERE t.serie = ? AND t.numero = ? ORDER BY t.id DESC LIMIT ? OFFSET ?"
        );
        assert_eq!(param_count(&data), 4);
    }

    #[test]
    fn test_or_group_is_parenthesized_and_binds_per_column() {
        let mut qb = SelectBuilder::new("SELECT * FROM t", "SELECT COUNT(*) AS total FROM t", "t.id DESC");
        qb.and("t.ruta = ?", "R1".to_string());
        qb.and_any(
            &["LOWER(t.nombre) LIKE ?", "LOWER(t.nif20) LIKE ?"],
            like_pattern("Gar"),
        );
        let data = qb.build(1, 10);
        assert_eq!(
            data.sql,
            "SELECT * FROM t WHERE t.ruta = ? AND (LOWER(t.nombre) LIKE ? OR LOWER(t.nif20) LIKE ?) ORDER BY t.id DESC LIMIT ? OFFSET ?"
        );
        // ruta + 2 ocurrencias del término + limit + offset
        assert_eq!(param_count(&data), 5);
    }

    #[test]
    fn test_count_mirrors_data_predicates() {
        let mut qb = SelectBuilder::new("SELECT * FROM t", "SELECT COUNT(*) AS total FROM t", "t.id DESC");
        qb.and("t.serie = ?", "FA".to_string());
        qb.and_any(&["t.a LIKE ?", "t.b LIKE ?"], like_pattern("x"));
        let data = qb.build(3, 25);
        let count = qb.build_count();

        assert_eq!(count.sql, "SELECT COUNT(*) AS total FROM t WHERE t.serie = ? AND (t.a LIKE ? OR t.b LIKE ?)");
        assert!(!count.sql.contains("ORDER BY"));
        assert!(!count.sql.contains("LIMIT"));
        // el COUNT lleva los mismos parámetros que el SELECT menos los dos de paginación
        assert_eq!(param_count(&count) + 2, param_count(&data));
    }

    #[test]
    fn test_offset_is_page_minus_one_times_limit() {
        let qb = SelectBuilder::new("SELECT * FROM t", "SELECT COUNT(*) AS total FROM t", "t.id DESC");
        let data = qb.build(3, 25);
        let values = data.values.unwrap().0;
        assert_eq!(values[values.len() - 2], Value::from(25i64));
        assert_eq!(values[values.len() - 1], Value::from(50i64));
    }

    #[test]
    fn test_like_pattern_lowercases_and_wraps() {
        assert_eq!(like_pattern("GarCÍa"), "%garcía%");
    }
}
