use std::time::Duration;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr,
    Statement,
};
use tokio::sync::OnceCell;

use crate::shared::config;

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::const_new();

/// Pool de conexiones del proceso. Se inicializa en el primer uso; si
/// varias peticiones compiten por la primera inicialización, solo una
/// ejecuta el handshake y el resto espera el mismo resultado. Nunca se
/// desmonta: se reutiliza hasta que el proceso termina.
pub async fn acquire() -> Result<&'static DatabaseConnection, DbErr> {
    DB_CONN.get_or_try_init(init).await
}

/// Comprobación de conectividad para el health check.
pub async fn ping() -> Result<(), DbErr> {
    let conn = acquire().await?;
    conn.ping().await
}

async fn init() -> Result<DatabaseConnection, DbErr> {
    let cfg = config::load_config().map_err(|e| DbErr::Custom(e.to_string()))?;
    let db_file = config::get_database_path(&cfg).map_err(|e| DbErr::Custom(e.to_string()))?;

    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent).map_err(|e| DbErr::Custom(e.to_string()))?;
    }

    // Normalize path separators and ensure proper URL form on Windows
    let normalized = db_file.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);

    let mut opts = ConnectOptions::new(db_url);
    opts.min_connections(0)
        .max_connections(cfg.database.max_connections)
        .idle_timeout(Duration::from_secs(cfg.database.idle_timeout_secs));

    let conn = Database::connect(opts).await?;
    bootstrap_schema(&conn).await?;

    tracing::info!("Conexión exitosa a la base de datos");
    Ok(conn)
}

/// Crea las tablas que faltan en el primer arranque. Las tablas de ventas
/// y clientes las llenan los sistemas operacionales externos; aquí solo se
/// leen. Las de despachos las escribe únicamente la ingesta.
pub(crate) async fn bootstrap_schema(conn: &DatabaseConnection) -> Result<(), DbErr> {
    for ddl in SCHEMA {
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            (*ddl).to_string(),
        ))
        .await?;
    }
    Ok(())
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS clientes (
        cod_cliente INTEGER PRIMARY KEY,
        nombre TEXT NOT NULL,
        nif20 TEXT NOT NULL DEFAULT '',
        direccion TEXT NOT NULL DEFAULT ''
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS cab_facturas (
        serie TEXT NOT NULL,
        numero INTEGER NOT NULL,
        fecha TEXT NOT NULL,
        cod_cliente INTEGER NOT NULL,
        factor_moneda REAL NOT NULL DEFAULT 1,
        total_neto REAL NOT NULL DEFAULT 0,
        PRIMARY KEY (serie, numero)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS lin_facturas (
        serie TEXT NOT NULL,
        numero INTEGER NOT NULL,
        cod_articulo TEXT NOT NULL,
        descripcion TEXT NOT NULL DEFAULT '',
        precio REAL NOT NULL DEFAULT 0,
        unidades REAL NOT NULL DEFAULT 0
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS cab_albaranes (
        serie TEXT NOT NULL,
        numero INTEGER NOT NULL,
        fecha TEXT NOT NULL,
        cod_cliente INTEGER NOT NULL,
        factor_moneda REAL NOT NULL DEFAULT 1,
        total_neto REAL NOT NULL DEFAULT 0,
        PRIMARY KEY (serie, numero)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS lin_albaranes (
        serie TEXT NOT NULL,
        numero INTEGER NOT NULL,
        cod_articulo TEXT NOT NULL,
        descripcion TEXT NOT NULL DEFAULT '',
        precio REAL NOT NULL DEFAULT 0,
        unidades REAL NOT NULL DEFAULT 0
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS cab_despachos (
        num_despacho TEXT PRIMARY KEY,
        ruta TEXT NOT NULL,
        transportista TEXT NOT NULL,
        nif20 TEXT NOT NULL,
        unidad TEXT NOT NULL,
        placa1 TEXT NOT NULL,
        trasbordo TEXT NOT NULL,
        placa2 TEXT NOT NULL,
        despachado TEXT NOT NULL,
        rutero TEXT NOT NULL,
        fecha_creacion TEXT NOT NULL DEFAULT (date('now'))
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS det_despachos (
        num_despacho TEXT NOT NULL,
        serie_doc TEXT NOT NULL,
        num_doc TEXT NOT NULL,
        tipo_doc TEXT NOT NULL,
        id_pedido TEXT NOT NULL DEFAULT '',
        cod_cliente INTEGER NOT NULL
    );
    "#,
];

/// Base en memoria para las pruebas. Una sola conexión en el pool: con
/// `sqlite::memory:` cada conexión física vería una base distinta.
#[cfg(test)]
pub(crate) async fn connect_memory() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:".to_owned());
    opts.max_connections(1);
    let conn = Database::connect(opts)
        .await
        .expect("no se pudo abrir la base en memoria");
    bootstrap_schema(&conn)
        .await
        .expect("no se pudo crear el esquema");
    conn
}
