use anyhow::{Context, Result};
use r2d2_sqlite::SqliteConnectionManager;

pub type DbPool = r2d2::Pool<SqliteConnectionManager>;
pub type DbConn = r2d2::PooledConnection<SqliteConnectionManager>;

/// Pool over a single sqlite file. Connections deref to `rusqlite::Connection`
/// so the table modules can take `&Connection` and work inside transactions.
pub fn create_pool(database_path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(database_path);
    r2d2::Pool::builder()
        .build(manager)
        .with_context(|| format!("Failed to create connection pool for {database_path}"))
}

pub fn get_connection(pool: &DbPool) -> Result<DbConn> {
    pool.get()
        .context("Failed to get database connection from pool")
}
