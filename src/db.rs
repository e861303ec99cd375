use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::AppError;
use crate::settings;

pub const HOME_ENV: &str = "SHOP_DASHBOARD_HOME";

const MIGRATIONS: [(&str, &str); 1] = [("001_init", include_str!("../migrations/001_init.sql"))];

pub struct Db {
  pub conn: Mutex<Connection>,
  pub db_path: PathBuf,
}

/// `SHOP_DASHBOARD_HOME` when set, otherwise `<local data dir>/ShopDashboard`.
pub fn resolve_app_dir() -> Result<PathBuf, AppError> {
  if let Some(home) = std::env::var_os(HOME_ENV).filter(|home| !home.is_empty()) {
    return Ok(PathBuf::from(home));
  }
  dirs_next::data_local_dir()
    .map(|base| base.join("ShopDashboard"))
    .ok_or_else(|| AppError::new("PATH", "Local data directory not found"))
}

pub fn init_db(app_dir: &Path) -> Result<Db, AppError> {
  fs::create_dir_all(app_dir)?;
  let db_path = app_dir.join("shop_dashboard.sqlite");
  let mut conn = Connection::open(&db_path)?;
  conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;
  conn.busy_timeout(Duration::from_secs(5))?;

  prepare(&mut conn)?;

  Ok(Db {
    conn: Mutex::new(conn),
    db_path,
  })
}

/// Migrations plus default settings; used for file and in-memory connections alike.
pub fn prepare(conn: &mut Connection) -> Result<(), AppError> {
  run_migrations(conn)?;
  settings::ensure_defaults(conn)
}

pub fn with_conn<T>(db: &Db, f: impl FnOnce(&mut Connection) -> Result<T, AppError>) -> Result<T, AppError> {
  let mut guard = db.conn.lock()?;
  f(&mut guard)
}

fn run_migrations(conn: &mut Connection) -> Result<(), AppError> {
  conn.execute_batch(
    "CREATE TABLE IF NOT EXISTS schema_migrations (version TEXT PRIMARY KEY, applied_at TEXT NOT NULL)",
  )?;

  for (version, sql) in MIGRATIONS {
    let tx = conn.transaction()?;
    let applied = tx
      .query_row("SELECT 1 FROM schema_migrations WHERE version = ?1", params![version], |_| Ok(()))
      .optional()?
      .is_some();
    if applied {
      continue;
    }
    tx.execute_batch(sql)?;
    tx.execute(
      "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
      params![version, Utc::now().to_rfc3339()],
    )?;
    tx.commit()?;
    tracing::info!(version, "migration applied");
  }
  Ok(())
}
