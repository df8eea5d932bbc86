//! Database handle for SignDesk.
//!
//! Detects the engine from the DSN, normalises SQLite file paths, builds an
//! sqlx pool and wraps it in a SeaORM `DatabaseConnection` that repositories
//! receive by value (cheap clone).

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use sea_orm::{DatabaseConnection, SqlxPostgresConnector, SqlxSqliteConnector};
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    #[error("Invalid SQLite DSN: {0}")]
    InvalidSqliteDsn(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    Sqlite,
}

#[derive(Clone, Debug)]
pub struct ConnectOpts {
    pub max_conns: Option<u32>,
    pub acquire_timeout: Option<Duration>,
    /// Ignored for non-SQLite engines.
    pub sqlite_busy_timeout: Option<Duration>,
    /// Relative SQLite paths are resolved against this directory.
    pub sqlite_base_dir: Option<PathBuf>,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            acquire_timeout: Some(Duration::from_secs(30)),
            sqlite_busy_timeout: Some(Duration::from_millis(5000)),
            sqlite_base_dir: None,
        }
    }
}

/// Connected database: engine, redacted DSN for logs, and the SeaORM handle.
#[derive(Debug, Clone)]
pub struct DbHandle {
    engine: DbEngine,
    dsn: String,
    sea: DatabaseConnection,
}

impl DbHandle {
    /// Detect engine by DSN scheme.
    pub fn detect(dsn: &str) -> Result<DbEngine> {
        let s = dsn.trim_start();
        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            Ok(DbEngine::Postgres)
        } else if s.starts_with("sqlite:") {
            Ok(DbEngine::Sqlite)
        } else {
            Err(DbError::UnknownDsn(redact_credentials_in_dsn(dsn)))
        }
    }

    pub async fn connect(dsn: &str, opts: ConnectOpts) -> Result<Self> {
        let engine = Self::detect(dsn)?;
        let sea = match engine {
            DbEngine::Postgres => {
                let mut o = PgPoolOptions::new();
                if let Some(n) = opts.max_conns {
                    o = o.max_connections(n);
                }
                if let Some(t) = opts.acquire_timeout {
                    o = o.acquire_timeout(t);
                }
                let pool = o.connect(dsn).await?;
                SqlxPostgresConnector::from_sqlx_postgres_pool(pool)
            }
            DbEngine::Sqlite => {
                let dsn = match &opts.sqlite_base_dir {
                    Some(base) => absolutize_sqlite_dsn(dsn, base, true)?,
                    None => dsn.to_string(),
                };
                let memory = is_sqlite_memory(&dsn);

                let mut connect = SqliteConnectOptions::from_str(&dsn)?
                    .create_if_missing(true)
                    .foreign_keys(true);
                if let Some(t) = opts.sqlite_busy_timeout {
                    connect = connect.busy_timeout(t);
                }

                let mut o = SqlitePoolOptions::new();
                if memory {
                    // One connection keeps a single in-memory database alive.
                    o = o.max_connections(1).min_connections(1).idle_timeout(None);
                } else if let Some(n) = opts.max_conns {
                    o = o.max_connections(n);
                }
                if let Some(t) = opts.acquire_timeout {
                    o = o.acquire_timeout(t);
                }
                let pool = o.connect_with(connect).await?;
                SqlxSqliteConnector::from_sqlx_sqlite_pool(pool)
            }
        };

        tracing::info!(engine = ?engine, dsn = %redact_credentials_in_dsn(dsn), "database connected");
        Ok(Self {
            engine,
            dsn: redact_credentials_in_dsn(dsn),
            sea,
        })
    }

    pub fn engine(&self) -> DbEngine {
        self.engine
    }

    /// DSN with the password masked.
    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    /// SeaORM connection (cheap clone).
    pub fn sea(&self) -> DatabaseConnection {
        self.sea.clone()
    }
}

pub fn is_sqlite_memory(dsn: &str) -> bool {
    dsn.contains(":memory:") || dsn.contains("mode=memory")
}

/// Rewrite a SQLite DSN so its file path is absolute, resolving relative
/// paths against `base_dir`. In-memory DSNs are returned unchanged.
pub fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if is_sqlite_memory(dsn) {
        return Ok("sqlite::memory:".to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| DbError::InvalidSqliteDsn(format!("must start with sqlite:// ({dsn})")))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };
    if path_str.is_empty() {
        return Err(DbError::InvalidSqliteDsn("empty path".into()));
    }

    let mut p = PathBuf::from(path_str);
    if p.is_relative() {
        p = base_dir.join(p);
    }
    if create_dirs {
        if let Some(dir) = p.parent() {
            std::fs::create_dir_all(dir)?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// Mask the password component of a URL-style DSN for logging.
pub fn redact_credentials_in_dsn(dsn: &str) -> String {
    if !dsn.contains('@') {
        return dsn.to_string();
    }
    match url::Url::parse(dsn) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("***"));
            }
            parsed.to_string()
        }
        Err(_) => "***".to_string(),
    }
}
