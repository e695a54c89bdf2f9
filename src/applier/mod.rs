pub mod errors;
pub mod paths;

pub use errors::ApplyError;
pub use paths::{
    SCHEMA_FILE, SEED_ENV_FILE, SEED_FILE, executable_dir, resolve_beside_executable, resolve_in,
};

use std::path::{Path, PathBuf};

use sqlx::{Connection, PgConnection, postgres::PgConnectOptions};
use tracing::{Instrument, debug, info, info_span, instrument, warn};

use crate::config::ConnectionConfig;

/// Apply the SQL file at `path` to the database described by `config`.
///
/// The file is read before any connection is attempted. Its contents go to
/// the server as one simple-protocol batch, so every statement in it runs in
/// order and the first failing statement aborts the rest. The connection is
/// closed before this returns, on success and on failure alike.
pub async fn apply(path: &Path, config: &ConnectionConfig) -> Result<(), ApplyError> {
    apply_with(path, &config.connect_options()).await
}

/// Same as [`apply`] but with ready-made sqlx options.
#[instrument(skip_all, fields(path = %path.display()))]
pub async fn apply_with(path: &Path, options: &PgConnectOptions) -> Result<(), ApplyError> {
    let sql = read_sql(path).await?;
    run_batch(&sql, options).await
}

/// Resolve `relative` beside the executable, read it, then load connection
/// settings and apply. Settings come from the process environment, overridden
/// by `env_file` (also relative to the executable) when given and present.
/// Returns the path that was applied.
pub async fn apply_bundled(
    relative: impl AsRef<Path>,
    env_file: Option<&str>,
) -> Result<PathBuf, ApplyError> {
    let dir = executable_dir().map_err(ApplyError::Locate)?;
    let path = resolve_in(&dir, relative);
    let span = info_span!("apply", path = %path.display());

    async {
        let sql = read_sql(&path).await?;

        let config = match env_file {
            Some(file) => ConnectionConfig::from_env_and_file(&resolve_in(&dir, file)),
            None => ConnectionConfig::from_env(),
        };
        debug!(?config, "Resolved connection configuration");

        run_batch(&sql, &config.connect_options()).await
    }
    .instrument(span)
    .await?;

    Ok(path)
}

async fn run_batch(sql: &str, options: &PgConnectOptions) -> Result<(), ApplyError> {
    let target = describe(options);
    info!(%target, user = options.get_username(), "Connecting to database");

    let mut conn = PgConnection::connect_with(options)
        .await
        .map_err(|source| ApplyError::Connection { target, source })?;

    let outcome = execute_batch(&mut conn, sql).await;
    release(conn).await;

    let rows = outcome?;
    info!(rows_affected = rows, "SQL batch executed");
    Ok(())
}

/// Send `sql` to the server unmodified and return the rows affected by the
/// whole batch.
pub async fn execute_batch(conn: &mut PgConnection, sql: &str) -> Result<u64, ApplyError> {
    let result = sqlx::raw_sql(sql)
        .execute(&mut *conn)
        .await
        .map_err(ApplyError::Execution)?;
    Ok(result.rows_affected())
}

async fn read_sql(path: &Path) -> Result<String, ApplyError> {
    let sql = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ApplyError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(bytes = sql.len(), "Read SQL file");
    Ok(sql)
}

// Takes ownership so the connection cannot be closed twice or used after.
async fn release(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        warn!(error = %e, "Failed to close database connection cleanly");
    }
}

fn describe(options: &PgConnectOptions) -> String {
    // Postgres falls back to a database named after the user.
    let database = options.get_database().unwrap_or(options.get_username());
    format!(
        "{} at {}:{}",
        database,
        options.get_host(),
        options.get_port()
    )
}
