use std::path::{Path, PathBuf};
use std::time::Duration;

use sqlx::{Connection, PgConnection, postgres::PgConnectOptions};

/// Write `sql` to `dir/name`, creating parent directories.
pub fn write_sql(dir: &Path, name: &str, sql: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create schema directory");
    }
    std::fs::write(&path, sql).expect("Failed to write schema file");
    path
}

/// Open a side connection for assertions, tagged so it never counts as one
/// of the sessions under test.
pub async fn observer(opts: &PgConnectOptions) -> PgConnection {
    PgConnection::connect_with(&opts.clone().application_name("test-observer"))
        .await
        .expect("Failed to open observer connection")
}

/// Sessions currently open under `application_name`.
pub async fn sessions_named(conn: &mut PgConnection, application_name: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "SELECT count(*) FROM pg_stat_activity WHERE application_name = $1",
    )
    .bind(application_name)
    .fetch_one(conn)
    .await
    .expect("Failed to query pg_stat_activity")
}

/// Poll until no session named `application_name` remains. The backend
/// exits asynchronously after the client sends Terminate.
pub async fn wait_for_sessions_to_drain(conn: &mut PgConnection, application_name: &str) -> i64 {
    let mut remaining = sessions_named(conn, application_name).await;
    for _ in 0..50 {
        if remaining == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        remaining = sessions_named(conn, application_name).await;
    }
    remaining
}

pub async fn table_exists(conn: &mut PgConnection, table: &str) -> bool {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM information_schema.tables WHERE table_name = $1)",
    )
    .bind(table)
    .fetch_one(conn)
    .await
    .expect("Failed to query information_schema")
}
