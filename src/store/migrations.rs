//! Schema migrations for the leads database.
//!
//! Applied versions live in `_migrations`. Each pending migration runs in its
//! own transaction together with its version row, so a failed step leaves the
//! schema at the previous version. A database stamped with a version this
//! build does not know is refused.

use libsql::{Connection, params};
use tracing::{debug, info};

use crate::error::DatabaseError;

/// `(version, name, sql)` in ascending version order. Append only.
const MIGRATIONS: &[(i64, &str, &str)] = &[(
    1,
    "leads",
    r#"
        CREATE TABLE IF NOT EXISTS leads (
            id TEXT PRIMARY KEY,
            app_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            source TEXT NOT NULL,
            industry TEXT,
            employees TEXT NOT NULL DEFAULT '',
            exports INTEGER NOT NULL DEFAULT 0,
            investing_in_tech INTEGER NOT NULL DEFAULT 0,
            training_needed INTEGER NOT NULL DEFAULT 0,
            contact_name TEXT NOT NULL,
            company_name TEXT NOT NULL,
            contact_email TEXT NOT NULL,
            contact_phone TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_leads_app_id ON leads(app_id);
        CREATE INDEX IF NOT EXISTS idx_leads_created_at ON leads(created_at);
    "#,
)];

const CREATE_TRACKING_TABLE: &str = "CREATE TABLE IF NOT EXISTS _migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
)";

/// Newest schema version this build can produce.
fn latest_version() -> i64 {
    MIGRATIONS.last().map_or(0, |(version, _, _)| *version)
}

/// Bring the schema up to `latest_version()`.
pub async fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute(CREATE_TRACKING_TABLE, ())
        .await
        .map_err(|e| DatabaseError::Migration(format!("create _migrations: {e}")))?;

    let current = schema_version(conn).await?;
    let latest = latest_version();
    if current > latest {
        return Err(DatabaseError::Migration(format!(
            "database schema is V{current}, this build only knows up to V{latest}"
        )));
    }

    let mut applied = 0;
    for &(version, name, sql) in MIGRATIONS.iter().filter(|(v, _, _)| *v > current) {
        apply(conn, version, name, sql).await?;
        applied += 1;
    }
    debug!(version = latest, applied, "Leads schema up to date");
    Ok(())
}

async fn apply(conn: &Connection, version: i64, name: &str, sql: &str) -> Result<(), DatabaseError> {
    let step_err = |stage: &str, e: libsql::Error| {
        DatabaseError::Migration(format!("V{version} ({name}) {stage}: {e}"))
    };

    let tx = conn.transaction().await.map_err(|e| step_err("begin", e))?;
    tx.execute_batch(sql).await.map_err(|e| step_err("schema", e))?;
    tx.execute(
        "INSERT INTO _migrations (version, name) VALUES (?1, ?2)",
        params![version, name],
    )
    .await
    .map_err(|e| step_err("record", e))?;
    tx.commit().await.map_err(|e| step_err("commit", e))?;

    info!(version, name, "Applied leads schema migration");
    Ok(())
}

/// Highest recorded version; 0 for a fresh database.
async fn schema_version(conn: &Connection) -> Result<i64, DatabaseError> {
    let mut rows = conn
        .query("SELECT COALESCE(MAX(version), 0) FROM _migrations", ())
        .await
        .map_err(|e| DatabaseError::Migration(format!("read schema version: {e}")))?;
    let row = rows
        .next()
        .await
        .map_err(|e| DatabaseError::Migration(format!("read schema version: {e}")))?;
    row.map_or(Ok(0), |row| {
        row.get::<i64>(0)
            .map_err(|e| DatabaseError::Migration(format!("parse schema version: {e}")))
    })
}
