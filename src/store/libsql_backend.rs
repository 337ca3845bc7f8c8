//! libSQL backend — async `LeadStore` implementation.
//!
//! Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::{LeadStore, StoredLead};
use crate::wizard::model::{AnswerRecord, SubmittedLead};

/// Column list shared by every lead query. Order matches `row_to_lead`.
const LEAD_COLUMNS: &str = "id, app_id, user_id, source, industry, employees, exports, \
    investing_in_tech, training_needed, contact_name, company_name, contact_email, \
    contact_phone, created_at";

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db).await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;
        Self::from_database(db).await
    }

    async fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;
        migrations::run_migrations(&conn).await?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Most recent leads filed under `app_id`, newest first.
    pub async fn list_leads(
        &self,
        app_id: &str,
        limit: usize,
    ) -> Result<Vec<StoredLead>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {LEAD_COLUMNS} FROM leads WHERE app_id = ?1
                     ORDER BY created_at DESC LIMIT ?2"
                ),
                params![app_id, limit as i64],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_leads: {e}")))?;

        let mut leads = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("list_leads: {e}")))?
        {
            leads.push(
                row_to_lead(&row)
                    .map_err(|e| DatabaseError::Serialization(format!("lead row: {e}")))?,
            );
        }
        Ok(leads)
    }

    /// Number of leads filed under `app_id`.
    pub async fn count_leads(&self, app_id: &str) -> Result<usize, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT COUNT(*) FROM leads WHERE app_id = ?1", params![app_id])
            .await
            .map_err(|e| DatabaseError::Query(format!("count_leads: {e}")))?;
        let row = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("count_leads: {e}")))?;
        match row {
            Some(row) => {
                let count: i64 = row
                    .get(0)
                    .map_err(|e| DatabaseError::Query(format!("count_leads: {e}")))?;
                Ok(count as usize)
            }
            None => Ok(0),
        }
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

fn opt_text(s: Option<String>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s),
        None => libsql::Value::Null,
    }
}

/// Map a libsql Row to a StoredLead. Column order matches LEAD_COLUMNS.
fn row_to_lead(row: &libsql::Row) -> Result<StoredLead, libsql::Error> {
    let industry = row
        .get::<String>(4)
        .ok()
        .and_then(|s| s.parse().ok());
    let created_str: String = row.get(13)?;

    let answers = AnswerRecord {
        industry,
        employee_count_bucket: row.get(5)?,
        exports: row.get::<i64>(6)? != 0,
        investing_in_tech: row.get::<i64>(7)? != 0,
        training_needed: row.get::<i64>(8)? != 0,
        contact_name: row.get(9)?,
        company_name: row.get(10)?,
        contact_email: row.get(11)?,
        contact_phone: row.get(12)?,
    };

    Ok(StoredLead {
        id: row.get(0)?,
        lead: SubmittedLead {
            answers,
            timestamp: parse_datetime(&created_str),
            user_id: row.get(2)?,
            source: row.get(3)?,
            app_id: row.get(1)?,
        },
    })
}

// ── Trait implementation ────────────────────────────────────────────

#[async_trait]
impl LeadStore for LibSqlBackend {
    fn name(&self) -> &str {
        "libsql"
    }

    async fn insert_lead(&self, lead: &SubmittedLead) -> Result<String, DatabaseError> {
        let id = Uuid::new_v4().to_string();
        let answers = &lead.answers;
        self.conn()
            .execute(
                "INSERT INTO leads (id, app_id, user_id, source, industry, employees, exports,
                    investing_in_tech, training_needed, contact_name, company_name,
                    contact_email, contact_phone, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    id.clone(),
                    lead.app_id.clone(),
                    lead.user_id.clone(),
                    lead.source.clone(),
                    opt_text(answers.industry.map(|i| i.to_string())),
                    answers.employee_count_bucket.clone(),
                    i64::from(answers.exports),
                    i64::from(answers.investing_in_tech),
                    i64::from(answers.training_needed),
                    answers.contact_name.clone(),
                    answers.company_name.clone(),
                    answers.contact_email.clone(),
                    answers.contact_phone.clone(),
                    lead.timestamp.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_lead: {e}")))?;

        debug!(id = %id, app_id = %lead.app_id, "Lead inserted into DB");
        Ok(id)
    }
}
