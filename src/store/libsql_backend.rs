//! libSQL backend — async `Database` trait implementation.
//!
//! Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info, warn};

use crate::error::DatabaseError;
use crate::intake::model::{IntakeAnswers, NewResponse, ResponseRecord, Session};
use crate::intake::risk::RiskLevel;
use crate::store::migrations;
use crate::store::traits::{Database, KbEntry, KbHit};

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
    kb_ready: AtomicBool,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db).await?;
        backend.apply_pragmas().await;
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

        let backend = Self {
            db: Arc::new(db),
            conn,
            kb_ready: AtomicBool::new(false),
        };
        backend.init_schema().await?;
        Ok(backend)
    }

    /// WAL and a busy timeout so concurrent webhook calls don't trip over
    /// each other. Failures only cost performance.
    async fn apply_pragmas(&self) {
        for pragma in [
            "PRAGMA journal_mode=WAL",
            "PRAGMA synchronous=NORMAL",
            "PRAGMA busy_timeout=3000",
        ] {
            // journal_mode returns a row, so go through query()
            if let Err(e) = self.conn.query(pragma, ()).await {
                warn!(pragma, error = %e, "Failed to apply pragma");
            }
        }
    }

    /// Get the connection.
    fn conn(&self) -> &Connection {
        &self.conn
    }

    async fn detect_kb(&self) -> bool {
        let found = match self
            .conn
            .query(
                "SELECT COUNT(*) FROM sqlite_master WHERE name = 'kb_fts'",
                (),
            )
            .await
        {
            Ok(mut rows) => matches!(
                rows.next().await,
                Ok(Some(row)) if row.get::<i64>(0).unwrap_or(0) > 0
            ),
            Err(_) => false,
        };
        self.kb_ready.store(found, Ordering::Relaxed);
        found
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

fn opt_int(v: Option<u32>) -> libsql::Value {
    match v {
        Some(v) => libsql::Value::Integer(i64::from(v)),
        None => libsql::Value::Null,
    }
}

fn parse_answers(json: &str) -> IntakeAnswers {
    serde_json::from_str(json).unwrap_or_else(|e| {
        warn!(error = %e, "Stored answers are not valid JSON; using empty answers");
        IntakeAnswers::default()
    })
}

/// Map a libsql Row to a Session.
///
/// Column order matches SESSION_COLUMNS.
fn row_to_session(row: &libsql::Row) -> Result<Session, libsql::Error> {
    let answers_str: String = row.get(2)?;
    let created_str: String = row.get(4)?;
    let updated_str: String = row.get(5)?;

    Ok(Session {
        phone: row.get(0)?,
        step_ordinal: row.get(1)?,
        answers: parse_answers(&answers_str),
        consented: row.get::<i64>(3)? != 0,
        created_at: parse_datetime(&created_str),
        updated_at: parse_datetime(&updated_str),
    })
}

/// Map a libsql Row to a ResponseRecord.
///
/// Column order matches RESPONSE_COLUMNS.
fn row_to_response(row: &libsql::Row) -> Result<ResponseRecord, DatabaseError> {
    let parse = |e: libsql::Error| DatabaseError::Query(format!("response row parse: {e}"));

    let answers_str: String = row.get(2).map_err(parse)?;
    let risk_str: String = row.get(3).map_err(parse)?;
    let created_str: String = row.get(6).map_err(parse)?;

    Ok(ResponseRecord {
        id: row.get(0).map_err(parse)?,
        phone: row.get(1).map_err(parse)?,
        answers: parse_answers(&answers_str),
        risk_level: risk_str
            .parse::<RiskLevel>()
            .map_err(DatabaseError::Serialization)?,
        gestational_weeks: row
            .get::<i64>(4)
            .ok()
            .and_then(|w| u32::try_from(w).ok()),
        consented: row.get::<i64>(5).map_err(parse)? != 0,
        created_at: parse_datetime(&created_str),
    })
}

// ── Trait implementation ────────────────────────────────────────────

const SESSION_COLUMNS: &str = "phone, step, answers, consented, created_at, updated_at";

const RESPONSE_COLUMNS: &str =
    "id, phone, answers, risk_level, gestational_weeks, consented, created_at";

#[async_trait]
impl Database for LibSqlBackend {
    async fn init_schema(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await?;
        self.detect_kb().await;
        Ok(())
    }

    // ── Sessions ────────────────────────────────────────────────────

    async fn get_session(&self, phone: &str) -> Result<Option<Session>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE phone = ?1"),
                params![phone],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_session: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let session = row_to_session(&row)
                    .map_err(|e| DatabaseError::Query(format!("get_session row parse: {e}")))?;
                Ok(Some(session))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_session: {e}"))),
        }
    }

    async fn save_session(&self, session: &Session) -> Result<(), DatabaseError> {
        let conn = self.conn();
        let answers = serde_json::to_string(&session.answers)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO sessions (phone, step, answers, consented, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT (phone) DO UPDATE SET
                step = excluded.step,
                answers = excluded.answers,
                consented = excluded.consented,
                updated_at = excluded.updated_at",
            params![
                session.phone.as_str(),
                session.step_ordinal,
                answers,
                i64::from(session.consented),
                now,
            ],
        )
        .await
        .map_err(|e| DatabaseError::Query(format!("save_session: {e}")))?;

        debug!(phone = %session.phone, step = session.step_ordinal, "Session saved");
        Ok(())
    }

    async fn end_session(&self, phone: &str) -> Result<bool, DatabaseError> {
        let conn = self.conn();
        let count = conn
            .execute("DELETE FROM sessions WHERE phone = ?1", params![phone])
            .await
            .map_err(|e| DatabaseError::Query(format!("end_session: {e}")))?;
        Ok(count > 0)
    }

    // ── Responses ───────────────────────────────────────────────────

    async fn store_response(&self, response: NewResponse<'_>) -> Result<i64, DatabaseError> {
        let conn = self.conn();
        let answers = serde_json::to_string(response.answers)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        let mut rows = conn
            .query(
                "INSERT INTO responses (phone, answers, risk_level, gestational_weeks, consented, created_at)
                 VALUES (?1, ?2, ?3, ?4, 1, ?5)
                 RETURNING id",
                params![
                    response.phone,
                    answers,
                    response.risk_level.as_str(),
                    opt_int(response.answers.gestational_weeks),
                    now,
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("store_response: {e}")))?;

        let id = match rows.next().await {
            Ok(Some(row)) => row
                .get::<i64>(0)
                .map_err(|e| DatabaseError::Query(format!("store_response id: {e}")))?,
            Ok(None) => {
                return Err(DatabaseError::Query(
                    "store_response: no id returned".to_string(),
                ));
            }
            Err(e) => return Err(DatabaseError::Query(format!("store_response: {e}"))),
        };

        info!(
            response_id = id,
            risk_level = %response.risk_level,
            "Response stored"
        );
        Ok(id)
    }

    async fn list_responses(&self) -> Result<Vec<ResponseRecord>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!("SELECT {RESPONSE_COLUMNS} FROM responses ORDER BY id DESC"),
                (),
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_responses: {e}")))?;

        let mut responses = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("list_responses: {e}")))?
        {
            responses.push(row_to_response(&row)?);
        }
        Ok(responses)
    }

    async fn delete_responses_for(&self, phone: &str) -> Result<usize, DatabaseError> {
        let conn = self.conn();
        let count = conn
            .execute("DELETE FROM responses WHERE phone = ?1", params![phone])
            .await
            .map_err(|e| DatabaseError::Query(format!("delete_responses_for: {e}")))?;
        Ok(count as usize)
    }

    // ── Knowledge base ──────────────────────────────────────────────

    async fn kb_available(&self) -> bool {
        self.kb_ready.load(Ordering::Relaxed)
    }

    async fn seed_kb(&self, entries: &[KbEntry<'_>]) -> Result<usize, DatabaseError> {
        if !self.kb_available().await {
            return Ok(0);
        }
        let conn = self.conn();

        let mut rows = conn
            .query("SELECT COUNT(*) FROM kb_fts", ())
            .await
            .map_err(|e| DatabaseError::Query(format!("seed_kb count: {e}")))?;
        let existing = match rows.next().await {
            Ok(Some(row)) => row.get::<i64>(0).unwrap_or(0),
            _ => 0,
        };
        if existing > 0 {
            return Ok(0);
        }

        for entry in entries {
            conn.execute(
                "INSERT INTO kb_fts (title, body, tags) VALUES (?1, ?2, ?3)",
                params![entry.title, entry.body, entry.tags.as_str()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("seed_kb: {e}")))?;
        }

        info!(entries = entries.len(), "Knowledge base seeded");
        Ok(entries.len())
    }

    async fn search_kb(&self, match_query: &str, limit: usize) -> Result<Vec<KbHit>, DatabaseError> {
        if !self.kb_available().await || match_query.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn();
        let mut rows = conn
            .query(
                "SELECT title, snippet(kb_fts, 1, '*', '*', '…', 10) AS snip, body
                 FROM kb_fts WHERE kb_fts MATCH ?1 ORDER BY bm25(kb_fts) LIMIT ?2",
                params![match_query, limit as i64],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("search_kb: {e}")))?;

        let mut hits = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("search_kb: {e}")))?
        {
            let title: String = row
                .get(0)
                .map_err(|e| DatabaseError::Query(format!("search_kb row parse: {e}")))?;
            let body: String = row
                .get(2)
                .map_err(|e| DatabaseError::Query(format!("search_kb row parse: {e}")))?;
            let snippet = row
                .get::<String>(1)
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| body.clone());
            hits.push(KbHit {
                title,
                snippet,
                body,
            });
        }
        Ok(hits)
    }
}
