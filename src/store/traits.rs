//! `Database` trait — single async interface for all persistence.

use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::intake::model::{NewResponse, ResponseRecord, Session};

/// A knowledge-base search hit, best match first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KbHit {
    pub title: String,
    /// Highlighted excerpt, or the full body when no snippet is available.
    pub snippet: String,
    pub body: String,
}

/// A knowledge-base document.
#[derive(Debug, Clone)]
pub struct KbEntry<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub tags: String,
}

/// Backend-agnostic database trait covering sessions, responses and the
/// knowledge base.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run all pending schema migrations.
    async fn init_schema(&self) -> Result<(), DatabaseError>;

    // ── Sessions ────────────────────────────────────────────────────

    /// Look up the in-progress session for a phone.
    async fn get_session(&self, phone: &str) -> Result<Option<Session>, DatabaseError>;

    /// Insert or update a session. `created_at` is kept on update.
    async fn save_session(&self, session: &Session) -> Result<(), DatabaseError>;

    /// Delete a session. Returns whether one existed.
    async fn end_session(&self, phone: &str) -> Result<bool, DatabaseError>;

    // ── Responses ───────────────────────────────────────────────────

    /// Insert a completed questionnaire. Returns the new row id.
    async fn store_response(&self, response: NewResponse<'_>) -> Result<i64, DatabaseError>;

    /// All stored responses, newest first.
    async fn list_responses(&self) -> Result<Vec<ResponseRecord>, DatabaseError>;

    /// Delete every stored response for a phone (opt-out). Returns the count.
    async fn delete_responses_for(&self, phone: &str) -> Result<usize, DatabaseError>;

    // ── Knowledge base ──────────────────────────────────────────────

    /// Whether the full-text index is available.
    async fn kb_available(&self) -> bool;

    /// Insert entries if the knowledge base is empty. Returns the count inserted.
    async fn seed_kb(&self, entries: &[KbEntry<'_>]) -> Result<usize, DatabaseError>;

    /// Full-text search; `match_query` is an FTS5 MATCH expression.
    async fn search_kb(&self, match_query: &str, limit: usize) -> Result<Vec<KbHit>, DatabaseError>;
}
