//! Persistence layer — libSQL-backed storage for sessions, responses and the
//! knowledge base.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::{Database, KbEntry, KbHit};
