//! Prenatal intake questionnaire.
//!
//! A consenting respondent answers ten fixed questions, one message at a
//! time. The step is persisted per phone as an ordinal; the last answer
//! triggers risk classification, stores a response row and offers an
//! educational pack.

pub mod education;
pub mod manager;
pub mod model;
pub mod parse;
pub mod prompts;
pub mod risk;
pub mod state;

pub use manager::IntakeManager;
pub use model::{IntakeAnswers, ResponseRecord, Session};
pub use risk::{Assessment, RiskLevel, classify};
pub use state::IntakeStep;
