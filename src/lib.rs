//! Prenatal intake bot — WhatsApp questionnaire, risk triage and export.

pub mod app;
pub mod config;
pub mod error;
pub mod export;
pub mod faq;
pub mod intake;
pub mod llm;
pub mod store;
pub mod webhook;
