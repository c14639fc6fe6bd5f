//! Help topics and knowledge-base answers.
//!
//! A question is answered from the fixed topic table when a keyword matches,
//! otherwise from a full-text search over the knowledge base. Search hits are
//! rendered as bullets, or summarised by an LLM when one is configured and
//! the question was asked explicitly with `?`.

pub mod topics;

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, warn};

use crate::error::DatabaseError;
use crate::llm::Summarizer;
use crate::store::{Database, KbHit};

pub use topics::{FAQ_MENU, mentions_topic};

/// Maximum knowledge-base hits used for one answer.
const MAX_HITS: usize = 3;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w{3,}").expect("valid regex"));

/// FTS5 prefix query for free text: every word of 3+ characters, lowercased,
/// with a trailing `*`. Empty when the text has no such word.
pub fn fts_query(text: &str) -> String {
    let lower = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lower)
        .map(|m| format!("{}*", m.as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn render_hits(hits: &[KbHit]) -> String {
    let bullets: Vec<String> = hits
        .iter()
        .map(|h| format!("• *{}*: {}", capitalize(&h.title), h.snippet))
        .collect();
    format!("*Informações relacionadas:*\n{}", bullets.join("\n"))
}

/// Answers help questions from the topic table and the knowledge base.
pub struct FaqService {
    db: Arc<dyn Database>,
    summarizer: Option<Arc<dyn Summarizer>>,
}

impl FaqService {
    pub fn new(db: Arc<dyn Database>, summarizer: Option<Arc<dyn Summarizer>>) -> Self {
        Self { db, summarizer }
    }

    /// Load the topic table into an empty knowledge base.
    pub async fn seed_knowledge_base(&self) -> Result<usize, DatabaseError> {
        self.db.seed_kb(&topics::kb_entries()).await
    }

    /// Answer a help question, or `None` when nothing relevant is known.
    pub async fn answer(&self, text: &str) -> Option<String> {
        let lowered = text.trim().to_lowercase();
        let (explicit, query) = match lowered.strip_prefix('?') {
            Some(rest) => (true, rest.trim()),
            None => (false, lowered.as_str()),
        };

        if let Some(topic) = topics::find_topic(query) {
            debug!(topic = topic.title(), "FAQ topic matched");
            return Some(topic.body.to_string());
        }

        let hits = self.search(query).await;
        if hits.is_empty() {
            return None;
        }

        if let Some(summarizer) = self.summarizer.as_ref().filter(|_| explicit) {
            let passages: Vec<String> = hits.iter().map(|h| h.body.clone()).collect();
            match summarizer.summarize(text, &passages).await {
                Ok(summary) => return Some(summary),
                Err(e) => {
                    warn!(
                        provider = summarizer.provider_name(),
                        error = %e,
                        "Summary failed; using search hits"
                    );
                }
            }
        }

        Some(render_hits(&hits))
    }

    async fn search(&self, query: &str) -> Vec<KbHit> {
        let fts = fts_query(query);
        if fts.is_empty() {
            return Vec::new();
        }
        match self.db.search_kb(&fts, MAX_HITS).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "Knowledge-base search failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::store::LibSqlBackend;
    use async_trait::async_trait;

    struct FixedSummarizer(Result<&'static str, ()>);

    #[async_trait]
    impl Summarizer for FixedSummarizer {
        fn provider_name(&self) -> &str {
            "fixed"
        }

        async fn summarize(&self, _question: &str, passages: &[String]) -> Result<String, LlmError> {
            assert!(!passages.is_empty());
            self.0.map(str::to_string).map_err(|_| LlmError::InvalidResponse {
                provider: "fixed".into(),
                reason: "boom".into(),
            })
        }
    }

    async fn service(summarizer: Option<Arc<dyn Summarizer>>) -> FaqService {
        let db: Arc<dyn Database> = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        assert!(db.kb_available().await, "bundled SQLite must ship FTS5");
        let faq = FaqService::new(Arc::clone(&db), summarizer);
        assert!(faq.seed_knowledge_base().await.unwrap() > 0);
        faq
    }

    #[test]
    fn fts_query_prefixes_words() {
        assert_eq!(fts_query("Dor de CABEÇA forte"), "dor* cabeça* forte*");
        assert_eq!(fts_query("? a b"), "");
    }

    #[test]
    fn capitalize_title() {
        assert_eq!(capitalize("vacina"), "Vacina");
        assert_eq!(capitalize("ÉCLAMPSIA"), "Éclampsia");
        assert_eq!(capitalize(""), "");
    }

    #[tokio::test]
    async fn keyword_topic_wins() {
        let faq = service(None).await;
        let answer = faq.answer("? Pressão alta").await.unwrap();
        assert!(answer.starts_with("*Pressão na gravidez*"));
    }

    #[tokio::test]
    async fn falls_back_to_knowledge_base() {
        let faq = service(None).await;
        let answer = faq.answer("? contraindicadas").await.unwrap();
        assert!(answer.starts_with("*Informações relacionadas:*\n• *Vacina*:"));
    }

    #[tokio::test]
    async fn unknown_topic_is_none() {
        let faq = service(None).await;
        assert!(faq.answer("? xyzzy").await.is_none());
        assert!(faq.answer("?").await.is_none());
    }

    #[tokio::test]
    async fn summary_only_for_explicit_questions() {
        let faq = service(Some(Arc::new(FixedSummarizer(Ok("resumo"))))).await;
        assert_eq!(faq.answer("? contraindicadas").await.unwrap(), "resumo");
        assert!(faq
            .answer("contraindicadas")
            .await
            .unwrap()
            .starts_with("*Informações relacionadas:*"));
    }

    #[tokio::test]
    async fn failed_summary_falls_back_to_bullets() {
        let faq = service(Some(Arc::new(FixedSummarizer(Err(()))))).await;
        let answer = faq.answer("? contraindicadas").await.unwrap();
        assert!(answer.starts_with("*Informações relacionadas:*"));
    }
}
