//! Optional LLM summariser for knowledge-base answers.
//!
//! Supports:
//! - **OpenAI**: `gpt-4o-mini` via rig-core
//! - **Gemini**: `gemini-1.5-flash` via rig-core
//!
//! Both are wrapped in a `RigSummarizer`, which bounds every call by
//! [`REQUEST_TIMEOUT`]. A failed call is logged by the caller and the answer
//! falls back to bullets.

mod rig_adapter;

pub use rig_adapter::RigSummarizer;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rig::client::CompletionClient;
use secrecy::ExposeSecret;

use crate::config::{LlmBackend, LlmConfig};
use crate::error::LlmError;

/// Upper bound for a single summarisation call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

const OPENAI_MODEL: &str = "gpt-4o-mini";
const GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Sampling settings shared by every backend.
const TEMPERATURE: f64 = 0.2;
const MAX_TOKENS: u64 = 300;

/// Condenses knowledge-base passages into a short answer.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Provider name, for logs.
    fn provider_name(&self) -> &str;

    /// Answer `question` using only `passages`.
    async fn summarize(&self, question: &str, passages: &[String]) -> Result<String, LlmError>;
}

/// Create a summariser from configuration.
pub fn create_summarizer(config: &LlmConfig) -> Result<Arc<dyn Summarizer>, LlmError> {
    match config.backend {
        LlmBackend::OpenAi => create_openai_summarizer(config),
        LlmBackend::Gemini => create_gemini_summarizer(config),
    }
}

fn create_openai_summarizer(config: &LlmConfig) -> Result<Arc<dyn Summarizer>, LlmError> {
    use rig::providers::openai;

    let client: rig::client::Client<openai::client::OpenAIResponsesExt> =
        openai::Client::new(config.api_key.expose_secret()).map_err(|e| {
            LlmError::RequestFailed {
                provider: "openai".to_string(),
                reason: format!("Failed to create OpenAI client: {}", e),
            }
        })?;

    let agent = client
        .agent(OPENAI_MODEL)
        .temperature(TEMPERATURE)
        .max_tokens(MAX_TOKENS)
        .build();
    tracing::info!("LLM summariser: OpenAI (model: {})", OPENAI_MODEL);
    Ok(Arc::new(RigSummarizer::new(agent, "openai", OPENAI_MODEL)))
}

fn create_gemini_summarizer(config: &LlmConfig) -> Result<Arc<dyn Summarizer>, LlmError> {
    use rig::providers::gemini;

    let client = gemini::Client::new(config.api_key.expose_secret()).map_err(|e| {
        LlmError::RequestFailed {
            provider: "gemini".to_string(),
            reason: format!("Failed to create Gemini client: {}", e),
        }
    })?;

    let agent = client
        .agent(GEMINI_MODEL)
        .temperature(TEMPERATURE)
        .max_tokens(MAX_TOKENS)
        .build();
    tracing::info!("LLM summariser: Gemini (model: {})", GEMINI_MODEL);
    Ok(Arc::new(RigSummarizer::new(agent, "gemini", GEMINI_MODEL)))
}

/// Prompt shared by every backend.
pub fn summary_prompt(question: &str, passages: &[String]) -> String {
    format!(
        "Você é um assistente educativo em saúde materna. Responda em português, \
         curto e claro, sem diagnosticar nem prescrever. Em sinais de alerta, \
         oriente procurar serviço de saúde/SAMU 192.\n\n\
         PERGUNTA:\n{question}\n\n\
         FONTES:\n- {}\n\nResponda objetivamente (bullets quando útil).",
        passages.join("\n- ")
    )
}
