//! Bridges a rig-core agent to the [`Summarizer`] trait.

use async_trait::async_trait;
use rig::agent::Agent;
use rig::completion::{CompletionModel, Prompt};

use super::{REQUEST_TIMEOUT, Summarizer, summary_prompt};
use crate::error::LlmError;

/// Summariser backed by any rig completion model.
pub struct RigSummarizer<M: CompletionModel> {
    agent: Agent<M>,
    provider: &'static str,
    model_name: String,
}

impl<M: CompletionModel> RigSummarizer<M> {
    pub fn new(agent: Agent<M>, provider: &'static str, model_name: &str) -> Self {
        Self {
            agent,
            provider,
            model_name: model_name.to_string(),
        }
    }
}

/// Trim a model reply; an empty reply is an error so the caller falls back.
fn finish_reply(provider: &str, reply: &str) -> Result<String, LlmError> {
    let reply = reply.trim();
    if reply.is_empty() {
        return Err(LlmError::InvalidResponse {
            provider: provider.to_string(),
            reason: "empty reply".to_string(),
        });
    }
    Ok(reply.to_string())
}

#[async_trait]
impl<M> Summarizer for RigSummarizer<M>
where
    M: CompletionModel + 'static,
{
    fn provider_name(&self) -> &str {
        self.provider
    }

    async fn summarize(&self, question: &str, passages: &[String]) -> Result<String, LlmError> {
        let prompt = summary_prompt(question, passages);
        let reply = tokio::time::timeout(REQUEST_TIMEOUT, self.agent.prompt(prompt))
            .await
            .map_err(|_| LlmError::Timeout {
                provider: self.provider.to_string(),
                timeout: REQUEST_TIMEOUT,
            })?
            .map_err(|e| LlmError::RequestFailed {
                provider: self.provider.to_string(),
                reason: format!("{}: {}", self.model_name, e),
            })?;
        tracing::debug!(provider = self.provider, chars = reply.len(), "Summary received");
        finish_reply(self.provider, &reply)
    }
}
