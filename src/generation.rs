//! Chat model seam.
//!
//! [`ChatModel`] is the substitution point for the hosted chat-completion
//! API. Production code adapts a rig-core [`CompletionModel`]; tests use
//! [`EchoChatModel`], which returns the prompt it received.

use std::sync::Arc;

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::CompletionModel;
use rig::message::AssistantContent;
use rig::providers::openai;

use crate::types::RagError;

/// Prompt-to-text service producing the final answer.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Identifier used in logs and telemetry.
    fn id(&self) -> &str;

    /// Generates a completion for the rendered prompt.
    async fn generate(&self, prompt: &str) -> Result<String, RagError>;
}

/// Adapter from any rig-core [`CompletionModel`] to [`ChatModel`].
#[derive(Clone)]
pub struct RigChatModel<M> {
    model: M,
    id: String,
    temperature: f64,
}

impl<M> RigChatModel<M>
where
    M: CompletionModel,
{
    pub fn new(model: M, id: impl Into<String>, temperature: f64) -> Self {
        Self {
            model,
            id: id.into(),
            temperature,
        }
    }
}

#[async_trait]
impl<M> ChatModel for RigChatModel<M>
where
    M: CompletionModel + 'static,
{
    fn id(&self) -> &str {
        &self.id
    }

    async fn generate(&self, prompt: &str) -> Result<String, RagError> {
        let request = self
            .model
            .completion_request(rig::completion::Message::user(prompt.to_string()))
            .temperature(self.temperature)
            .build();

        let response = self
            .model
            .completion(request)
            .await
            .map_err(|err| RagError::Generation(err.to_string()))?;

        let text = response
            .choice
            .into_iter()
            .filter_map(|content| match content {
                AssistantContent::Text(text) => Some(text.text),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(RagError::Generation(
                "model returned no text content".to_string(),
            ));
        }
        Ok(text)
    }
}

/// OpenAI-backed chat model for the given model name.
pub fn openai_chat(
    api_key: &str,
    model: &str,
    temperature: f64,
) -> Result<Arc<dyn ChatModel>, RagError> {
    let client: openai::Client = openai::Client::new(api_key)
        .map_err(|err| RagError::Config(format!("failed to build OpenAI client: {err}")))?;
    Ok(Arc::new(RigChatModel::new(
        client.completion_model(model),
        model,
        temperature,
    )))
}

/// Chat model that echoes its prompt back; the test double for generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoChatModel;

#[async_trait]
impl ChatModel for EchoChatModel {
    fn id(&self) -> &str {
        "echo"
    }

    async fn generate(&self, prompt: &str) -> Result<String, RagError> {
        Ok(prompt.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_model_constructs_and_reports_model_id() {
        let model = openai_chat("sk-test", "gpt-3.5-turbo", 0.0).unwrap();
        assert_eq!(model.id(), "gpt-3.5-turbo");
    }

    #[tokio::test]
    async fn echo_model_returns_its_prompt() {
        let model = EchoChatModel;
        let answer = model.generate("Context: a\nQuestion: b").await.unwrap();
        assert_eq!(answer, "Context: a\nQuestion: b");
        assert_eq!(model.id(), "echo");
    }
}
