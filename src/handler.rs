//! Invocation envelope: a question in, a body-and-status envelope out.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::pipeline::RagPipeline;
use crate::types::RagError;

/// Incoming event. The question may be absent; an absent question is handled
/// as an empty one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionEvent {
    #[serde(default)]
    pub question: Option<String>,
}

impl QuestionEvent {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: Some(question.into()),
        }
    }
}

/// Outgoing envelope. The success path always carries status 200; failures
/// propagate as [`RagError`] rather than an error-status envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub body: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

impl QuestionResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            status_code: 200,
        }
    }
}

/// Runs the full pipeline for one event.
pub async fn handle(
    pipeline: &RagPipeline,
    event: QuestionEvent,
) -> Result<QuestionResponse, RagError> {
    let question = event.question.unwrap_or_default();
    info!(question = %question, "handling question event");
    let body = pipeline.answer(&question).await?;
    Ok(QuestionResponse::ok(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_deserializes_with_absent_question() {
        let event: QuestionEvent = serde_json::from_str("{}").unwrap();
        assert!(event.question.is_none());
    }

    #[test]
    fn event_deserializes_with_question() {
        let event: QuestionEvent =
            serde_json::from_str(r#"{"question": "What is task decomposition?"}"#).unwrap();
        assert_eq!(event.question.as_deref(), Some("What is task decomposition?"));
    }

    #[test]
    fn response_serializes_with_camel_case_status() {
        let response = QuestionResponse::ok("answer text");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["body"], "answer text");
        assert_eq!(json["statusCode"], 200);
    }
}
