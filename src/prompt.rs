//! Prompt template handling.
//!
//! Templates carry `{context}` and `{question}` placeholders. They come
//! either from a remote registry, fetched by identifier, or from an inline
//! string.

use reqwest::Client;
use url::Url;

use crate::types::RagError;

pub const CONTEXT_PLACEHOLDER: &str = "{context}";
pub const QUESTION_PLACEHOLDER: &str = "{question}";

/// Inline fallback with the standard `rlm/rag-prompt` wording.
pub const DEFAULT_TEMPLATE: &str = "You are an assistant for question-answering tasks. \
Use the following pieces of retrieved context to answer the question. \
If you don't know the answer, just say that you don't know. \
Use three sentences maximum and keep the answer concise.\n\
Question: {question} \nContext: {context} \nAnswer:";

/// A validated prompt template.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Validates that both placeholders are present.
    pub fn new(template: impl Into<String>) -> Result<Self, RagError> {
        let template = template.into();
        for placeholder in [CONTEXT_PLACEHOLDER, QUESTION_PLACEHOLDER] {
            if !template.contains(placeholder) {
                return Err(RagError::Prompt(format!(
                    "template is missing the {placeholder} placeholder"
                )));
            }
        }
        Ok(Self { template })
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Substitutes the retrieved context and the user's question.
    pub fn render(&self, context: &str, question: &str) -> String {
        self.template
            .replace(CONTEXT_PLACEHOLDER, context)
            .replace(QUESTION_PLACEHOLDER, question)
    }
}

/// Pulls a template by identifier from a remote registry.
///
/// The registry contract is a plain-text GET of `{base_url}/{id}`.
pub async fn fetch_template(
    client: &Client,
    base_url: &Url,
    id: &str,
) -> Result<PromptTemplate, RagError> {
    let target = format!("{}/{}", base_url.as_str().trim_end_matches('/'), id);
    let target = Url::parse(&target)
        .map_err(|err| RagError::Prompt(format!("invalid registry URL '{target}': {err}")))?;
    tracing::debug!(url = %target, "fetching prompt template");
    let response = client.get(target).send().await?.error_for_status()?;
    let body = response.text().await?;
    PromptTemplate::new(body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_is_valid() {
        let template = PromptTemplate::new(DEFAULT_TEMPLATE).unwrap();
        assert!(template.as_str().contains("{question}"));
    }

    #[test]
    fn render_substitutes_both_placeholders() {
        let template =
            PromptTemplate::new("Context: {context}\nQuestion: {question}").unwrap();
        let rendered = template.render("the facts", "why?");
        assert_eq!(rendered, "Context: the facts\nQuestion: why?");
    }

    #[test]
    fn missing_context_placeholder_is_rejected() {
        let err = PromptTemplate::new("Question: {question}").unwrap_err();
        assert!(matches!(err, RagError::Prompt(_)));
    }

    #[test]
    fn missing_question_placeholder_is_rejected() {
        let err = PromptTemplate::new("Context: {context}").unwrap_err();
        assert!(matches!(err, RagError::Prompt(_)));
    }
}
