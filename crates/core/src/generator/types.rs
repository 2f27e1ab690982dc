//! Content generation types.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::topics::Topic;

/// Error type for content generation.
///
/// Every variant produced from a response keeps the raw body so it can be
/// logged or returned for diagnosis.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("API error: {status}")]
    Api { status: u16, raw: String },

    #[error("Response is not valid JSON: {message}")]
    InvalidJson { message: String, raw: String },

    #[error("Response did not contain generated text")]
    NoText { raw: String },

    #[error("Not configured: {0}")]
    NotConfigured(String),
}

impl GenerationError {
    /// The unparsed upstream response body, when there was one.
    pub fn raw_payload(&self) -> Option<&str> {
        match self {
            GenerationError::Api { raw, .. }
            | GenerationError::InvalidJson { raw, .. }
            | GenerationError::NoText { raw } => Some(raw),
            _ => None,
        }
    }

    pub(crate) fn from_reqwest(e: reqwest::Error, timeout: Duration) -> Self {
        if e.is_timeout() {
            GenerationError::Timeout(timeout)
        } else {
            GenerationError::Http(e.to_string())
        }
    }
}

/// Prompt settings. `instructions` may reference the topic as `{topic}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// Role context sent as the system message.
    #[serde(default = "default_system")]
    pub system: String,
    /// Instruction body sent as the user message.
    #[serde(default = "default_instructions")]
    pub instructions: String,
    /// Maximum tokens to generate.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_system() -> String {
    "You are a senior DevOps engineer and technical writer.".to_string()
}

fn default_instructions() -> String {
    r#"Write a short DevOps blog post for the series "Daily Dose of DevOps".

Topic: {topic}

Rules:
- Use markdown
- Explain clearly
- Include a short code snippet if relevant
- End with a "Key Takeaways" section"#
        .to_string()
}

fn default_max_tokens() -> u32 {
    400
}

fn default_temperature() -> f64 {
    0.7
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            system: default_system(),
            instructions: default_instructions(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl PromptTemplate {
    /// Instruction body for `topic`. Without a `{topic}` placeholder the topic
    /// is appended on its own line.
    pub fn render(&self, topic: &Topic) -> String {
        if self.instructions.contains("{topic}") {
            self.instructions.replace("{topic}", topic.as_str())
        } else {
            format!("{}\n\nTopic: {}", self.instructions.trim_end(), topic)
        }
    }

    /// System text and instructions as a single prompt, for endpoints without roles.
    pub fn render_single(&self, topic: &Topic) -> String {
        if self.system.is_empty() {
            self.render(topic)
        } else {
            format!("{}\n\n{}", self.system, self.render(topic))
        }
    }
}

/// Markdown produced for one topic. The text is kept exactly as returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub markdown: String,
    /// Model that produced the text, as configured.
    pub model: String,
}

impl Document {
    pub fn new(markdown: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            model: model.into(),
        }
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.markdown.chars().count()
    }

    /// The first `max_chars` characters.
    pub fn preview(&self, max_chars: usize) -> String {
        self.markdown.chars().take(max_chars).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_placeholder() {
        let template = PromptTemplate::default();
        let prompt = template.render(&Topic::from("CI/CD fundamentals"));
        assert!(prompt.contains("Topic: CI/CD fundamentals"));
        assert!(!prompt.contains("{topic}"));
    }

    #[test]
    fn test_render_appends_topic_without_placeholder() {
        let template = PromptTemplate {
            instructions: "Write a post.\n".to_string(),
            ..Default::default()
        };
        assert_eq!(
            template.render(&Topic::from("GitOps")),
            "Write a post.\n\nTopic: GitOps"
        );
    }

    #[test]
    fn test_render_single_prefixes_system() {
        let template = PromptTemplate::default();
        let prompt = template.render_single(&Topic::from("GitOps"));
        assert!(prompt.starts_with("You are a senior DevOps engineer"));
        assert!(prompt.contains("Topic: GitOps"));
    }

    #[test]
    fn test_template_defaults_from_empty_toml() {
        let template: PromptTemplate = toml::from_str("").unwrap();
        assert_eq!(template.max_tokens, 400);
        assert_eq!(template.temperature, 0.7);
    }

    #[test]
    fn test_preview_counts_characters() {
        let doc = Document::new("é".repeat(600), "m");
        assert_eq!(doc.char_len(), 600);
        assert_eq!(doc.preview(500).chars().count(), 500);
        assert_eq!(Document::new("short", "m").preview(500), "short");
    }

    #[test]
    fn test_raw_payload() {
        let err = GenerationError::InvalidJson {
            message: "expected value".to_string(),
            raw: "<html>Bad Gateway</html>".to_string(),
        };
        assert_eq!(err.raw_payload(), Some("<html>Bad Gateway</html>"));
        assert_eq!(GenerationError::Http("reset".to_string()).raw_payload(), None);
    }
}
