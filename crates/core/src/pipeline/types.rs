//! Pipeline states, outcomes and errors.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::generator::{Document, GenerationError};
use crate::publisher::{PublicationError, PublicationResult};
use crate::topics::{Topic, TopicError};

/// Stages of one pipeline invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Idle,
    Selecting,
    Generating,
    PublishDecision,
    Publishing,
    Recording,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Idle => "idle",
            PipelineStage::Selecting => "selecting",
            PipelineStage::Generating => "generating",
            PipelineStage::PublishDecision => "publish_decision",
            PipelineStage::Publishing => "publishing",
            PipelineStage::Recording => "recording",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a run stops after generation or goes on to publish and record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Generate only; the ledger is not touched.
    Preview,
    /// Generate, publish, then record the topic.
    Publish,
}

impl RunMode {
    pub fn from_publish_flag(publish: bool) -> Self {
        if publish {
            RunMode::Publish
        } else {
            RunMode::Preview
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Preview => "preview",
            RunMode::Publish => "publish",
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub run_id: Uuid,
    pub topic: Topic,
    pub document: Document,
    /// Present only when the run published.
    pub publication: Option<PublicationResult>,
    /// Stages visited, in order, ending with [`PipelineStage::Done`].
    pub stages: Vec<PipelineStage>,
}

impl PipelineOutcome {
    pub fn published(&self) -> bool {
        self.publication.is_some()
    }

    pub fn url(&self) -> Option<&str> {
        self.publication.as_ref().map(|p| p.url.as_str())
    }
}

/// Error categories reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Exhausted,
    Generation,
    Publication,
    Persistence,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Exhausted => "exhausted",
            ErrorKind::Generation => "generation",
            ErrorKind::Publication => "publication",
            ErrorKind::Persistence => "persistence",
        }
    }
}

/// Any failure that ends a pipeline invocation.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Topic(#[from] TopicError),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Publication failed: {0}")]
    Publication(#[from] PublicationError),

    /// The post went out but the ledger was not updated; the topic will be
    /// selected again until the ledger is repaired.
    #[error("Published {url} but could not record topic {topic:?}: {source}")]
    Unrecorded {
        topic: String,
        url: String,
        #[source]
        source: TopicError,
    },
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Configuration(_) => ErrorKind::Configuration,
            PipelineError::Topic(TopicError::Configuration(_)) => ErrorKind::Configuration,
            PipelineError::Topic(TopicError::Exhausted { .. }) => ErrorKind::Exhausted,
            PipelineError::Topic(TopicError::Persistence(_)) => ErrorKind::Persistence,
            PipelineError::Generation(GenerationError::NotConfigured(_)) => ErrorKind::Configuration,
            PipelineError::Generation(_) => ErrorKind::Generation,
            PipelineError::Publication(PublicationError::NotConfigured(_)) => {
                ErrorKind::Configuration
            }
            PipelineError::Publication(_) => ErrorKind::Publication,
            PipelineError::Unrecorded { .. } => ErrorKind::Persistence,
        }
    }

    /// Raw upstream response attached to the error, if any.
    pub fn raw_payload(&self) -> Option<&str> {
        match self {
            PipelineError::Generation(e) => e.raw_payload(),
            PipelineError::Publication(e) => e.raw_payload(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            PipelineError::Topic(TopicError::Exhausted { total: 2 }).kind(),
            ErrorKind::Exhausted
        );
        assert_eq!(
            PipelineError::Topic(TopicError::Configuration("x".into())).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            PipelineError::Generation(GenerationError::NotConfigured("x".into())).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            PipelineError::Generation(GenerationError::NoText { raw: "[]".into() }).kind(),
            ErrorKind::Generation
        );
        assert_eq!(
            PipelineError::Publication(PublicationError::Http("x".into())).kind(),
            ErrorKind::Publication
        );
        assert_eq!(
            PipelineError::Unrecorded {
                topic: "a".into(),
                url: "https://x".into(),
                source: TopicError::Persistence("disk full".into()),
            }
            .kind(),
            ErrorKind::Persistence
        );
    }

    #[test]
    fn test_unrecorded_message_names_url() {
        let err = PipelineError::Unrecorded {
            topic: "GitOps".into(),
            url: "https://blog.example.dev/gitops".into(),
            source: TopicError::Persistence("disk full".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("https://blog.example.dev/gitops"));
        assert!(msg.contains("\"GitOps\""));
    }

    #[test]
    fn test_topic_error_is_transparent() {
        let err = PipelineError::from(TopicError::Exhausted { total: 4 });
        assert_eq!(err.to_string(), "All 4 topics have been published");
    }

    #[test]
    fn test_run_mode_from_flag() {
        assert_eq!(RunMode::from_publish_flag(true), RunMode::Publish);
        assert_eq!(RunMode::from_publish_flag(false), RunMode::Preview);
    }
}
