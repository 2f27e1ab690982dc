//! Publishing types.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::topics::Topic;

/// Errors that can occur when publishing a post.
#[derive(Debug, Error)]
pub enum PublicationError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("API error: {status}")]
    Api { status: u16, raw: String },

    #[error("Response is not valid JSON: {message}")]
    InvalidJson { message: String, raw: String },

    /// The mutation answered but no post URL could be resolved.
    #[error("No post URL in response{}", format_graphql_errors(.errors))]
    NoUrl { errors: Vec<String>, raw: String },

    #[error("Not configured: {0}")]
    NotConfigured(String),
}

fn format_graphql_errors(errors: &[String]) -> String {
    if errors.is_empty() {
        String::new()
    } else {
        format!(": {}", errors.join("; "))
    }
}

impl PublicationError {
    /// The unparsed upstream response body, when there was one.
    pub fn raw_payload(&self) -> Option<&str> {
        match self {
            PublicationError::Api { raw, .. }
            | PublicationError::InvalidJson { raw, .. }
            | PublicationError::NoUrl { raw, .. } => Some(raw),
            _ => None,
        }
    }

    pub(crate) fn from_reqwest(e: reqwest::Error, timeout: Duration) -> Self {
        if e.is_timeout() {
            PublicationError::Timeout(timeout)
        } else {
            PublicationError::Http(e.to_string())
        }
    }
}

/// What to publish a document as.
#[derive(Debug, Clone, PartialEq)]
pub struct PublicationMetadata {
    pub title: String,
    /// Destination publication on the platform.
    pub publication_id: String,
    /// Tag labels; slugs are derived from them.
    pub tags: Vec<String>,
}

/// A post the platform accepted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishedPost {
    /// Canonical URL of the post.
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// A topic and where its post ended up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicationResult {
    pub topic: Topic,
    pub url: String,
}
