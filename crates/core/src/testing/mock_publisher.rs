//! Mock publisher for testing.

use std::sync::Mutex;

use async_trait::async_trait;

use super::lock;
use crate::generator::Document;
use crate::publisher::{PublicationError, PublicationMetadata, PublishedPost, Publisher};
use crate::topics::slugify;

/// A recorded publish call.
#[derive(Debug, Clone)]
pub struct RecordedPublication {
    pub document: Document,
    pub metadata: PublicationMetadata,
    pub url: String,
}

/// Mock implementation of the [`Publisher`] trait.
///
/// Successful publishes return `https://mock.blog.dev/<title-slug>`.
#[derive(Debug, Default)]
pub struct MockPublisher {
    published: Mutex<Vec<RecordedPublication>>,
    next_error: Mutex<Option<PublicationError>>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next publish fail with `error`.
    pub fn fail_next(&self, error: PublicationError) {
        *lock(&self.next_error) = Some(error);
    }

    /// Successful publishes, in order.
    pub fn published(&self) -> Vec<RecordedPublication> {
        lock(&self.published).clone()
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn publish(
        &self,
        document: &Document,
        metadata: &PublicationMetadata,
    ) -> Result<PublishedPost, PublicationError> {
        if let Some(error) = lock(&self.next_error).take() {
            return Err(error);
        }

        let url = format!("https://mock.blog.dev/{}", slugify(&metadata.title));
        let mut published = lock(&self.published);
        published.push(RecordedPublication {
            document: document.clone(),
            metadata: metadata.clone(),
            url: url.clone(),
        });

        Ok(PublishedPost {
            id: Some(format!("post-{}", published.len())),
            url,
        })
    }
}
