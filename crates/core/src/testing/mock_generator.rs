//! Mock text generator for testing.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::{fixtures, lock};
use crate::generator::{ContentGenerator, Document, GenerationError, PromptTemplate};
use crate::topics::Topic;

/// A recorded generation request for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedGeneration {
    pub topic: Topic,
    pub template: PromptTemplate,
    pub timestamp: Instant,
}

/// Mock implementation of the [`ContentGenerator`] trait.
///
/// By default every topic yields [`fixtures::long_markdown`]. Responses,
/// one-shot failures and an artificial delay can be configured.
#[derive(Debug, Default)]
pub struct MockContentGenerator {
    response: Mutex<Option<String>>,
    requests: Mutex<Vec<RecordedGeneration>>,
    next_error: Mutex<Option<GenerationError>>,
    delay: Mutex<Option<Duration>>,
}

impl MockContentGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return this markdown for every topic instead of the default body.
    pub fn set_response(&self, markdown: impl Into<String>) {
        *lock(&self.response) = Some(markdown.into());
    }

    /// Make the next generation fail with `error`.
    pub fn fail_next(&self, error: GenerationError) {
        *lock(&self.next_error) = Some(error);
    }

    /// Sleep this long before answering.
    pub fn set_delay(&self, delay: Duration) {
        *lock(&self.delay) = Some(delay);
    }

    pub fn requests(&self) -> Vec<RecordedGeneration> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl ContentGenerator for MockContentGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(
        &self,
        topic: &Topic,
        template: &PromptTemplate,
    ) -> Result<Document, GenerationError> {
        lock(&self.requests).push(RecordedGeneration {
            topic: topic.clone(),
            template: template.clone(),
            timestamp: Instant::now(),
        });

        let delay = *lock(&self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = lock(&self.next_error).take() {
            return Err(error);
        }

        let markdown = lock(&self.response)
            .clone()
            .unwrap_or_else(|| fixtures::long_markdown(topic));
        Ok(Document::new(markdown, "mock-model"))
    }
}
