//! Content generation: topic in, markdown out.
//!
//! A generator makes exactly one call to an external text-generation service
//! per topic. Providers disagree on where the text lives in the response, so
//! extraction goes through [`ResponseShape`], which tries each known layout in
//! a fixed order.

mod http;
mod response;
mod types;

pub use http::HttpContentGenerator;
pub use response::{extract_text, ResponseShape};
pub use types::{Document, GenerationError, PromptTemplate};

use async_trait::async_trait;

use crate::topics::Topic;

/// Trait for text-generation backends.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Name of this generator for logging.
    fn name(&self) -> &str;

    /// Produce a markdown post for `topic`. Single attempt, no retries.
    async fn generate(
        &self,
        topic: &Topic,
        template: &PromptTemplate,
    ) -> Result<Document, GenerationError>;
}
