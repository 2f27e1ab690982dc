//! Publishing generated posts to a blogging platform.

mod hashnode;
mod types;

pub use hashnode::{parse_publish_response, HashnodeClient};
pub use types::{PublicationError, PublicationMetadata, PublicationResult, PublishedPost};

use async_trait::async_trait;

use crate::generator::Document;

/// Trait for publishing backends.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Name of this publisher for logging.
    fn name(&self) -> &str;

    /// Submit `document` and return where it was published.
    async fn publish(
        &self,
        document: &Document,
        metadata: &PublicationMetadata,
    ) -> Result<PublishedPost, PublicationError>;
}
