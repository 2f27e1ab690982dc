//! Wiring a [`Pipeline`] from configuration.

use std::sync::Arc;

use tracing::{info, warn};

use super::{Pipeline, PipelineError, PublishTarget};
use crate::config::{Config, LedgerBackend};
use crate::generator::HttpContentGenerator;
use crate::publisher::HashnodeClient;
use crate::topics::{
    JsonLedgerStore, LedgerStore, SqliteLedgerStore, TopicRotator, YamlTopicCatalog,
};

/// Build the production pipeline.
///
/// Fails with a configuration error when no generation token can be
/// resolved. Missing publisher credentials only surface when a run tries to
/// publish.
pub fn build_pipeline(config: &Config) -> Result<Pipeline, PipelineError> {
    let rotator = build_rotator(config)?;

    let token = config.generator.resolve_api_token().ok_or_else(|| {
        PipelineError::Configuration(format!("{} not set", config.generator.api_token_env))
    })?;
    let generator = HttpContentGenerator::new(&config.generator, token)?;
    info!(
        "Text generation via {:?} ({})",
        config.generator.provider, config.generator.model
    );

    let pipeline = Pipeline::new(
        rotator,
        Arc::new(generator),
        config.generator.prompt.clone(),
    );

    let publisher_config = &config.publisher;
    match (
        publisher_config.resolve_api_token(),
        publisher_config.resolve_publication_id(),
    ) {
        (Some(token), Some(publication_id)) => {
            let client = HashnodeClient::new(publisher_config, token)?;
            info!("Publishing to {}", publisher_config.endpoint);
            Ok(pipeline.with_publisher(
                Arc::new(client),
                PublishTarget {
                    publication_id,
                    title_template: publisher_config.title_template.clone(),
                    tags: publisher_config.tags.clone(),
                },
            ))
        }
        (token, publication_id) => {
            let mut missing = Vec::new();
            if token.is_none() {
                missing.push(publisher_config.api_token_env.as_str());
            }
            if publication_id.is_none() {
                missing.push(publisher_config.publication_id_env.as_str());
            }
            let reason = format!("publisher not configured: {} not set", missing.join(", "));
            warn!("{}; publish runs will fail", reason);
            Ok(pipeline.without_publisher(reason))
        }
    }
}

/// Build the topic rotator alone (catalog, ledger backend, exhaustion policy).
pub fn build_rotator(config: &Config) -> Result<TopicRotator, PipelineError> {
    let topics = &config.topics;
    let catalog = Arc::new(YamlTopicCatalog::new(&topics.catalog_path));
    let ledger_path = topics.ledger_path();
    let ledger: Arc<dyn LedgerStore> = match topics.ledger_backend {
        LedgerBackend::Json => Arc::new(JsonLedgerStore::new(ledger_path)),
        LedgerBackend::Sqlite => Arc::new(SqliteLedgerStore::new(&ledger_path)?),
    };

    Ok(TopicRotator::new(catalog, ledger).with_policy(topics.on_exhausted))
}
