//! YAML-backed topic catalog.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, warn};

use super::{Topic, TopicCatalog, TopicError};

#[derive(Debug, Deserialize)]
struct CatalogFile {
    topics: Vec<Topic>,
}

/// Catalog read from a YAML document of the form `topics: [...]`.
///
/// The file is re-read on every [`TopicCatalog::load`] call.
pub struct YamlTopicCatalog {
    path: PathBuf,
}

impl YamlTopicCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TopicCatalog for YamlTopicCatalog {
    fn load(&self) -> Result<Vec<Topic>, TopicError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            TopicError::Configuration(format!(
                "cannot read topic catalog {}: {}",
                self.path.display(),
                e
            ))
        })?;
        let topics = parse_catalog(&content).map_err(|e| match e {
            TopicError::Configuration(msg) => {
                TopicError::Configuration(format!("{}: {}", self.path.display(), msg))
            }
            other => other,
        })?;
        debug!("Loaded {} topics from {:?}", topics.len(), self.path);
        Ok(topics)
    }
}

/// Parse a catalog document. Empty catalogs are rejected.
pub fn parse_catalog(content: &str) -> Result<Vec<Topic>, TopicError> {
    let file: CatalogFile = serde_yaml::from_str(content)
        .map_err(|e| TopicError::Configuration(format!("invalid topic catalog: {}", e)))?;

    if file.topics.is_empty() {
        return Err(TopicError::Configuration(
            "topic catalog is empty".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for topic in &file.topics {
        if topic.as_str().trim() != topic.as_str() {
            warn!(
                "Topic {:?} has surrounding whitespace; it will not match a trimmed ledger entry",
                topic.as_str()
            );
        }
        if !seen.insert(topic) {
            warn!("Topic {:?} appears more than once in the catalog", topic.as_str());
        }
    }

    Ok(file.topics)
}
