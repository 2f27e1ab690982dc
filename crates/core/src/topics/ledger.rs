//! JSON file ledger store.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use tracing::debug;

use super::{Ledger, LedgerStore, Topic, TopicError};

/// Ledger kept as `{"published": [...]}` in a single JSON file.
///
/// Every write rewrites the whole document through a sibling temp file that
/// is synced and then renamed over the original.
pub struct JsonLedgerStore {
    path: PathBuf,
}

impl JsonLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn write(&self, ledger: &Ledger) -> Result<(), TopicError> {
        let json = serde_json::to_string_pretty(ledger)
            .map_err(|e| TopicError::Persistence(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.persistence_error(e))?;
            }
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp_path).map_err(|e| self.persistence_error(e))?;
        file.write_all(json.as_bytes())
            .and_then(|_| file.write_all(b"\n"))
            .and_then(|_| file.sync_all())
            .map_err(|e| self.persistence_error(e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| self.persistence_error(e))?;

        debug!("Wrote {} ledger entries to {:?}", ledger.len(), self.path);
        Ok(())
    }

    fn persistence_error(&self, e: std::io::Error) -> TopicError {
        TopicError::Persistence(format!("{}: {}", self.path.display(), e))
    }
}

impl LedgerStore for JsonLedgerStore {
    fn load(&self) -> Result<Ledger, TopicError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Ledger::default()),
            Err(e) => return Err(self.persistence_error(e)),
        };

        if content.trim().is_empty() {
            return Ok(Ledger::default());
        }

        serde_json::from_str(&content).map_err(|e| {
            TopicError::Configuration(format!(
                "malformed ledger {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn append(&self, topic: &Topic) -> Result<(), TopicError> {
        let mut ledger = self.load().map_err(|e| match e {
            TopicError::Configuration(msg) => TopicError::Persistence(msg),
            other => other,
        })?;
        ledger.published.push(topic.clone());
        self.write(&ledger)
    }

    fn reset(&self) -> Result<(), TopicError> {
        self.write(&Ledger::default())
    }
}
