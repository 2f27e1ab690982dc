//! Topic selection over a catalog and a publication ledger.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{
    ExhaustionPolicy, Ledger, LedgerStore, RotationStatus, Topic, TopicCatalog, TopicError,
};
use crate::metrics;

/// Picks the first catalog topic that is not yet in the ledger.
///
/// Both the catalog and the ledger are re-read on every call. The rotator
/// holds no lock: callers must ensure a single invocation per ledger store.
pub struct TopicRotator {
    catalog: Arc<dyn TopicCatalog>,
    ledger: Arc<dyn LedgerStore>,
    policy: ExhaustionPolicy,
}

impl TopicRotator {
    pub fn new(catalog: Arc<dyn TopicCatalog>, ledger: Arc<dyn LedgerStore>) -> Self {
        Self {
            catalog,
            ledger,
            policy: ExhaustionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ExhaustionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ExhaustionPolicy {
        self.policy
    }

    /// Return the first unpublished topic in catalog order.
    ///
    /// With an exhausted catalog under [`ExhaustionPolicy::Reset`] this
    /// empties the ledger before returning the first topic.
    pub fn select_next(&self) -> Result<Topic, TopicError> {
        self.select(true)
    }

    /// Same choice as [`select_next`](Self::select_next), but never resets
    /// the ledger. Preview runs select through this.
    pub fn peek_next(&self) -> Result<Topic, TopicError> {
        self.select(false)
    }

    fn select(&self, allow_reset: bool) -> Result<Topic, TopicError> {
        let catalog = self.catalog.load()?;
        if catalog.is_empty() {
            return Err(TopicError::Configuration(
                "topic catalog is empty".to_string(),
            ));
        }
        let ledger = self.ledger.load()?;

        if let Some(topic) = first_remaining(&catalog, &ledger) {
            debug!(
                "Selected topic {:?} ({} of {} published)",
                topic.as_str(),
                ledger.as_set().len(),
                catalog.len()
            );
            return Ok(topic.clone());
        }

        match self.policy {
            ExhaustionPolicy::Fail => Err(TopicError::Exhausted {
                total: catalog.len(),
            }),
            ExhaustionPolicy::Reset if !allow_reset => {
                debug!(
                    "All {} topics have been published; the next publish run resets the ledger",
                    catalog.len()
                );
                Ok(catalog[0].clone())
            }
            ExhaustionPolicy::Reset => {
                warn!(
                    "All {} topics have been published; resetting the ledger ({} entries)",
                    catalog.len(),
                    ledger.len()
                );
                self.ledger.reset()?;
                metrics::LEDGER_RESETS.inc();
                Ok(catalog[0].clone())
            }
        }
    }

    /// Record `topic` as published. A topic already in the ledger is left alone.
    pub fn mark_published(&self, topic: &Topic) -> Result<(), TopicError> {
        let ledger = self.ledger.load().map_err(|e| match e {
            TopicError::Configuration(msg) => TopicError::Persistence(msg),
            other => other,
        })?;

        if ledger.contains(topic) {
            debug!("Topic {:?} already recorded, skipping append", topic.as_str());
            return Ok(());
        }

        if let Ok(catalog) = self.catalog.load() {
            if !catalog.contains(topic) {
                warn!("Recording topic {:?} that is not in the catalog", topic.as_str());
            }
        }

        self.ledger.append(topic)?;
        info!("Recorded topic {:?} as published", topic.as_str());
        Ok(())
    }

    /// Read-only view of the rotation; never resets the ledger.
    pub fn status(&self) -> Result<RotationStatus, TopicError> {
        let catalog = self.catalog.load()?;
        let ledger = self.ledger.load()?;
        let published = ledger.as_set();
        let remaining = catalog.iter().filter(|t| !published.contains(t)).count();

        Ok(RotationStatus {
            total: catalog.len(),
            published: catalog.iter().filter(|t| published.contains(t)).count(),
            remaining,
            next: first_remaining(&catalog, &ledger).cloned(),
            on_exhausted: self.policy,
        })
    }
}

fn first_remaining<'a>(catalog: &'a [Topic], ledger: &Ledger) -> Option<&'a Topic> {
    let published = ledger.as_set();
    catalog.iter().find(|t| !published.contains(t))
}
