//! In-memory topic catalog and ledger.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::lock;
use crate::topics::{Ledger, LedgerStore, Topic, TopicCatalog, TopicError};

/// Catalog backed by a fixed list.
///
/// An empty list loads as empty; rejecting it is left to the rotator.
#[derive(Debug, Default)]
pub struct StaticTopicCatalog {
    topics: Mutex<Vec<Topic>>,
}

impl StaticTopicCatalog {
    pub fn new(topics: &[&str]) -> Self {
        Self {
            topics: Mutex::new(topics.iter().map(|t| Topic::from(*t)).collect()),
        }
    }

    /// Replace the catalog, as if the file had been edited.
    pub fn set_topics(&self, topics: &[&str]) {
        *lock(&self.topics) = topics.iter().map(|t| Topic::from(*t)).collect();
    }
}

impl TopicCatalog for StaticTopicCatalog {
    fn load(&self) -> Result<Vec<Topic>, TopicError> {
        Ok(lock(&self.topics).clone())
    }
}

/// Ledger kept in memory, with failure injection for the append path.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    published: Mutex<Vec<Topic>>,
    resets: AtomicUsize,
    fail_next_append: AtomicBool,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with topics already published.
    pub fn with_topics(topics: &[&str]) -> Self {
        let store = Self::new();
        *lock(&store.published) = topics.iter().map(|t| Topic::from(*t)).collect();
        store
    }

    /// Published topics in append order.
    pub fn snapshot(&self) -> Vec<Topic> {
        lock(&self.published).clone()
    }

    /// Number of times [`LedgerStore::reset`] was called.
    pub fn reset_count(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }

    /// Make the next append fail with a persistence error.
    pub fn fail_next_append(&self) {
        self.fail_next_append.store(true, Ordering::SeqCst);
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load(&self) -> Result<Ledger, TopicError> {
        Ok(Ledger::new(self.snapshot()))
    }

    fn append(&self, topic: &Topic) -> Result<(), TopicError> {
        if self.fail_next_append.swap(false, Ordering::SeqCst) {
            return Err(TopicError::Persistence(
                "simulated ledger write failure".to_string(),
            ));
        }
        lock(&self.published).push(topic.clone());
        Ok(())
    }

    fn reset(&self) -> Result<(), TopicError> {
        lock(&self.published).clear();
        self.resets.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
