//! Topic rotation: which subject to write about next, and what has been published.
//!
//! The catalog is the ordered list of everything that can be written about.
//! The ledger is the append-only record of what has already gone out. The
//! rotator combines the two and always returns the first catalog topic that
//! is not in the ledger.

mod catalog;
mod ledger;
mod rotator;
mod sqlite_ledger;
mod types;

pub use catalog::{parse_catalog, YamlTopicCatalog};
pub use ledger::JsonLedgerStore;
pub use rotator::TopicRotator;
pub use sqlite_ledger::SqliteLedgerStore;
pub use types::*;

/// Source of candidate topics, in priority order.
pub trait TopicCatalog: Send + Sync {
    /// Load the full ordered catalog. Called once per selection.
    fn load(&self) -> Result<Vec<Topic>, TopicError>;
}

/// Persistent record of published topics.
///
/// Implementations only need to append and reset; membership checks and
/// duplicate suppression happen in [`TopicRotator`].
pub trait LedgerStore: Send + Sync {
    /// Load the ledger. A store that has never been written loads as empty.
    fn load(&self) -> Result<Ledger, TopicError>;

    /// Append one topic and make it durable before returning.
    fn append(&self, topic: &Topic) -> Result<(), TopicError>;

    /// Remove every entry.
    fn reset(&self) -> Result<(), TopicError>;
}
