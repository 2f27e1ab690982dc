//! Testing utilities and mock implementations.
//!
//! The mocks stand in for the seams of the pipeline (topic catalog,
//! ledger store, text generator, publisher) so whole runs can be exercised
//! without network access or files on disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use dailydose_core::testing::{MemoryLedgerStore, MockContentGenerator, StaticTopicCatalog};
//!
//! let catalog = StaticTopicCatalog::new(&["GitOps", "SRE"]);
//! let ledger = MemoryLedgerStore::with_topics(&["GitOps"]);
//! let generator = MockContentGenerator::new();
//! generator.fail_next(GenerationError::Timeout(Duration::from_secs(60)));
//! ```

mod memory_ledger;
mod mock_generator;
mod mock_publisher;

pub use memory_ledger::{MemoryLedgerStore, StaticTopicCatalog};
pub use mock_generator::{MockContentGenerator, RecordedGeneration};
pub use mock_publisher::{MockPublisher, RecordedPublication};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mock's state, ignoring poisoning from a panicked test thread.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::config::Config;
    use crate::topics::Topic;

    /// A catalog of DevOps topics in rotation order.
    pub fn devops_topics() -> Vec<&'static str> {
        vec![
            "CI/CD fundamentals",
            "Container orchestration with Kubernetes",
            "Infrastructure as Code",
            "Observability and monitoring",
            "GitOps workflows",
        ]
    }

    /// The same catalog as YAML, as it would appear in `topics.yaml`.
    pub fn devops_catalog_yaml() -> String {
        let mut yaml = String::from("topics:\n");
        for topic in devops_topics() {
            yaml.push_str(&format!("  - \"{}\"\n", topic));
        }
        yaml
    }

    /// A generated post body longer than the default preview length.
    pub fn long_markdown(topic: &Topic) -> String {
        let mut markdown = format!("# {}\n\n", topic);
        for i in 1..=12 {
            markdown.push_str(&format!(
                "{}. Practical advice about {} that a team can apply this week.\n",
                i, topic
            ));
        }
        markdown
    }

    /// A config that never touches real credentials from the environment.
    pub fn offline_config() -> Config {
        let mut config = Config::default();
        config.generator.api_token_env = "DAILYDOSE_TEST_NO_SUCH_VAR".to_string();
        config.publisher.api_token_env = "DAILYDOSE_TEST_NO_SUCH_VAR".to_string();
        config.publisher.publication_id_env = "DAILYDOSE_TEST_NO_SUCH_VAR".to_string();
        config.pipeline.publish_env_var = "DAILYDOSE_TEST_NO_SUCH_VAR".to_string();
        config
    }
}
