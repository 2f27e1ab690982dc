pub mod config;
pub mod generator;
pub mod metrics;
pub mod pipeline;
pub mod publisher;
pub mod testing;
pub mod topics;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use generator::{ContentGenerator, Document, GenerationError, HttpContentGenerator, PromptTemplate};
pub use pipeline::{
    build_pipeline, build_rotator, ErrorKind, Pipeline, PipelineError, PipelineOutcome,
    PipelineStage, PublishTarget, RunMode,
};
pub use publisher::{HashnodeClient, PublicationError, PublicationMetadata, PublicationResult, Publisher};
pub use topics::{
    ExhaustionPolicy, JsonLedgerStore, LedgerStore, RotationStatus, SqliteLedgerStore, Topic,
    TopicCatalog, TopicError, TopicRotator, YamlTopicCatalog,
};
