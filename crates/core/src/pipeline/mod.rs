//! Generate-then-publish pipeline.
//!
//! ```text
//! Idle -> Selecting -> Generating -> PublishDecision -+-> Done            (preview)
//!                                                     +-> Publishing -> Recording -> Done
//! any stage --error--> Failed
//! ```
//!
//! The pipeline is a plain value-returning function; the HTTP handler and
//! the batch binary are thin adapters that choose a [`RunMode`] and turn the
//! result into a response or an exit code.

mod bootstrap;
mod runner;
mod types;

pub use bootstrap::{build_pipeline, build_rotator};
pub use runner::{Pipeline, PublishTarget};
pub use types::{ErrorKind, PipelineError, PipelineOutcome, PipelineStage, RunMode};
