use tokio::sync::Mutex;
use tracing::warn;

use dailydose_core::{
    build_rotator, Config, ErrorKind, Pipeline, PipelineError, RotationStatus, RunMode,
    SanitizedConfig,
};

/// Shared application state
pub struct AppState {
    config: Config,
    pipeline: Result<Pipeline, UnavailablePipeline>,
    run_mode: RunMode,
    /// Held for the duration of a pipeline run.
    run_lock: Mutex<()>,
}

/// Why the pipeline could not be built at startup.
#[derive(Debug, Clone)]
pub struct UnavailablePipeline {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<PipelineError> for UnavailablePipeline {
    fn from(error: PipelineError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl AppState {
    /// The run mode follows the configured publish flag in the process
    /// environment.
    pub fn new(config: Config, pipeline: Result<Pipeline, PipelineError>) -> Self {
        let run_mode = RunMode::from_publish_flag(config.pipeline.publish_context_active());
        let pipeline = pipeline.map_err(|e| {
            warn!("Pipeline unavailable, generate requests will fail: {}", e);
            UnavailablePipeline::from(e)
        });
        Self {
            config,
            pipeline,
            run_mode,
            run_lock: Mutex::new(()),
        }
    }

    pub fn with_run_mode(mut self, run_mode: RunMode) -> Self {
        self.run_mode = run_mode;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn pipeline(&self) -> Result<&Pipeline, &UnavailablePipeline> {
        self.pipeline.as_ref()
    }

    pub fn run_mode(&self) -> RunMode {
        self.run_mode
    }

    pub fn run_lock(&self) -> &Mutex<()> {
        &self.run_lock
    }

    /// Rotation status, available even when the pipeline is not.
    pub fn rotation_status(&self) -> Result<RotationStatus, PipelineError> {
        match &self.pipeline {
            Ok(pipeline) => Ok(pipeline.rotator().status()?),
            Err(_) => Ok(build_rotator(&self.config)?.status()?),
        }
    }
}
