use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0 and the preview is non-empty
/// - Catalog and ledger paths are set
/// - Prompt sampling parameters are in range
/// - Client timeouts are not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }
    if config.server.preview_chars == 0 {
        return Err(ConfigError::ValidationError(
            "server.preview_chars cannot be 0".to_string(),
        ));
    }

    // Topics
    if config.topics.catalog_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "topics.catalog_path cannot be empty".to_string(),
        ));
    }
    if config.topics.ledger_path().as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "topics.ledger_path cannot be empty".to_string(),
        ));
    }

    // Generator
    let prompt = &config.generator.prompt;
    if prompt.max_tokens == 0 {
        return Err(ConfigError::ValidationError(
            "generator.prompt.max_tokens cannot be 0".to_string(),
        ));
    }
    if !(0.0..=2.0).contains(&prompt.temperature) {
        return Err(ConfigError::ValidationError(format!(
            "generator.prompt.temperature must be between 0.0 and 2.0, got {}",
            prompt.temperature
        )));
    }
    if config.generator.endpoint.is_empty() {
        return Err(ConfigError::ValidationError(
            "generator.endpoint cannot be empty".to_string(),
        ));
    }

    // Timeouts
    if config.generator.timeout_secs == 0 || config.publisher.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
