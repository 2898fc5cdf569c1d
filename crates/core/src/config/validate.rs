use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Check window and retention cap are at least 1
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.sync.check_window == 0 {
        return Err(ConfigError::ValidationError(
            "sync.check_window must be at least 1".to_string(),
        ));
    }

    if config.sync.retention_cap == 0 {
        return Err(ConfigError::ValidationError(
            "sync.retention_cap must be at least 1".to_string(),
        ));
    }

    if let Some(0) = config.sync.interval_secs {
        return Err(ConfigError::ValidationError(
            "sync.interval_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// Non-fatal observations about a configuration that operators should see.
pub fn config_warnings(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.sync.check_window > config.sync.retention_cap {
        warnings.push(format!(
            "sync.check_window ({}) exceeds sync.retention_cap ({}); extra fetched videos are truncated immediately",
            config.sync.check_window, config.sync.retention_cap
        ));
    }

    if config.sync.pace_ms == 0 {
        warnings.push("sync.pace_ms is 0; channels will be fetched back to back".to_string());
    }

    warnings
}
