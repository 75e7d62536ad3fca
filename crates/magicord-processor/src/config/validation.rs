//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{GeneratorConfig, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &GeneratorConfig) -> ConfigResult<()> {
    if let Some(dir) = &config.out_dir
        && dir.as_os_str().is_empty()
    {
        return Err(ConfigError::validation("out_dir must not be empty"));
    }
    validate_logging_config(&config.logging)?;
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    if let Some(target) = logging.filters.keys().find(|target| target.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "Invalid log filter target: {target:?}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogLevel;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GeneratorConfig::default()).is_ok());
    }

    #[test]
    fn test_empty_out_dir() {
        let config = GeneratorConfig {
            out_dir: Some(PathBuf::new()),
            ..Default::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_file_output_requires_path() {
        let mut config = GeneratorConfig::default();
        config.logging.output = LogOutput::File;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { field }) if field == "logging.file_path"
        ));

        config.logging.file_path = Some(PathBuf::from("magicord.log"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_blank_filter_target() {
        let mut config = GeneratorConfig::default();
        config.logging.filters.insert(" ".to_string(), LogLevel::Debug);
        assert!(validate_config(&config).is_err());
    }
}
