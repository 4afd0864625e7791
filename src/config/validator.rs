use crate::config::{parse_duration, Config, SCHEMA_VERSION};
use crate::error::{EnlinkError, Result, ValidationError};
use std::time::Duration;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_retry(config, &mut errors);
        Self::validate_resolver(config, &mut errors);
        Self::validate_extractor(config, &mut errors);
        Self::validate_enrichment(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(EnlinkError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != SCHEMA_VERSION {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_retry(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.retry.max_attempts == 0 {
            errors.push(ValidationError::new(
                "retry.max_attempts",
                "Max attempts must be at least 1",
            ));
        }

        let base = Self::check_duration("retry.base_delay", &config.retry.base_delay, errors);
        let max = Self::check_duration("retry.max_delay", &config.retry.max_delay, errors);

        if let (Some(base), Some(max)) = (base, max) {
            if base > max {
                errors.push(ValidationError::new(
                    "retry.base_delay",
                    format!(
                        "Base delay ({:?}) must not exceed max delay ({:?})",
                        base, max
                    ),
                ));
            }
        }
    }

    fn validate_resolver(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.resolver.endpoint.is_empty() {
            errors.push(ValidationError::new(
                "resolver.endpoint",
                "Resolver endpoint cannot be empty",
            ));
        }

        if config.resolver.user_agent.is_empty() {
            errors.push(ValidationError::new(
                "resolver.user_agent",
                "User agent cannot be empty",
            ));
        }

        if config.resolver.max_concurrent == 0 {
            errors.push(ValidationError::new(
                "resolver.max_concurrent",
                "Max concurrent requests must be greater than 0",
            ));
        }

        Self::check_duration(
            "resolver.request_timeout",
            &config.resolver.request_timeout,
            errors,
        );
    }

    fn validate_extractor(config: &Config, errors: &mut Vec<ValidationError>) {
        // The API key itself is only required when the extractor is used,
        // so only the variable name is checked here.
        if config.extractor.api_key_env.is_empty() {
            errors.push(ValidationError::new(
                "extractor.api_key_env",
                "API key environment variable name cannot be empty",
            ));
        }

        if config.extractor.endpoint.is_empty() {
            errors.push(ValidationError::new(
                "extractor.endpoint",
                "Extractor endpoint cannot be empty",
            ));
        }

        if config.extractor.model.is_empty() {
            errors.push(ValidationError::new(
                "extractor.model",
                "Model name cannot be empty",
            ));
        }

        let temp = config.extractor.temperature;
        if !(0.0..=2.0).contains(&temp) {
            errors.push(ValidationError::new(
                "extractor.temperature",
                format!("Temperature must be between 0.0 and 2.0, got {}", temp),
            ));
        }

        Self::check_duration(
            "extractor.request_timeout",
            &config.extractor.request_timeout,
            errors,
        );
    }

    fn validate_enrichment(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.enrichment.whitelist.is_empty() {
            errors.push(ValidationError::new(
                "enrichment.whitelist",
                "Whitelist must contain at least one label",
            ));
        }
    }

    fn check_duration(
        path: &str,
        value: &str,
        errors: &mut Vec<ValidationError>,
    ) -> Option<Duration> {
        match parse_duration(value) {
            Ok(duration) => Some(duration),
            Err(message) => {
                errors.push(ValidationError::new(path, message));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::LabelSet;

    fn error_paths(config: &Config) -> Vec<String> {
        match ConfigValidator::validate(config) {
            Err(EnlinkError::ConfigValidation { errors }) => {
                errors.into_iter().map(|e| e.path).collect()
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_config() {
        let config = Config::default();
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_zero_attempts() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;
        assert_eq!(error_paths(&config), vec!["retry.max_attempts"]);
    }

    #[test]
    fn test_base_delay_above_max() {
        let mut config = Config::default();
        config.retry.base_delay = "30s".to_string();
        assert_eq!(error_paths(&config), vec!["retry.base_delay"]);
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = Config::default();
        config.retry.max_delay = "soon".to_string();
        config.resolver.max_concurrent = 0;
        config.extractor.temperature = 3.0;
        config.enrichment.whitelist = LabelSet::empty();

        assert_eq!(
            error_paths(&config),
            vec![
                "retry.max_delay",
                "resolver.max_concurrent",
                "extractor.temperature",
                "enrichment.whitelist",
            ]
        );
    }
}
