use super::{types::Config, ConfigError};
use crate::scheduler::RunMode;

/// Floor for the continuous poll interval, protecting the calendar API
/// from overly aggressive sweeps.
pub const MIN_POLL_INTERVAL_MINUTES: u64 = 5;

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.summarizer.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "summarizer.api_key must not be empty".to_string(),
        ));
    }
    if config.summarizer.segment_count == 0 {
        return Err(ConfigError::ValidationError(
            "summarizer.segment_count must be at least 1".to_string(),
        ));
    }
    if config.publisher.bearer_token.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "publisher.bearer_token must not be empty".to_string(),
        ));
    }
    if config.publisher.max_post_chars == 0 {
        return Err(ConfigError::ValidationError(
            "publisher.max_post_chars must be at least 1".to_string(),
        ));
    }
    if matches!(config.scheduler.mode, RunMode::Continuous)
        && config.scheduler.poll_interval_minutes < MIN_POLL_INTERVAL_MINUTES
    {
        return Err(ConfigError::ValidationError(format!(
            "scheduler.poll_interval_minutes must be at least {MIN_POLL_INTERVAL_MINUTES}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        toml::from_str(
            r#"
[summarizer]
api_key = "sk-test"

[publisher]
bearer_token = "token"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let mut config = valid_config();
        config.summarizer.api_key = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_empty_bearer_token_rejected() {
        let mut config = valid_config();
        config.publisher.bearer_token = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_segment_count_rejected() {
        let mut config = valid_config();
        config.summarizer.segment_count = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_max_post_chars_rejected() {
        let mut config = valid_config();
        config.publisher.max_post_chars = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_short_poll_interval_rejected_in_continuous_mode() {
        let mut config = valid_config();
        config.scheduler.poll_interval_minutes = 2;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_short_poll_interval_allowed_in_once_mode() {
        let mut config = valid_config();
        config.scheduler.mode = RunMode::Once;
        config.scheduler.poll_interval_minutes = 2;
        assert!(validate_config(&config).is_ok());
    }
}
