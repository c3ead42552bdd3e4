use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - NZBHydra URL is an http(s) URL and an API key is set
/// - Size bounds are ordered
/// - Max age is at least one day
/// - Terms file and output directory are set
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let url = config.hydra.url.trim();
    if url.is_empty() {
        return Err(ConfigError::ValidationError(
            "hydra.url cannot be empty".to_string(),
        ));
    }
    match url::Url::parse(url) {
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
        Ok(parsed) => {
            return Err(ConfigError::ValidationError(format!(
                "hydra.url must use http or https, got {}",
                parsed.scheme()
            )))
        }
        Err(e) => {
            return Err(ConfigError::ValidationError(format!(
                "hydra.url is not a valid URL: {}",
                e
            )))
        }
    }

    if config.hydra.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "hydra.api_key cannot be empty".to_string(),
        ));
    }

    let search = &config.search;
    if search.min_size > search.max_size {
        return Err(ConfigError::ValidationError(format!(
            "search.min_size ({}) is larger than search.max_size ({})",
            search.min_size, search.max_size
        )));
    }

    if search.max_age_days == 0 {
        return Err(ConfigError::ValidationError(
            "search.max_age_days must be at least 1".to_string(),
        ));
    }

    if search.terms_file.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "search.terms_file cannot be empty".to_string(),
        ));
    }

    if search.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "search.output_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}
