use crate::config::types::{
    ApiConfig, CandidateEntry, CheckpointConfig, Config, OutputConfig, PacingConfig, SearchConfig,
    UserAgentConfig,
};
use crate::ConfigError;
use chrono::{Datelike, NaiveDate};
use url::Url;

/// Largest page size the listing endpoint accepts
const MAX_PAGE_SIZE: u32 = 1000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_user_agent_config(&config.user_agent)?;
    validate_api_config(&config.api)?;
    validate_pacing_config(&config.pacing)?;
    validate_checkpoint_config(&config.checkpoint)?;
    validate_search_config(&config.search)?;
    validate_output_config(&config.output)?;
    validate_candidates(&config.candidates)?;
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates API request settings
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    if config.page_size < 1 || config.page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::Validation(format!(
            "page_size must be between 1 and {}, got {}",
            MAX_PAGE_SIZE, config.page_size
        )));
    }

    if config.request_timeout < 1 {
        return Err(ConfigError::Validation(
            "request_timeout must be >= 1 second".to_string(),
        ));
    }

    if config.connect_timeout < 1 {
        return Err(ConfigError::Validation(
            "connect_timeout must be >= 1 second".to_string(),
        ));
    }

    Ok(())
}

/// Validates pacing settings
fn validate_pacing_config(config: &PacingConfig) -> Result<(), ConfigError> {
    if config.page_throttle_every < 1 {
        return Err(ConfigError::Validation(format!(
            "page_throttle_every must be >= 1, got {}",
            config.page_throttle_every
        )));
    }

    Ok(())
}

/// Validates checkpoint settings
fn validate_checkpoint_config(config: &CheckpointConfig) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation(
            "checkpoint path cannot be empty".to_string(),
        ));
    }

    if config.save_every_records < 1 {
        return Err(ConfigError::Validation(format!(
            "save_every_records must be >= 1, got {}",
            config.save_every_records
        )));
    }

    if config.save_every_seconds < 1 {
        return Err(ConfigError::Validation(format!(
            "save_every_seconds must be >= 1, got {}",
            config.save_every_seconds
        )));
    }

    Ok(())
}

/// Validates search query settings
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    let start = parse_month_day(&config.window_start)?;
    let end = parse_month_day(&config.window_end)?;

    if start > end {
        return Err(ConfigError::Validation(format!(
            "window_start {} is after window_end {}",
            config.window_start, config.window_end
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.table_path.is_empty() {
        return Err(ConfigError::Validation(
            "table_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates candidate rows
fn validate_candidates(candidates: &[CandidateEntry]) -> Result<(), ConfigError> {
    for entry in candidates {
        if !(1..=9999).contains(&entry.year) {
            return Err(ConfigError::Validation(format!(
                "candidate year must be a four-digit year, got {}",
                entry.year
            )));
        }

        if entry.names.is_empty() {
            return Err(ConfigError::Validation(format!(
                "candidate for {} must have at least one name",
                entry.year
            )));
        }

        for name in &entry.names {
            if name.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "candidate for {} has a blank name",
                    entry.year
                )));
            }

            if name.contains('"') {
                return Err(ConfigError::Validation(format!(
                    "candidate name '{}' cannot contain quotes",
                    name
                )));
            }

            // The name becomes part of a checkpoint file stem
            if name.contains(['/', '\\', '\0']) || name.contains("..") {
                return Err(ConfigError::Validation(format!(
                    "candidate name '{}' cannot contain path separators, '..' or NUL",
                    name.escape_default()
                )));
            }
        }
    }

    Ok(())
}

/// Parses a `MM-DD` string into `(month, day)`
///
/// Checked against a leap year so `02-29` is accepted here; whether it
/// exists in a particular year is decided when the query is built.
pub(crate) fn parse_month_day(value: &str) -> Result<(u32, u32), ConfigError> {
    let date = NaiveDate::parse_from_str(&format!("2000-{}", value), "%Y-%m-%d")
        .map_err(|e| ConfigError::InvalidDate(format!("'{}' is not MM-DD: {}", value, e)))?;
    Ok((date.month(), date.day()))
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
