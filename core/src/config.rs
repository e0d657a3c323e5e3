//! Backend configuration loaded from the platform environment

use std::time::Duration;

use crate::error::{ApiError, Result};
use crate::platform::Environment;
use crate::token::PolicyLimits;

const NOT_CONFIGURED: &str = "GitLab backend configuration has not been set up";

/// Backend configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// GitLab instance root (e.g., "https://gitlab.example.com")
    pub base_url: String,
    /// API token used to mint project access tokens
    pub token: String,
    /// Maximum token lifetime; zero disables the ceiling
    pub max_ttl: Duration,
    /// Whether the owner tier (access level 50) may be requested
    pub allow_owner_level: bool,
}

impl Config {
    /// Load configuration from platform environment
    pub fn from_env(env: &dyn Environment) -> Result<Self> {
        let base_url = env
            .get_var("GITLAB_BASE_URL")
            .map_err(|_| ApiError::config_missing(NOT_CONFIGURED))?;
        let token = env
            .get_secret("GITLAB_TOKEN")
            .map_err(|_| ApiError::config_missing(NOT_CONFIGURED))?;

        let max_ttl = match env.get_var("GITLAB_MAX_TTL") {
            Ok(raw) => parse_duration(&raw)?,
            Err(_) => Duration::ZERO,
        };

        let allow_owner_level = match env.get_var("GITLAB_ALLOW_OWNER_LEVEL") {
            Ok(raw) => parse_bool(&raw)?,
            Err(_) => false,
        };

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            max_ttl,
            allow_owner_level,
        })
    }

    /// Policy limits enforced on every token request
    pub fn policy_limits(&self) -> PolicyLimits {
        PolicyLimits {
            max_ttl: self.max_ttl,
            allow_owner_level: self.allow_owner_level,
        }
    }
}

/// Parse a duration given as plain seconds or with an `s`/`m`/`h`/`d` suffix
pub fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    let invalid = || ApiError::internal(format!("invalid duration '{}'", raw));

    let (digits, multiplier) = match raw.char_indices().last() {
        Some((idx, 's')) => (&raw[..idx], 1),
        Some((idx, 'm')) => (&raw[..idx], 60),
        Some((idx, 'h')) => (&raw[..idx], 60 * 60),
        Some((idx, 'd')) => (&raw[..idx], 24 * 60 * 60),
        Some(_) => (raw, 1),
        None => return Err(invalid()),
    };

    let value: u64 = digits.parse().map_err(|_| invalid())?;
    value
        .checked_mul(multiplier)
        .map(Duration::from_secs)
        .ok_or_else(invalid)
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(ApiError::internal(format!("invalid boolean '{}'", other))),
    }
}
