//! Global (non-per-environment) settings: region endpoints, org id, and
//! tunable limits with validated ranges.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// PingOne hosting region, selecting the API and auth hostnames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    NorthAmerica,
    Europe,
    AsiaPacific,
}

impl Region {
    /// Base URL for the management API in this region.
    pub fn api_base(self) -> &'static str {
        match self {
            Region::NorthAmerica => "https://api.pingone.com",
            Region::Europe => "https://api.pingone.eu",
            Region::AsiaPacific => "https://api.pingone.asia",
        }
    }

    /// Base URL for the auth service in this region.
    pub fn auth_base(self) -> &'static str {
        match self {
            Region::NorthAmerica => "https://auth.pingone.com",
            Region::Europe => "https://auth.pingone.eu",
            Region::AsiaPacific => "https://auth.pingone.asia",
        }
    }
}

impl FromStr for Region {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "north_america" => Ok(Region::NorthAmerica),
            "europe" => Ok(Region::Europe),
            "asia_pacific" => Ok(Region::AsiaPacific),
            _ => Err(ConfigError::InvalidRegion {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Region::NorthAmerica => "north_america",
            Region::Europe => "europe",
            Region::AsiaPacific => "asia_pacific",
        };
        f.write_str(s)
    }
}

/// Validated process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub region: Region,
    pub org_id: String,
    pub max_requests_per_second: u32,
    pub max_retries: u32,
    pub request_timeout_secs: u64,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a missing required variable, an
    /// unparseable number, or a value outside its allowed range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&std::env::vars().collect())
    }

    /// Read settings from a flat key/value map.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let region: Region = required(vars, "PING_REGION")?.parse()?;
        let org_id = required(vars, "PING_ORG_ID")?;

        let max_requests_per_second =
            ranged(vars, "PING_MAX_REQUESTS_PER_SECOND", 50, 1, 100)? as u32;
        let max_retries = ranged(vars, "PING_MAX_RETRIES", 3, 0, 10)? as u32;
        let request_timeout_secs = ranged(vars, "PING_REQUEST_TIMEOUT", 30, 1, 300)?;
        let default_page_size = ranged(vars, "PING_DEFAULT_PAGE_SIZE", 100, 1, 1000)? as u32;
        let max_page_size = ranged(vars, "PING_MAX_PAGE_SIZE", 1000, 1, 1000)? as u32;

        if max_page_size < default_page_size {
            return Err(ConfigError::PageSizeOrder {
                default_size: default_page_size,
                max_size: max_page_size,
            });
        }

        Ok(Self {
            region,
            org_id,
            max_requests_per_second,
            max_retries,
            request_timeout_secs,
            default_page_size,
            max_page_size,
        })
    }
}

fn required(vars: &HashMap<String, String>, key: &str) -> Result<String, ConfigError> {
    vars.get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingVar {
            key: key.to_string(),
        })
}

/// Parse an optional numeric variable, defaulting when absent and enforcing
/// an inclusive range.
fn ranged(
    vars: &HashMap<String, String>,
    key: &'static str,
    default: u64,
    min: u64,
    max: u64,
) -> Result<u64, ConfigError> {
    let Some(raw) = vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) else {
        return Ok(default);
    };
    let value = raw.parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
        key: key.to_string(),
        value: raw.to_string(),
    })?;
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            key,
            min,
            max,
            value,
        });
    }
    Ok(value)
}
