//! Error types for configuration loading and the PingOne API client.

use thiserror::Error;

/// Fatal configuration errors raised once at startup.
///
/// Any of these prevents the process from serving tools at all; there is no
/// partial-configuration mode.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required top-level variable is absent
    #[error("missing required environment variable {key}")]
    MissingVar { key: String },

    /// A numbered group is present but missing one of its required keys
    #[error("environment group {index} is incomplete: missing {key}")]
    MissingField { index: usize, key: String },

    /// Group indices must be contiguous starting at 1
    #[error(
        "environment group indices must be contiguous from 1: group {missing} is absent but group {found} is defined"
    )]
    IndexGap { missing: usize, found: usize },

    /// `PING_ENV_<n>_ALIAS` and `PING_ENV_<n>_ALIASES` are both set and disagree
    #[error("environment group {index}: PING_ENV_{index}_ALIAS and PING_ENV_{index}_ALIASES disagree")]
    AliasSpellingConflict { index: usize },

    /// A display name collides with an earlier name or alias (case-insensitive)
    #[error("environment group {index}: name '{name}' conflicts with an earlier name or alias")]
    DuplicateName { index: usize, name: String },

    /// An alias collides with an earlier name or alias (case-insensitive)
    #[error("environment group {index}: alias '{alias}' conflicts with an earlier name or alias")]
    DuplicateAlias { index: usize, alias: String },

    /// No `PING_ENV_1_*` group was found at all
    #[error(
        "no environments configured: set PING_ENV_1_NAME, PING_ENV_1_ID, PING_ENV_1_CLIENT_ID and PING_ENV_1_CLIENT_SECRET"
    )]
    NoEnvironments,

    /// `PING_DEFAULT_ENV` does not match any configured display name
    #[error(
        "default environment '{name}' does not match any configured environment name (configured: {})",
        .available.join(", ")
    )]
    UnknownDefault { name: String, available: Vec<String> },

    /// Unrecognized `PING_REGION` value
    #[error("invalid region '{value}': valid regions are north_america, europe, asia_pacific")]
    InvalidRegion { value: String },

    /// A numeric setting could not be parsed
    #[error("{key}: expected an integer, got '{value}'")]
    InvalidNumber { key: String, value: String },

    /// A numeric setting is outside its documented range
    #[error("{key} must be between {min} and {max}, got {value}")]
    OutOfRange {
        key: &'static str,
        min: u64,
        max: u64,
        value: u64,
    },

    /// `PING_DEFAULT_PAGE_SIZE` exceeds `PING_MAX_PAGE_SIZE`
    #[error("default page size ({default_size}) cannot exceed max page size ({max_size})")]
    PageSizeOrder { default_size: u32, max_size: u32 },
}

/// Per-call lookup failure for an environment name or alias.
///
/// Recoverable: the message lists every configured display name so a calling
/// AI agent can retry with a corrected value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "environment '{requested}' is not configured (configured environments: {})",
    .available.join(", ")
)]
pub struct EnvironmentNotFound {
    /// The name or alias the caller supplied, trimmed but otherwise verbatim
    pub requested: String,
    /// Display names of every configured environment, in configuration order
    pub available: Vec<String>,
}

/// Errors from the PingOne API passthrough layer.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The environment name/alias did not resolve
    #[error(transparent)]
    Environment(#[from] EnvironmentNotFound),

    /// Token endpoint rejected the client credentials
    #[error("token request for environment {env_id} failed: {message}")]
    Auth { env_id: String, message: String },

    /// Transport-level failure (connect, timeout, TLS, body decode)
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// PingOne returned an error body
    #[error("PingOne API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
        correlation_id: Option<String>,
    },
}
