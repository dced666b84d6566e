//! Core library for the ping-mcp bridge.
//!
//! Provides multi-environment PingOne configuration (the environment
//! registry with name/alias resolution), OAuth2 client-credentials token
//! management, rate-limited retrying request dispatch, HAL response
//! normalization, and the [`PingClient`] REST passthrough client used by the
//! MCP tool layer.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod limit;
pub mod logging;
pub mod request;
pub mod response;

#[doc(inline)]
pub use client::PingClient;
#[doc(inline)]
pub use config::{EnvironmentConfig, EnvironmentRegistry, EnvironmentSummary, Region, Settings};
#[doc(inline)]
pub use error::{ClientError, ConfigError, EnvironmentNotFound};
