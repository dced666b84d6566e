//! Configuration for the ping-mcp bridge.
//!
//! Everything is sourced from a flat key/value store (process environment
//! variables in production, plain maps in tests) in a single validation pass
//! at startup. There is no lazy key lookup at call time: configuration
//! errors surface before the server accepts its first request, and the
//! resulting values are immutable for the process lifetime.

pub mod registry;
pub mod settings;

pub use registry::{EnvironmentConfig, EnvironmentRegistry, EnvironmentSummary};
pub use settings::{Region, Settings};
