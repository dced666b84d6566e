//! Multi-environment credential registry with name/alias resolution.
//!
//! Environments are declared through numbered variable groups:
//!
//! ```text
//! PING_DEFAULT_ENV=Production
//! PING_ENV_1_NAME=Production
//! PING_ENV_1_ID=3fa85f64-...
//! PING_ENV_1_CLIENT_ID=...
//! PING_ENV_1_CLIENT_SECRET=...
//! PING_ENV_1_ALIASES=prod,live
//! PING_ENV_2_NAME=Staging
//! ...
//! ```
//!
//! Indices must be contiguous starting at 1. Both the `ALIAS` and `ALIASES`
//! spellings are accepted. The registry is built once at startup and never
//! mutated afterwards, so concurrent lookups need no synchronization.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::error::{ConfigError, EnvironmentNotFound};

/// Prefix shared by every numbered environment-group variable.
const GROUP_PREFIX: &str = "PING_ENV_";

/// Key naming the default environment.
const DEFAULT_ENV_KEY: &str = "PING_DEFAULT_ENV";

/// Credentials and naming for a single PingOne environment.
///
/// `aliases` are lower-cased at load time; `name` keeps its display casing.
#[derive(Clone)]
pub struct EnvironmentConfig {
    /// Display name (unique case-insensitively across the registry)
    pub name: String,
    /// Opaque PingOne environment identifier
    pub id: String,
    /// OAuth2 client id for this environment's worker application
    pub client_id: String,
    /// OAuth2 client secret; held in memory only, never logged or serialized
    pub client_secret: String,
    /// Lower-cased alternate names
    pub aliases: Vec<String>,
}

impl fmt::Debug for EnvironmentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentConfig")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("aliases", &self.aliases)
            .finish()
    }
}

/// Secret-free projection of one registry entry, exposed by discovery tools.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EnvironmentSummary {
    pub name: String,
    pub id: String,
    pub aliases: Vec<String>,
    pub is_default: bool,
}

/// Immutable, ordered set of configured environments plus the default.
///
/// Constructed once during startup via [`EnvironmentRegistry::from_vars`] (or
/// [`from_env`](EnvironmentRegistry::from_env)) and shared by reference with
/// the tool layer for the rest of the process lifetime.
#[derive(Debug, Clone)]
pub struct EnvironmentRegistry {
    environments: Vec<EnvironmentConfig>,
    default_index: usize,
}

impl EnvironmentRegistry {
    /// Build the registry from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] on any invariant violation; see
    /// [`from_vars`](Self::from_vars).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&std::env::vars().collect())
    }

    /// Build the registry from a flat key/value map in a single validation
    /// pass.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::IndexGap`] when group indices skip a number
    /// - [`ConfigError::MissingField`] when a group lacks a required key
    /// - [`ConfigError::DuplicateName`] / [`ConfigError::DuplicateAlias`]
    ///   when a name or alias collides (case-insensitive) with any earlier
    ///   name or alias
    /// - [`ConfigError::AliasSpellingConflict`] when both alias spellings are
    ///   set for one group and disagree
    /// - [`ConfigError::UnknownDefault`] when `PING_DEFAULT_ENV` matches no
    ///   entry's name
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let default_name = non_empty(vars, DEFAULT_ENV_KEY).ok_or(ConfigError::MissingVar {
            key: DEFAULT_ENV_KEY.to_string(),
        })?;

        let mut environments = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        let mut index = 1;
        while vars.contains_key(&group_key(index, "NAME")) {
            let env = build_group(vars, index)?;

            let name_lower = env.name.to_lowercase();
            if !seen.insert(name_lower) {
                return Err(ConfigError::DuplicateName {
                    index,
                    name: env.name,
                });
            }
            for alias in &env.aliases {
                if !seen.insert(alias.clone()) {
                    return Err(ConfigError::DuplicateAlias {
                        index,
                        alias: alias.clone(),
                    });
                }
            }

            tracing::info!(
                name = %env.name,
                aliases = ?env.aliases,
                "loaded environment group {index}"
            );
            environments.push(env);
            index += 1;
        }

        // Keys at the index the scan stopped on mean an unnamed group, not a
        // hole in the numbering.
        if group_declared(vars, index) {
            return Err(ConfigError::MissingField {
                index,
                key: group_key(index, "NAME"),
            });
        }

        // No gap-filling: a group declared past the first missing index is a
        // configuration error, not a group to skip.
        match highest_declared_index(vars) {
            Some(found) if found > index => {
                return Err(ConfigError::IndexGap {
                    missing: index,
                    found,
                });
            }
            _ => {}
        }

        if environments.is_empty() {
            return Err(ConfigError::NoEnvironments);
        }

        let default_lower = default_name.to_lowercase();
        let default_index = environments
            .iter()
            .position(|e| e.name.to_lowercase() == default_lower)
            .ok_or_else(|| ConfigError::UnknownDefault {
                name: default_name.clone(),
                available: environments.iter().map(|e| e.name.clone()).collect(),
            })?;

        Ok(Self {
            environments,
            default_index,
        })
    }

    /// Resolve a free-text name or alias to its environment record.
    ///
    /// Empty or absent input resolves to the configured default. Matching is
    /// case-insensitive against every name and alias; since uniqueness is
    /// enforced at construction, at most one entry can match.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentNotFound`] listing every configured display name
    /// when nothing matches.
    pub fn resolve(&self, name_or_alias: Option<&str>) -> Result<&EnvironmentConfig, EnvironmentNotFound> {
        let Some(needle) = name_or_alias.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(self.default_environment());
        };

        let lowered = needle.to_lowercase();
        self.environments
            .iter()
            .find(|e| e.name.to_lowercase() == lowered || e.aliases.iter().any(|a| *a == lowered))
            .ok_or_else(|| EnvironmentNotFound {
                requested: needle.to_string(),
                available: self.names(),
            })
    }

    /// The entry `PING_DEFAULT_ENV` designated.
    pub fn default_environment(&self) -> &EnvironmentConfig {
        &self.environments[self.default_index]
    }

    /// Secret-free projection of every entry, in configuration order.
    pub fn list_configured(&self) -> Vec<EnvironmentSummary> {
        self.environments
            .iter()
            .enumerate()
            .map(|(i, e)| EnvironmentSummary {
                name: e.name.clone(),
                id: e.id.clone(),
                aliases: e.aliases.clone(),
                is_default: i == self.default_index,
            })
            .collect()
    }

    /// Display names in configuration order.
    pub fn names(&self) -> Vec<String> {
        self.environments.iter().map(|e| e.name.clone()).collect()
    }

    /// Number of configured environments.
    pub fn len(&self) -> usize {
        self.environments.len()
    }

    /// True when no environments are configured (unreachable after a
    /// successful construction, present for completeness).
    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }
}

fn group_key(index: usize, field: &str) -> String {
    format!("{GROUP_PREFIX}{index}_{field}")
}

fn non_empty(vars: &HashMap<String, String>, key: &str) -> Option<String> {
    vars.get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(vars: &HashMap<String, String>, index: usize, field: &str) -> Result<String, ConfigError> {
    non_empty(vars, &group_key(index, field)).ok_or(ConfigError::MissingField {
        index,
        key: group_key(index, field),
    })
}

fn build_group(vars: &HashMap<String, String>, index: usize) -> Result<EnvironmentConfig, ConfigError> {
    let name = required(vars, index, "NAME")?;
    let id = required(vars, index, "ID")?;
    let client_id = required(vars, index, "CLIENT_ID")?;
    let client_secret = required(vars, index, "CLIENT_SECRET")?;

    // Both spellings are accepted; if both are present they must agree.
    let alias = non_empty(vars, &group_key(index, "ALIAS")).map(|v| split_aliases(&v));
    let aliases_field = non_empty(vars, &group_key(index, "ALIASES")).map(|v| split_aliases(&v));
    let aliases = match (alias, aliases_field) {
        (Some(a), Some(b)) if a != b => {
            return Err(ConfigError::AliasSpellingConflict { index });
        }
        (Some(a), _) => a,
        (None, Some(b)) => b,
        (None, None) => Vec::new(),
    };

    Ok(EnvironmentConfig {
        name,
        id,
        client_id,
        client_secret,
        aliases,
    })
}

/// Split a comma-separated alias list: trim, drop empties, lower-case.
fn split_aliases(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|a| a.trim().to_lowercase())
        .filter(|a| !a.is_empty())
        .collect()
}

/// Highest group index for which any `PING_ENV_<n>_*` key is set.
fn group_declared(vars: &HashMap<String, String>, index: usize) -> bool {
    let prefix = format!("{GROUP_PREFIX}{index}_");
    vars.keys().any(|k| k.starts_with(&prefix))
}

fn highest_declared_index(vars: &HashMap<String, String>) -> Option<usize> {
    vars.keys()
        .filter_map(|k| {
            let rest = k.strip_prefix(GROUP_PREFIX)?;
            let digits = rest.split('_').next()?;
            digits.parse::<usize>().ok()
        })
        .max()
}
