//! OAuth2 client-credentials token acquisition and per-environment caching.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::Mutex;

use crate::config::EnvironmentConfig;
use crate::error::ClientError;

/// Tokens are treated as expired this long before their nominal expiry, so a
/// token never goes stale mid-request.
const EXPIRY_BUFFER: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[allow(dead_code)]
    token_type: Option<String>,
    expires_in: u64,
    #[allow(dead_code)]
    scope: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + EXPIRY_BUFFER < self.expires_at
    }
}

/// Fetches and caches bearer tokens, one per environment id.
///
/// The cache lock is held only for map access, never across the token
/// request itself, so concurrent calls for different environments do not
/// serialize on the network.
pub struct TokenStore {
    auth_base: String,
    http: reqwest::Client,
    cache: Mutex<HashMap<String, CachedToken>>,
}

impl TokenStore {
    pub fn new(auth_base: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            auth_base: auth_base.into(),
            http,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Return a valid bearer token for the environment, fetching a new one
    /// when the cache is empty or the cached token is within the expiry
    /// buffer.
    ///
    /// # Errors
    ///
    /// [`ClientError::Auth`] when the token endpoint rejects the
    /// credentials, [`ClientError::Http`] on transport failure.
    pub async fn bearer(&self, env: &EnvironmentConfig) -> Result<String, ClientError> {
        {
            let cache = self.cache.lock().await;
            if let Some(cached) = cache.get(&env.id) {
                if cached.is_fresh() {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let token = self.fetch(env).await?;
        let access_token = token.access_token.clone();
        self.cache.lock().await.insert(env.id.clone(), token);
        Ok(access_token)
    }

    /// Drop any cached token for the environment. Called after a 401/403 so
    /// the next attempt authenticates from scratch.
    pub async fn invalidate(&self, env_id: &str) {
        if self.cache.lock().await.remove(env_id).is_some() {
            tracing::debug!(env_id, "invalidated cached token");
        }
    }

    async fn fetch(&self, env: &EnvironmentConfig) -> Result<CachedToken, ClientError> {
        let url = format!("{}/{}/as/token", self.auth_base, env.id);
        tracing::debug!(env = %env.name, "requesting access token");

        let response = self
            .http
            .post(&url)
            .basic_auth(&env.client_id, Some(&env.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Auth {
                env_id: env.id.clone(),
                message: format!("token request failed with status {status}: {body}"),
            });
        }

        let token: TokenResponse = response.json().await?;
        Ok(CachedToken {
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
            access_token: token.access_token,
        })
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("auth_base", &self.auth_base)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> EnvironmentConfig {
        EnvironmentConfig {
            name: "Production".into(),
            id: "env-1".into(),
            client_id: "client".into(),
            client_secret: "secret".into(),
            aliases: vec![],
        }
    }

    #[tokio::test]
    async fn test_fresh_cached_token_is_reused() {
        let store = TokenStore::new("https://auth.example", reqwest::Client::new());
        store.cache.lock().await.insert(
            "env-1".into(),
            CachedToken {
                access_token: "tok-1".into(),
                expires_at: Instant::now() + Duration::from_secs(3600),
            },
        );
        assert_eq!(store.bearer(&env()).await.unwrap(), "tok-1");
    }

    #[tokio::test]
    async fn test_token_inside_buffer_counts_as_expired() {
        let cached = CachedToken {
            access_token: "tok".into(),
            expires_at: Instant::now() + Duration::from_secs(30),
        };
        assert!(!cached.is_fresh());

        let fresh = CachedToken {
            access_token: "tok".into(),
            expires_at: Instant::now() + Duration::from_secs(120),
        };
        assert!(fresh.is_fresh());
    }

    #[tokio::test]
    async fn test_invalidate_removes_entry() {
        let store = TokenStore::new("https://auth.example", reqwest::Client::new());
        store.cache.lock().await.insert(
            "env-1".into(),
            CachedToken {
                access_token: "tok".into(),
                expires_at: Instant::now() + Duration::from_secs(3600),
            },
        );
        store.invalidate("env-1").await;
        assert!(store.cache.lock().await.is_empty());
    }
}
