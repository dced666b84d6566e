//! High-level PingOne management API client. One instance serves every
//! configured environment; each call resolves its target by name or alias.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde_json::{Value, json};

use crate::auth::TokenStore;
use crate::config::{EnvironmentConfig, EnvironmentRegistry, Settings};
use crate::error::ClientError;
use crate::request::{Dispatcher, RequestSpec};
use crate::response::{self, error_info};

#[derive(Debug)]
pub struct PingClient {
    settings: Settings,
    registry: Arc<EnvironmentRegistry>,
    tokens: TokenStore,
    dispatcher: Dispatcher,
}

impl PingClient {
    /// Build the shared client from validated settings and registry.
    ///
    /// # Errors
    ///
    /// [`ClientError::Http`] when the underlying HTTP client cannot be
    /// constructed.
    pub fn new(settings: Settings, registry: Arc<EnvironmentRegistry>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .user_agent(concat!("ping-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let tokens = TokenStore::new(settings.region.auth_base(), http.clone());
        let dispatcher = Dispatcher::new(
            http,
            settings.max_requests_per_second,
            settings.max_retries,
        );

        Ok(Self {
            settings,
            registry,
            tokens,
            dispatcher,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &EnvironmentRegistry {
        &self.registry
    }

    /// GET a list endpoint within an environment and flatten the HAL body.
    ///
    /// `environment` is a display name or alias; `None` targets the default.
    pub async fn get_list(
        &self,
        environment: Option<&str>,
        endpoint: &str,
        query: Vec<(String, String)>,
        fields: Option<&[String]>,
    ) -> Result<Value, ClientError> {
        let env = self.registry.resolve(environment)?.clone();
        let spec = RequestSpec {
            method: Method::GET,
            url: self.environment_url(&env, endpoint),
            query,
            body: None,
        };
        let body = self.send(&env, &spec).await?;
        Ok(with_environment(response::normalize_list(&body, fields), &env))
    }

    /// GET a single resource within an environment.
    pub async fn get_single(
        &self,
        environment: Option<&str>,
        endpoint: &str,
        query: Vec<(String, String)>,
        fields: Option<&[String]>,
    ) -> Result<Value, ClientError> {
        let env = self.registry.resolve(environment)?.clone();
        let spec = RequestSpec {
            method: Method::GET,
            url: self.environment_url(&env, endpoint),
            query,
            body: None,
        };
        let body = self.send(&env, &spec).await?;
        Ok(with_environment(
            response::normalize_single(&body, fields),
            &env,
        ))
    }

    /// POST to an environment endpoint.
    pub async fn post(
        &self,
        environment: Option<&str>,
        endpoint: &str,
        body: Value,
    ) -> Result<Value, ClientError> {
        self.write(Method::POST, environment, endpoint, body).await
    }

    /// PUT to an environment endpoint.
    pub async fn put(
        &self,
        environment: Option<&str>,
        endpoint: &str,
        body: Value,
    ) -> Result<Value, ClientError> {
        self.write(Method::PUT, environment, endpoint, body).await
    }

    /// DELETE an environment resource. Returns `{"success": true}` since
    /// deletes carry no body.
    pub async fn delete(
        &self,
        environment: Option<&str>,
        endpoint: &str,
    ) -> Result<Value, ClientError> {
        let env = self.registry.resolve(environment)?.clone();
        let spec = RequestSpec::new(Method::DELETE, self.environment_url(&env, endpoint));
        self.send_no_body(&env, &spec).await?;
        Ok(with_environment(json!({"success": true}), &env))
    }

    /// GET an organization-level list endpoint (`/v1/{endpoint}`), using the
    /// default environment's credentials.
    pub async fn get_organization_list(
        &self,
        endpoint: &str,
        query: Vec<(String, String)>,
        fields: Option<&[String]>,
    ) -> Result<Value, ClientError> {
        let env = self.registry.default_environment().clone();
        let spec = RequestSpec {
            method: Method::GET,
            url: format!("{}/v1/{endpoint}", self.settings.region.api_base()),
            query,
            body: None,
        };
        let body = self.send(&env, &spec).await?;
        Ok(response::normalize_list(&body, fields))
    }

    /// Clamp a requested page limit against the configured sizes.
    pub fn effective_page_size(&self, requested: Option<u32>) -> u32 {
        response::clamp_page_size(
            requested,
            self.settings.default_page_size,
            self.settings.max_page_size,
        )
    }

    async fn write(
        &self,
        method: Method,
        environment: Option<&str>,
        endpoint: &str,
        body: Value,
    ) -> Result<Value, ClientError> {
        let env = self.registry.resolve(environment)?.clone();
        let spec = RequestSpec {
            method,
            url: self.environment_url(&env, endpoint),
            query: Vec::new(),
            body: Some(body),
        };
        let response = self.send(&env, &spec).await?;
        Ok(with_environment(
            response::normalize_single(&response, None),
            &env,
        ))
    }

    fn environment_url(&self, env: &EnvironmentConfig, endpoint: &str) -> String {
        format!(
            "{}/v1/environments/{}/{endpoint}",
            self.settings.region.api_base(),
            env.id
        )
    }

    /// Execute and parse, mapping non-success statuses to [`ClientError::Api`].
    async fn send(&self, env: &EnvironmentConfig, spec: &RequestSpec) -> Result<Value, ClientError> {
        let response = self.dispatcher.execute(&self.tokens, env, spec).await?;
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }
        Ok(body)
    }

    async fn send_no_body(
        &self,
        env: &EnvironmentConfig,
        spec: &RequestSpec,
    ) -> Result<(), ClientError> {
        let response = self.dispatcher.execute(&self.tokens, env, spec).await?;
        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            return Err(api_error(status.as_u16(), &body));
        }
        Ok(())
    }
}

fn api_error(status: u16, body: &Value) -> ClientError {
    let info = error_info(status, body);
    ClientError::Api {
        status,
        code: info.code,
        message: info.message,
        correlation_id: info.correlation_id,
    }
}

/// Attach the resolved environment context so callers always see which
/// environment actually served the request.
fn with_environment(mut value: Value, env: &EnvironmentConfig) -> Value {
    if let Some(map) = value.as_object_mut() {
        map.insert(
            "environment".to_string(),
            json!({"name": env.name, "id": env.id}),
        );
    }
    value
}
