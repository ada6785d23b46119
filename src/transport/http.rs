//! HTTP transport backed by reqwest

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use super::{EngineRequest, EngineResponse, EngineTransport, Method, ResponseBody, TransportError};
use crate::config::GatewayConfig;
use crate::error::ConfigError;

/// Engine transport over HTTP
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    credentials: Option<(String, String)>,
}

impl HttpTransport {
    pub fn new(config: &GatewayConfig) -> Result<Self, ConfigError> {
        let base_url = config.engine_url()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let transport = Self::with_client(base_url, client);
        Ok(match &config.username {
            Some(username) => transport.with_credentials(
                username.clone(),
                config.password.clone().unwrap_or_default(),
            ),
            None => transport,
        })
    }

    /// Use an existing client (shared pools, custom TLS, proxies)
    pub fn with_client(base_url: Url, client: Client) -> Self {
        Self {
            client,
            base_url,
            credentials: None,
        }
    }

    /// Send HTTP basic auth on every request
    pub fn with_credentials(mut self, username: String, password: String) -> Self {
        self.credentials = Some((username, password));
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url_for(&self, request: &EngineRequest) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                TransportError(format!("engine url cannot be a base: {}", self.base_url))
            })?;
            segments.pop_if_empty();
            segments.extend(request.path.iter());
        }
        if !request.params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(request.params.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.credentials.is_some())
            .finish()
    }
}

#[async_trait]
impl EngineTransport for HttpTransport {
    async fn send(&self, request: EngineRequest) -> Result<EngineResponse, TransportError> {
        let url = self.url_for(&request)?;

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Put => self.client.put(url),
            Method::Post => self.client.post(url),
        };
        if let Some((username, password)) = &self.credentials {
            builder = builder.basic_auth(username, Some(password));
        }
        if let Some(body) = request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(EngineResponse::new(
            response.status().as_u16(),
            Box::new(HttpBody(response)),
        ))
    }
}

struct HttpBody(reqwest::Response);

#[async_trait]
impl ResponseBody for HttpBody {
    async fn read_all(self: Box<Self>) -> Result<Vec<u8>, TransportError> {
        self.0
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| TransportError(format!("failed to read response body: {}", e)))
    }
}
