//! EngineTransport trait: the only boundary between the gateway and the
//! search engine.
//!
//! - [`HttpTransport`] talks to a real engine over HTTP (reqwest).
//! - [`InMemoryEngine`] answers the same requests in-process, for tests and
//!   local development.

pub mod http;
pub mod memory;

use async_trait::async_trait;

pub use http::HttpTransport;
pub use memory::InMemoryEngine;

/// Failure to reach the engine or to read its response
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<TransportError> for crate::error::GatewayError {
    fn from(err: TransportError) -> Self {
        Self::Transport(err.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Post,
}

/// An outbound request, relative to the engine base url
#[derive(Debug, Clone, PartialEq)]
pub struct EngineRequest {
    pub method: Method,
    /// Path segments, joined with `/` and percent-encoded by the transport
    pub path: Vec<String>,
    pub params: Vec<(&'static str, String)>,
    pub body: Option<Vec<u8>>,
}

impl EngineRequest {
    /// `PUT /<collection>/_doc/<id>?refresh=true`
    pub fn index_document(collection: &str, doc_id: &str, body: Vec<u8>) -> Self {
        Self {
            method: Method::Put,
            path: vec![collection.to_string(), "_doc".to_string(), doc_id.to_string()],
            params: vec![("refresh", "true".to_string())],
            body: Some(body),
        }
    }

    /// `POST /<collection>/_search?track_total_hits=true&pretty=true`
    pub fn search(collection: &str, body: Vec<u8>) -> Self {
        Self {
            method: Method::Post,
            path: vec![collection.to_string(), "_search".to_string()],
            params: vec![
                ("track_total_hits", "true".to_string()),
                ("pretty", "true".to_string()),
            ],
            body: Some(body),
        }
    }

    /// `GET /`
    pub fn root() -> Self {
        Self {
            method: Method::Get,
            path: Vec::new(),
            params: Vec::new(),
            body: None,
        }
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A response whose body has not been read yet
///
/// The body is owned by the response; dropping the response releases it.
pub struct EngineResponse {
    pub status: u16,
    body: Box<dyn ResponseBody>,
}

impl EngineResponse {
    pub fn new(status: u16, body: Box<dyn ResponseBody>) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Consume the response, reading the whole body
    pub async fn bytes(self) -> Result<Vec<u8>, TransportError> {
        self.body.read_all().await
    }
}

impl std::fmt::Debug for EngineResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait ResponseBody: Send {
    async fn read_all(self: Box<Self>) -> Result<Vec<u8>, TransportError>;
}

#[async_trait]
impl ResponseBody for Vec<u8> {
    async fn read_all(self: Box<Self>) -> Result<Vec<u8>, TransportError> {
        Ok(*self)
    }
}

/// Sends one request and returns the engine's response
///
/// Implementations must be safe to share across concurrent calls.
#[async_trait]
pub trait EngineTransport: Send + Sync {
    async fn send(&self, request: EngineRequest) -> Result<EngineResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_request_addresses_document() {
        let req = EngineRequest::index_document("cafe", "42", b"{}".to_vec());
        assert_eq!(req.method, Method::Put);
        assert_eq!(req.path, vec!["cafe", "_doc", "42"]);
        assert_eq!(req.param("refresh"), Some("true"));
    }

    #[test]
    fn search_request_asks_for_total_and_pretty() {
        let req = EngineRequest::search("cafe", b"{}".to_vec());
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.path, vec!["cafe", "_search"]);
        assert_eq!(req.param("track_total_hits"), Some("true"));
        assert_eq!(req.param("pretty"), Some("true"));
        assert_eq!(req.param("refresh"), None);
    }

    #[tokio::test]
    async fn buffered_body_reads_back() {
        let response = EngineResponse::new(201, Box::new(b"ok".to_vec()));
        assert!(response.is_success());
        assert_eq!(response.bytes().await.unwrap(), b"ok");
    }
}
