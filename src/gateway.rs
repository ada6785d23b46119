//! Gateway client
//!
//! Executes built requests through an [`EngineTransport`] and classifies each
//! outcome as transport failure, engine rejection, or decoded result. A call
//! sends exactly one request and never retries.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::GatewayConfig;
use crate::error::{ConfigError, GatewayError, Result};
use crate::model::{BoundingBoxQuery, Candidate, IndexableLocation};
use crate::request;
use crate::response::{self, EngineHealth, SearchResponse};
use crate::transport::{EngineRequest, EngineResponse, EngineTransport, HttpTransport};

/// Indexes locations into, and queries bounding boxes from, one collection
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct SearchGateway {
    transport: Arc<dyn EngineTransport>,
    collection: String,
}

impl std::fmt::Debug for SearchGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchGateway")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

impl SearchGateway {
    pub fn new(transport: Arc<dyn EngineTransport>, collection: impl Into<String>) -> Self {
        Self {
            transport,
            collection: collection.into(),
        }
    }

    /// Build a gateway with an HTTP transport from configuration
    pub fn from_config(config: &GatewayConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(Arc::new(transport), config.collection.clone()))
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Write one location, replacing any document with the same id
    ///
    /// The write is refreshed synchronously, so it is visible to the next query.
    pub async fn index(&self, loc: &IndexableLocation) -> Result<()> {
        self.index_with_cancel(loc, &CancellationToken::new()).await
    }

    #[tracing::instrument(
        name = "gateway.index",
        skip_all,
        fields(collection = %self.collection, doc_id = loc.id)
    )]
    pub async fn index_with_cancel(
        &self,
        loc: &IndexableLocation,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let body = request::build_index_body(loc)
            .to_json()
            .map_err(|e| GatewayError::DecodeFailure(format!("encode index body: {}", e)))?;
        let request =
            EngineRequest::index_document(&self.collection, &request::document_id(loc), body);

        let response = self.send(request, cancel).await?;
        let status = response.status;
        if response.is_success() {
            debug!(status, "document indexed");
            return Ok(());
        }

        let err = match self.read_body(response, cancel).await {
            Ok(body) => response::engine_error_or_raw(status, &body),
            Err(read_err) if cancel.is_cancelled() => return Err(read_err),
            Err(read_err) => GatewayError::EngineRejected {
                status,
                reason: format!("<unreadable body: {}>", read_err.cause()),
            },
        };
        warn!(status, error = %err, "index rejected by engine");
        Err(err)
    }

    /// Ids of every document inside the box, in engine order
    pub async fn query(&self, q: &BoundingBoxQuery) -> Result<Vec<Candidate>> {
        self.query_with_cancel(q, &CancellationToken::new()).await
    }

    #[tracing::instrument(name = "gateway.query", skip_all, fields(collection = %self.collection))]
    pub async fn query_with_cancel(
        &self,
        q: &BoundingBoxQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<Candidate>> {
        if q.is_inverted() {
            warn!(?q, "bounding box has min > max; no documents can match");
        }

        let body = request::build_bounding_box_query(q)
            .to_json()
            .map_err(|e| GatewayError::DecodeFailure(format!("encode query: {}", e)))?;
        let request = EngineRequest::search(&self.collection, body);

        let response = self.send(request, cancel).await?;
        let status = response.status;
        let success = response.is_success();
        let body = self.read_body(response, cancel).await?;

        if !success {
            let err = response::decode_engine_error(status, &body);
            warn!(status, error = %err, "query rejected by engine");
            return Err(err);
        }

        let decoded = SearchResponse::from_body(&body)?;
        let total = decoded.total();
        let candidates = decoded.into_candidates()?;
        debug!(hits = candidates.len(), total, "query decoded");
        Ok(candidates)
    }

    /// Ping the engine root endpoint
    #[tracing::instrument(name = "gateway.health", skip_all)]
    pub async fn health(&self) -> Result<EngineHealth> {
        let cancel = CancellationToken::new();
        let response = self.send(EngineRequest::root(), &cancel).await?;
        let status = response.status;
        let success = response.is_success();
        let body = self.read_body(response, &cancel).await?;

        if !success {
            return Err(response::decode_engine_error(status, &body));
        }
        Ok(serde_json::from_slice(&body)?)
    }

    async fn send(
        &self,
        request: EngineRequest,
        cancel: &CancellationToken,
    ) -> Result<EngineResponse> {
        debug!(method = ?request.method, path = %request.path.join("/"), "sending request");
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(GatewayError::cancelled()),
            result = self.transport.send(request) => result.map_err(|e| {
                warn!(error = %e, "transport failure");
                GatewayError::from(e)
            }),
        }
    }

    async fn read_body(
        &self,
        response: EngineResponse,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(GatewayError::cancelled()),
            result = response.bytes() => result.map_err(GatewayError::from),
        }
    }
}
