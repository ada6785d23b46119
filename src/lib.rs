//! geo-gateway - geospatial indexing and bounding-box queries over a search engine
//!
//! The gateway hides the engine's wire protocol, query DSL and response shapes
//! behind two operations: write a point location, and list the ids inside a
//! bounding box.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  Caller: index(location) / query(bbox)       │
//! └──────────────────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────┐
//! │  request: IndexDocument / QueryDocument      │
//! └──────────────────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────┐
//! │  SearchGateway ── EngineTransport            │
//! │    (HttpTransport | InMemoryEngine)          │
//! └──────────────────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────┐
//! │  response: Vec<Candidate> | GatewayError     │
//! │   (Transport | EngineRejected | Decode)      │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use geo_gateway::{BoundingBoxQuery, GatewayConfig, IndexableLocation, SearchGateway};
//!
//! let config = GatewayConfig::load()?;
//! let gateway = SearchGateway::from_config(&config)?;
//!
//! gateway.index(&IndexableLocation::new(7, 35.68, 139.76)).await?;
//! let candidates = gateway
//!     .query(&BoundingBoxQuery::new(35.0, 36.0, 139.0, 140.0))
//!     .await?;
//! ```

pub mod config;
pub mod error;
pub mod gateway;
pub mod model;
pub mod request;
pub mod response;
pub mod transport;

// Re-export main types
pub use config::GatewayConfig;
pub use error::{ConfigError, ErrorKind, GatewayError};
pub use gateway::SearchGateway;
pub use model::{BoundingBoxQuery, Candidate, IndexableLocation};
pub use response::EngineHealth;
pub use transport::{EngineTransport, HttpTransport, InMemoryEngine};

pub use tokio_util::sync::CancellationToken;
