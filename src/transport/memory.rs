//! In-process engine
//!
//! Answers the gateway's index, search and root requests from memory, with
//! the engine's response shapes: auto-created collections, overwrite on
//! re-index, `gte`/`lt` range filtering and `{"error":{...}}` envelopes.
//! Documents are returned in first-insertion order.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{EngineRequest, EngineResponse, EngineTransport, Method, TransportError};

const CLUSTER_NAME: &str = "in-memory";
const VERSION: &str = "7.17.0";

#[derive(Default)]
pub struct InMemoryEngine {
    collections: RwLock<HashMap<String, Vec<StoredDocument>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub source: Value,
}

impl StoredDocument {
    /// Numeric value of a field, coercing numeric strings like the engine does
    pub fn number(&self, field: &str) -> Option<f64> {
        match self.source.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl InMemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn document(&self, collection: &str, id: &str) -> Option<StoredDocument> {
        let collections = self.collections.read().await;
        collections
            .get(collection)?
            .iter()
            .find(|doc| doc.id == id)
            .cloned()
    }

    pub async fn count(&self, collection: &str) -> usize {
        let collections = self.collections.read().await;
        collections.get(collection).map_or(0, Vec::len)
    }

    async fn index(&self, collection: &str, id: &str, body: Option<&[u8]>) -> (u16, Value) {
        let source = match body.map(serde_json::from_slice::<Value>) {
            Some(Ok(source @ Value::Object(_))) => source,
            Some(Ok(_)) => {
                return error_body(400, "mapper_parsing_exception", "document must be an object")
            }
            Some(Err(e)) => return error_body(400, "mapper_parsing_exception", &e.to_string()),
            None => return error_body(400, "parse_exception", "request body is required"),
        };

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        let result = match docs.iter_mut().find(|doc| doc.id == id) {
            Some(existing) => {
                existing.source = source;
                "updated"
            }
            None => {
                docs.push(StoredDocument {
                    id: id.to_string(),
                    source,
                });
                "created"
            }
        };

        let status = if result == "created" { 201 } else { 200 };
        (
            status,
            json!({
                "_index": collection,
                "_id": id,
                "result": result,
                "forced_refresh": true,
            }),
        )
    }

    async fn search(&self, collection: &str, body: Option<&[u8]>) -> (u16, Value) {
        let search: SearchBody = match body.map(serde_json::from_slice) {
            Some(Ok(search)) => search,
            Some(Err(e)) => return error_body(400, "parsing_exception", &e.to_string()),
            None => SearchBody::default(),
        };

        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return error_body(
                404,
                "index_not_found_exception",
                &format!("no such index [{}]", collection),
            );
        };

        let hits: Vec<Value> = docs
            .iter()
            .filter(|doc| search.matches(doc))
            .map(|doc| {
                json!({
                    "_index": collection,
                    "_id": doc.id,
                    "_score": 1.0,
                    "_source": doc.source,
                })
            })
            .collect();

        (
            200,
            json!({
                "took": 0,
                "timed_out": false,
                "hits": {
                    "total": { "value": hits.len(), "relation": "eq" },
                    "hits": hits,
                }
            }),
        )
    }
}

#[async_trait]
impl EngineTransport for InMemoryEngine {
    async fn send(&self, request: EngineRequest) -> Result<EngineResponse, TransportError> {
        let body = request.body.as_deref();
        let path: Vec<&str> = request.path.iter().map(String::as_str).collect();

        let (status, payload) = match (request.method, path.as_slice()) {
            (Method::Get, []) => (
                200,
                json!({
                    "cluster_name": CLUSTER_NAME,
                    "version": { "number": VERSION },
                }),
            ),
            (Method::Put, [collection, "_doc", id]) => self.index(collection, id, body).await,
            (Method::Post, [collection, "_search"]) => self.search(collection, body).await,
            _ => error_body(
                405,
                "illegal_argument_exception",
                &format!("unsupported {:?} /{}", request.method, path.join("/")),
            ),
        };

        let bytes = serde_json::to_vec(&payload).map_err(|e| TransportError(e.to_string()))?;
        Ok(EngineResponse::new(status, Box::new(bytes)))
    }
}

fn error_body(status: u16, error_type: &str, reason: &str) -> (u16, Value) {
    (
        status,
        json!({
            "error": { "type": error_type, "reason": reason },
            "status": status,
        }),
    )
}

#[derive(Debug, Default, Deserialize)]
struct SearchBody {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(rename = "bool")]
    bool_query: BoolBody,
}

#[derive(Debug, Deserialize)]
struct BoolBody {
    #[serde(default)]
    must: Vec<RangeBody>,
}

#[derive(Debug, Deserialize)]
struct RangeBody {
    range: HashMap<String, Bounds>,
}

#[derive(Debug, Deserialize)]
struct Bounds {
    gte: Option<f64>,
    lt: Option<f64>,
}

impl SearchBody {
    fn matches(&self, doc: &StoredDocument) -> bool {
        let Some(query) = &self.query else {
            return true;
        };
        query.bool_query.must.iter().all(|clause| {
            clause.range.iter().all(|(field, bounds)| {
                let Some(value) = doc.number(field) else {
                    return false;
                };
                let above = bounds.gte.map_or(true, |gte| value >= gte);
                let below = bounds.lt.map_or(true, |lt| value < lt);
                above && below
            })
        })
    }
}
