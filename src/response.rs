//! Typed response envelopes and their decoding
//!
//! Success: `{"hits":{"hits":[{"_id":"7"}, ...]}}`
//! Error:   `{"error":{"reason":"...", ...}}`

use serde::Deserialize;

use crate::error::{GatewayError, Result};
use crate::model::Candidate;

/// Longest raw body excerpt carried in an error
const MAX_BODY_EXCERPT: usize = 200;

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
pub struct HitsEnvelope {
    #[serde(default)]
    pub total: Option<TotalHits>,
    pub hits: Vec<Hit>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TotalHits {
    pub value: u64,
}

#[derive(Debug, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id")]
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub reason: String,
}

/// Root endpoint payload, used for health checks
#[derive(Debug, Clone, Deserialize)]
pub struct EngineHealth {
    pub cluster_name: String,
    pub version: EngineVersion,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineVersion {
    pub number: String,
}

impl SearchResponse {
    pub fn from_body(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Exact match count, when the engine tracked it
    pub fn total(&self) -> Option<u64> {
        self.hits.total.map(|t| t.value)
    }

    /// Parse every hit id, in engine order
    ///
    /// One unparsable `_id` fails the whole result.
    pub fn into_candidates(self) -> Result<Vec<Candidate>> {
        self.hits
            .hits
            .into_iter()
            .map(|hit| {
                hit.id
                    .parse::<i64>()
                    .map(|id| Candidate { id })
                    .map_err(|e| {
                        GatewayError::DecodeFailure(format!("hit _id '{}': {}", hit.id, e))
                    })
            })
            .collect()
    }
}

/// Decode an engine error body into an `EngineRejected` error
///
/// A body that is not a valid error envelope is a `DecodeFailure`.
pub fn decode_engine_error(status: u16, body: &[u8]) -> GatewayError {
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) => GatewayError::EngineRejected {
            status,
            reason: envelope.error.reason,
        },
        Err(e) => GatewayError::DecodeFailure(format!("error envelope: {}", e)),
    }
}

/// Like [`decode_engine_error`] but falls back to the raw body text
///
/// Used on the write path, where losing the rejection to a decode error
/// would hide the status.
pub fn engine_error_or_raw(status: u16, body: &[u8]) -> GatewayError {
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) => GatewayError::EngineRejected {
            status,
            reason: envelope.error.reason,
        },
        Err(_) => GatewayError::EngineRejected {
            status,
            reason: body_excerpt(body),
        },
    }
}

fn body_excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }
    trimmed.chars().take(MAX_BODY_EXCERPT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn decode_candidates(body: &[u8]) -> Result<Vec<Candidate>> {
        SearchResponse::from_body(body)?.into_candidates()
    }

    #[test]
    fn decodes_hits_in_order() {
        let body = br#"{"hits":{"total":{"value":2,"relation":"eq"},"hits":[{"_id":"7","_source":{}},{"_id":"42"}]}}"#;
        let candidates = decode_candidates(body).unwrap();
        assert_eq!(candidates, vec![Candidate { id: 7 }, Candidate { id: 42 }]);
    }

    #[test]
    fn total_is_optional() {
        let body = br#"{"hits":{"total":{"value":12,"relation":"eq"},"hits":[]}}"#;
        let response = SearchResponse::from_body(body).unwrap();
        assert_eq!(response.total(), Some(12));

        let response = SearchResponse::from_body(br#"{"hits":{"hits":[]}}"#).unwrap();
        assert_eq!(response.total(), None);
    }

    #[test]
    fn empty_hits_is_empty_result() {
        let candidates = decode_candidates(br#"{"hits":{"hits":[]}}"#).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn one_bad_id_fails_everything() {
        let body = br#"{"hits":{"hits":[{"_id":"7"},{"_id":"abc"},{"_id":"9"}]}}"#;
        let err = decode_candidates(body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeFailure);
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn missing_hits_is_decode_failure() {
        let err = decode_candidates(br#"{"took":3}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeFailure);

        let err = decode_candidates(b"not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeFailure);
    }

    #[test]
    fn non_string_id_is_decode_failure() {
        let err = decode_candidates(br#"{"hits":{"hits":[{"_id":7}]}}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeFailure);
    }

    #[test]
    fn engine_error_reason_is_extracted() {
        let body = br#"{"error":{"root_cause":[],"type":"index_not_found_exception","reason":"index_not_found"},"status":404}"#;
        let err = decode_engine_error(404, body);
        assert_eq!(err.kind(), ErrorKind::EngineRejected);
        assert!(err.to_string().contains("index_not_found"));
    }

    #[test]
    fn malformed_error_envelope_is_decode_failure() {
        let err = decode_engine_error(500, b"<html>bad gateway</html>");
        assert_eq!(err.kind(), ErrorKind::DecodeFailure);

        let err = decode_engine_error(400, br#"{"error":"just a string"}"#);
        assert_eq!(err.kind(), ErrorKind::DecodeFailure);
    }

    #[test]
    fn raw_fallback_keeps_status_and_body() {
        let err = engine_error_or_raw(503, b"  upstream unavailable \n");
        match err {
            GatewayError::EngineRejected { status, reason } => {
                assert_eq!(status, 503);
                assert_eq!(reason, "upstream unavailable");
            }
            other => panic!("unexpected {other:?}"),
        }

        let err = engine_error_or_raw(500, b"");
        assert_eq!(err.cause(), "<empty body>");
    }

    #[test]
    fn raw_fallback_prefers_envelope_reason() {
        let body = br#"{"error":{"type":"mapper_parsing_exception","reason":"failed to parse"}}"#;
        let err = engine_error_or_raw(400, body);
        assert_eq!(err.cause(), "failed to parse");
    }

    #[test]
    fn health_payload_decodes() {
        let body = br#"{"name":"node-1","cluster_name":"docker-cluster","version":{"number":"7.17.9"},"tagline":"You Know, for Search"}"#;
        let health: EngineHealth = serde_json::from_slice(body).unwrap();
        assert_eq!(health.cluster_name, "docker-cluster");
        assert_eq!(health.version.number, "7.17.9");
    }
}
