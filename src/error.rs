//! Error taxonomy for gateway calls
//!
//! Every failed `index`/`query` call resolves to exactly one [`GatewayError`].
//! Nothing is retried internally; the caller owns retry policy.

use thiserror::Error;

/// Classification tag of a [`GatewayError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The engine could not be reached, or the response could not be read
    Transport,
    /// The engine answered with a non-success status
    EngineRejected,
    /// A response arrived but did not have the expected shape
    DecodeFailure,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transport: {0}")]
    Transport(String),

    #[error("engine rejected request ({status}): {reason}")]
    EngineRejected { status: u16, reason: String },

    #[error("decode failure: {0}")]
    DecodeFailure(String),
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::Transport,
            Self::EngineRejected { .. } => ErrorKind::EngineRejected,
            Self::DecodeFailure(_) => ErrorKind::DecodeFailure,
        }
    }

    /// Underlying cause text without the classification prefix
    pub fn cause(&self) -> &str {
        match self {
            Self::Transport(cause) | Self::DecodeFailure(cause) => cause,
            Self::EngineRejected { reason, .. } => reason,
        }
    }

    pub(crate) fn cancelled() -> Self {
        Self::Transport("request cancelled".to_string())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::DecodeFailure(err.to_string())
    }
}

/// Errors raised while building a gateway from configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid engine url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to create HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(
            GatewayError::Transport("refused".into()).kind(),
            ErrorKind::Transport
        );
        assert_eq!(
            GatewayError::EngineRejected {
                status: 404,
                reason: "index_not_found".into()
            }
            .kind(),
            ErrorKind::EngineRejected
        );
        assert_eq!(
            GatewayError::DecodeFailure("bad".into()).kind(),
            ErrorKind::DecodeFailure
        );
    }

    #[test]
    fn display_keeps_cause() {
        let e = GatewayError::EngineRejected {
            status: 404,
            reason: "no such index [cafe]".into(),
        };
        assert_eq!(
            e.to_string(),
            "engine rejected request (404): no such index [cafe]"
        );
        assert_eq!(e.cause(), "no such index [cafe]");

        let e = GatewayError::Transport("connection refused".into());
        assert_eq!(e.to_string(), "transport: connection refused");
    }

    #[test]
    fn json_errors_are_decode_failures() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let e: GatewayError = err.into();
        assert_eq!(e.kind(), ErrorKind::DecodeFailure);
    }

    #[test]
    fn cancelled_is_transport() {
        let e = GatewayError::cancelled();
        assert_eq!(e.kind(), ErrorKind::Transport);
        assert_eq!(e.cause(), "request cancelled");
    }
}
