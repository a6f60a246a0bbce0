//! Error types for stream adapters and the player binding.

use serde::{Deserialize, Serialize};

/// Errors reported by stream adapters.
///
/// Adapters deliver runtime failures through the `error` event rather than
/// by returning them, so this type is cheap to clone and serializable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum StreamError {
    /// The factory could not build an adapter from the given options.
    #[error("Stream construction failed: {0}")]
    Construction(String),

    /// Connecting to the remote end failed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The configuration object is malformed for this transport.
    #[error("Invalid stream config: {0}")]
    InvalidConfig(String),

    /// The transport is read-only.
    #[error("Transport does not support sending")]
    SendUnsupported,

    /// The operation needs an open stream.
    #[error("Stream is not open")]
    NotOpen,

    /// Any other transport-level failure.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Errors surfaced by [`StreamPlayer`](crate::player::StreamPlayer) lifecycle calls.
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    /// Adapter construction failed; the player is left unbound.
    #[error("Failed to create stream adapter: {0}")]
    Construction(#[from] StreamError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_error_serialization() {
        let err = StreamError::Connection("refused".to_string());
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("connection"));
        assert!(json.contains("refused"));
    }

    #[test]
    fn test_player_error_wraps_stream_error() {
        let err: PlayerError = StreamError::Construction("bad url".to_string()).into();
        assert!(err.to_string().contains("bad url"));
    }
}
