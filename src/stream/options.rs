//! Options handed to a [`StreamFactory`](super::StreamFactory).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::StreamType;
use crate::error::StreamError;
use crate::media::{TrackHandler, VideoElement};

/// Transport-specific configuration keys.
pub type StreamConfig = Map<String, Value>;

/// Config keys owned by the binding. Caller-supplied values are discarded.
pub const RESERVED_KEYS: [&str; 3] = ["type", "video", "onTrack"];

/// Fully computed adapter configuration.
#[derive(Clone)]
pub struct StreamOptions {
    /// Transport discriminant.
    pub kind: StreamType,
    /// Caller configuration without reserved keys.
    pub config: StreamConfig,
    /// Owned video element (HLS).
    pub video: Option<VideoElement>,
    /// Remote track callback (WebRTC).
    pub on_track: Option<TrackHandler>,
}

impl StreamOptions {
    /// Shallow-copy `config`, dropping reserved keys.
    pub fn new(kind: StreamType, mut config: StreamConfig) -> Self {
        for key in RESERVED_KEYS {
            if config.remove(key).is_some() {
                tracing::debug!(
                    name: "stream.options.reserved_key",
                    key,
                    kind = %kind,
                    "Ignoring reserved key in stream config"
                );
            }
        }

        Self {
            kind,
            config,
            video: None,
            on_track: None,
        }
    }

    #[must_use]
    pub fn with_video(mut self, video: VideoElement) -> Self {
        self.video = Some(video);
        self
    }

    #[must_use]
    pub fn with_on_track(mut self, on_track: TrackHandler) -> Self {
        self.on_track = Some(on_track);
        self
    }

    /// Look up a config value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }

    /// String config value, e.g. `url`.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(Value::as_str)
    }

    /// Parse the keys common to all adapters.
    pub fn base(&self) -> Result<BaseOptions, StreamError> {
        serde_json::from_value(Value::Object(self.config.clone()))
            .map_err(|e| StreamError::InvalidConfig(e.to_string()))
    }

    /// Serializable view: the config plus the discriminant.
    pub fn to_json(&self) -> Value {
        let mut object = self.config.clone();
        object.insert("type".to_string(), Value::from(self.kind.as_str()));
        Value::Object(object)
    }
}

impl fmt::Debug for StreamOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamOptions")
            .field("kind", &self.kind)
            .field("config", &self.config)
            .field("video", &self.video.is_some())
            .field("on_track", &self.on_track.is_some())
            .finish()
    }
}

/// Adapter options shared by every transport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseOptions {
    /// Maximum messages the adapter keeps in its own state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_reconnect: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heartbeat_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backoff: Option<BackoffOptions>,
}

/// Reconnect backoff parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackoffOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jitter: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: Value) -> StreamConfig {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_reserved_keys_are_stripped() {
        let options = StreamOptions::new(
            StreamType::Hls,
            config(json!({
                "url": "https://cdn/playlist.m3u8",
                "type": "websocket",
                "video": "not-a-video",
                "onTrack": null
            })),
        );

        assert_eq!(options.kind, StreamType::Hls);
        assert_eq!(options.get_str("url"), Some("https://cdn/playlist.m3u8"));
        assert!(options.get("type").is_none());
        assert!(options.get("video").is_none());
        assert!(options.get("onTrack").is_none());
        assert_eq!(options.to_json()["type"], "hls");
    }

    #[test]
    fn test_base_options_parse() {
        let options = StreamOptions::new(
            StreamType::WebSocket,
            config(json!({
                "url": "wss://x",
                "bufferLimit": 20,
                "autoReconnect": true,
                "backoff": { "baseMs": 250, "factor": 2.0 }
            })),
        );

        let base = options.base().unwrap();
        assert_eq!(base.buffer_limit, Some(20));
        assert_eq!(base.auto_reconnect, Some(true));
        assert_eq!(base.max_retries, None);
        let backoff = base.backoff.unwrap();
        assert_eq!(backoff.base_ms, Some(250));
        assert_eq!(backoff.factor, Some(2.0));
    }

    #[test]
    fn test_base_options_rejects_wrong_types() {
        let options = StreamOptions::new(
            StreamType::Sse,
            config(json!({ "bufferLimit": "lots" })),
        );
        assert!(matches!(options.base(), Err(StreamError::InvalidConfig(_))));
    }
}
