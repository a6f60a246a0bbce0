//! Notifications emitted by the player.
//!
//! Each [`PlayerEvent`] mirrors one adapter event and is delivered to the
//! player's subscribers in the same call that delivered the adapter event.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StreamError;
use crate::stream::StreamStatus;

/// Player-level notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum PlayerEvent {
    /// The stream opened.
    Open,
    /// The stream closed.
    Close,
    /// The stream reported a new status.
    Status(StreamStatus),
    /// The stream reported an error.
    Error(StreamError),
    /// A message arrived.
    Message(Value),
}

impl PlayerEvent {
    /// Event name as used on the wire.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::Status(_) => "status",
            Self::Error(_) => "error",
            Self::Message(_) => "message",
        }
    }
}

/// Format a notification as a Server-Sent Events frame.
#[must_use]
pub fn sse_event(event: &PlayerEvent) -> String {
    let data = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
    format!("event: {}\ndata: {}\n\n", event.name(), data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_serialization() {
        let event = PlayerEvent::Message(json!({ "temp": 21 }));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "message");
        assert_eq!(json["data"]["temp"], 21);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&PlayerEvent::Status(StreamStatus::Connecting)).unwrap();
        assert!(json.contains("\"status\""));
        assert!(json.contains("\"connecting\""));
    }

    #[test]
    fn test_sse_event_format() {
        let sse = sse_event(&PlayerEvent::Open);
        assert!(sse.starts_with("event: open\n"));
        assert!(sse.contains("data: "));
        assert!(sse.ends_with("\n\n"));
    }
}
