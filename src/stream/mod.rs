//! Stream adapter contract.
//!
//! A stream adapter wraps one transport (websocket, SSE, HTTP polling,
//! long-polling, HLS, WebRTC) behind a uniform lifecycle: `open`, `close`,
//! optional `send`, event subscription, and a state snapshot. Adapters are
//! created from [`StreamOptions`] by a [`StreamFactory`].
//!
//! # Components
//!
//! - [`StreamAdapter`]: the adapter trait
//! - [`StreamFactory`]: builds adapters from options
//! - [`EventHub`]: per-kind listener registry for adapter implementations
//! - [`Subscription`], [`SubscriptionSet`]: listener removal handles
//! - [`LoopbackStream`]: in-process adapter without a transport
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use stream_player::stream::{
//!     EventKind, LoopbackFactory, StreamEvent, StreamFactory, StreamOptions, StreamType,
//! };
//!
//! let factory = LoopbackFactory::new();
//! let adapter = factory
//!     .create(StreamOptions::new(StreamType::Sse, serde_json::Map::new()))
//!     .unwrap();
//! let subscription = adapter.on(EventKind::Message, Arc::new(|event: &StreamEvent| println!("{event:?}")));
//! subscription.cancel();
//! ```

mod loopback;
mod options;
mod subscription;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StreamError;

pub use loopback::{LoopbackFactory, LoopbackStream};
pub use options::{BackoffOptions, BaseOptions, RESERVED_KEYS, StreamConfig, StreamOptions};
pub use subscription::{Listener, Listeners, Subscription, SubscriptionSet};

/// Transport selected by a stream configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamType {
    #[serde(rename = "websocket")]
    WebSocket,
    #[serde(rename = "sse")]
    Sse,
    #[serde(rename = "http")]
    Http,
    #[serde(rename = "long-polling")]
    LongPolling,
    #[serde(rename = "hls")]
    Hls,
    #[serde(rename = "webrtc")]
    WebRtc,
}

impl StreamType {
    pub const ALL: [Self; 6] = [
        Self::WebSocket,
        Self::Sse,
        Self::Http,
        Self::LongPolling,
        Self::Hls,
        Self::WebRtc,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WebSocket => "websocket",
            Self::Sse => "sse",
            Self::Http => "http",
            Self::LongPolling => "long-polling",
            Self::Hls => "hls",
            Self::WebRtc => "webrtc",
        }
    }

    /// Whether the transport renders into a video element.
    #[must_use]
    pub fn is_media(self) -> bool {
        matches!(self, Self::Hls | Self::WebRtc)
    }

    /// Whether the transport can carry data from the client.
    #[must_use]
    pub fn is_bidirectional(self) -> bool {
        matches!(self, Self::WebSocket | Self::WebRtc)
    }
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamType {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StreamError::InvalidConfig(format!("unknown stream type: {s}")))
    }
}

/// Connection status reported by an adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamStatus {
    #[default]
    Idle,
    Connecting,
    Open,
    Closing,
    Closed,
    Error,
}

impl StreamStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closing => "closing",
            Self::Closed => "closed",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kinds of events an adapter emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Open,
    Close,
    Status,
    Error,
    Message,
}

impl EventKind {
    pub const ALL: [Self; 5] = [
        Self::Open,
        Self::Close,
        Self::Status,
        Self::Error,
        Self::Message,
    ];

    fn index(self) -> usize {
        match self {
            Self::Open => 0,
            Self::Close => 1,
            Self::Status => 2,
            Self::Error => 3,
            Self::Message => 4,
        }
    }
}

/// Event delivered to adapter listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Open,
    Close,
    Status(StreamStatus),
    Error(StreamError),
    Message(Value),
}

impl StreamEvent {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Open => EventKind::Open,
            Self::Close => EventKind::Close,
            Self::Status(_) => EventKind::Status,
            Self::Error(_) => EventKind::Error,
            Self::Message(_) => EventKind::Message,
        }
    }
}

/// Listener for adapter events.
pub type StreamListener = Listener<StreamEvent>;

/// Read-only snapshot of an adapter's state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamState {
    pub status: StreamStatus,
    pub error: Option<StreamError>,
    pub messages: Vec<Value>,
    pub is_open: bool,
}

/// A configured stream over one transport.
///
/// `open` and `close` start their work when called and return a future that
/// resolves on completion; callers may drop the future without waiting.
/// Runtime failures are reported through [`EventKind::Error`] listeners.
pub trait StreamAdapter: Send + Sync {
    /// Begin connecting.
    fn open(&self) -> BoxFuture<'static, Result<(), StreamError>>;

    /// Tear the connection down. Safe to call repeatedly or before `open`.
    fn close(&self) -> BoxFuture<'static, Result<(), StreamError>>;

    /// Whether [`send`](Self::send) is supported by this transport.
    fn can_send(&self) -> bool {
        false
    }

    /// Send data to the remote end.
    fn send(&self, data: Value) -> Result<(), StreamError> {
        let _ = data;
        Err(StreamError::SendUnsupported)
    }

    /// Register a listener for one event kind.
    fn on(&self, kind: EventKind, listener: StreamListener) -> Subscription;

    /// Current state snapshot.
    fn state(&self) -> StreamState;
}

/// Builds adapters from options.
pub trait StreamFactory: Send + Sync {
    fn create(&self, options: StreamOptions) -> Result<Arc<dyn StreamAdapter>, StreamError>;
}

impl<F> StreamFactory for F
where
    F: Fn(StreamOptions) -> Result<Arc<dyn StreamAdapter>, StreamError> + Send + Sync,
{
    fn create(&self, options: StreamOptions) -> Result<Arc<dyn StreamAdapter>, StreamError> {
        self(options)
    }
}

/// Per-kind listener registry for adapter implementations.
#[derive(Debug, Default)]
pub struct EventHub {
    kinds: [Listeners<StreamEvent>; 5],
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, kind: EventKind, listener: StreamListener) -> Subscription {
        self.kinds[kind.index()].add(listener)
    }

    /// Deliver `event` to the listeners of its kind.
    pub fn emit(&self, event: &StreamEvent) {
        self.kinds[event.kind().index()].emit(event);
    }

    /// Number of listeners registered for `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.kinds[kind.index()].len()
    }
}
