//! In-process stream adapter.
//!
//! [`LoopbackStream`] has no transport behind it: the host drives it directly
//! with [`push`](LoopbackStream::push), [`fail`](LoopbackStream::fail) and
//! [`attach_track`](LoopbackStream::attach_track). It follows the adapter
//! contract exactly, which makes it useful for demos, previews and tests.
//!
//! Recognised config keys besides [`BaseOptions`](super::BaseOptions):
//!
//! - `echo` (bool): `send` on a bidirectional stream delivers the data back
//!   as a message.
//! - `failOpen` (string): `open` fails with this message.

use std::fmt;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

use super::{
    EventHub, EventKind, StreamAdapter, StreamEvent, StreamFactory, StreamListener, StreamOptions,
    StreamState, StreamStatus, StreamType, Subscription,
};
use crate::error::StreamError;
use crate::media::{MediaStream, VideoElement};

/// Adapter driven by the host instead of a transport.
pub struct LoopbackStream {
    options: StreamOptions,
    hub: EventHub,
    state: Mutex<StreamState>,
    buffer_limit: Option<usize>,
    echo: bool,
    fail_open: Option<String>,
}

impl LoopbackStream {
    pub fn new(options: StreamOptions) -> Result<Self, StreamError> {
        let base = options.base()?;
        let echo = options
            .get("echo")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let fail_open = options.get_str("failOpen").map(str::to_owned);

        Ok(Self {
            options,
            hub: EventHub::new(),
            state: Mutex::new(StreamState::default()),
            buffer_limit: base.buffer_limit,
            echo,
            fail_open,
        })
    }

    pub fn kind(&self) -> StreamType {
        self.options.kind
    }

    pub fn options(&self) -> &StreamOptions {
        &self.options
    }

    /// Video element handed over by the binding, if any.
    pub fn video(&self) -> Option<&VideoElement> {
        self.options.video.as_ref()
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.hub.listener_count(kind)
    }

    /// Deliver an inbound message. The stream must be open.
    pub fn push(&self, message: Value) -> Result<(), StreamError> {
        {
            let mut state = self.state.lock();
            if !state.is_open {
                return Err(StreamError::NotOpen);
            }
            state.messages.push(message.clone());
            if let Some(limit) = self.buffer_limit {
                let excess = state.messages.len().saturating_sub(limit);
                state.messages.drain(..excess);
            }
        }
        self.hub.emit(&StreamEvent::Message(message));
        Ok(())
    }

    /// Simulate a runtime failure.
    pub fn fail(&self, error: StreamError) {
        {
            let mut state = self.state.lock();
            state.error = Some(error.clone());
            state.is_open = false;
        }
        self.set_status(StreamStatus::Error);
        self.hub.emit(&StreamEvent::Error(error));
    }

    /// Hand a remote track to the configured track callback.
    ///
    /// Returns `false` when the options carry no callback.
    pub fn attach_track(&self, stream: MediaStream) -> bool {
        match &self.options.on_track {
            Some(on_track) => {
                on_track(stream);
                true
            }
            None => false,
        }
    }

    fn set_status(&self, status: StreamStatus) {
        self.state.lock().status = status;
        self.hub.emit(&StreamEvent::Status(status));
    }

    fn connect(&self) -> Result<(), StreamError> {
        if self.state.lock().is_open {
            return Ok(());
        }

        self.set_status(StreamStatus::Connecting);

        if let Some(message) = &self.fail_open {
            let error = StreamError::Connection(message.clone());
            self.fail(error.clone());
            return Err(error);
        }

        {
            let mut state = self.state.lock();
            state.is_open = true;
            state.error = None;
        }
        self.set_status(StreamStatus::Open);
        self.hub.emit(&StreamEvent::Open);
        debug!(name: "loopback.open", kind = %self.kind(), "Loopback stream opened");
        Ok(())
    }

    fn disconnect(&self) {
        let active = {
            let state = self.state.lock();
            state.is_open || state.status == StreamStatus::Connecting
        };
        if !active {
            return;
        }

        self.set_status(StreamStatus::Closing);
        self.state.lock().is_open = false;
        self.set_status(StreamStatus::Closed);
        self.hub.emit(&StreamEvent::Close);
        debug!(name: "loopback.close", kind = %self.kind(), "Loopback stream closed");
    }
}

impl StreamAdapter for LoopbackStream {
    fn open(&self) -> BoxFuture<'static, Result<(), StreamError>> {
        future::ready(self.connect()).boxed()
    }

    fn close(&self) -> BoxFuture<'static, Result<(), StreamError>> {
        self.disconnect();
        future::ready(Ok(())).boxed()
    }

    fn can_send(&self) -> bool {
        self.kind().is_bidirectional()
    }

    fn send(&self, data: Value) -> Result<(), StreamError> {
        if !self.can_send() {
            return Err(StreamError::SendUnsupported);
        }
        if !self.state.lock().is_open {
            return Err(StreamError::NotOpen);
        }
        if self.echo {
            self.push(data)?;
        }
        Ok(())
    }

    fn on(&self, kind: EventKind, listener: StreamListener) -> Subscription {
        self.hub.on(kind, listener)
    }

    fn state(&self) -> StreamState {
        self.state.lock().clone()
    }
}

impl fmt::Debug for LoopbackStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoopbackStream")
            .field("options", &self.options)
            .field("state", &*self.state.lock())
            .finish()
    }
}

/// Factory producing [`LoopbackStream`]s and remembering each one created.
#[derive(Debug, Default)]
pub struct LoopbackFactory {
    created: Mutex<Vec<Arc<LoopbackStream>>>,
}

impl LoopbackFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently created stream.
    pub fn latest(&self) -> Option<Arc<LoopbackStream>> {
        self.created.lock().last().map(Arc::clone)
    }

    /// Every stream created so far, oldest first.
    pub fn created(&self) -> Vec<Arc<LoopbackStream>> {
        self.created.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.created.lock().len()
    }
}

impl StreamFactory for LoopbackFactory {
    fn create(&self, options: StreamOptions) -> Result<Arc<dyn StreamAdapter>, StreamError> {
        let stream = Arc::new(LoopbackStream::new(options).inspect_err(|e| {
            warn!(name: "loopback.create_failed", error = %e, "Rejected loopback config");
        })?);
        self.created.lock().push(Arc::clone(&stream));
        Ok(stream)
    }
}
