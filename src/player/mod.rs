//! Binding between a stream adapter and the player view.
//!
//! [`StreamPlayer`] owns at most one live adapter. It builds the adapter from
//! [`PlayerProps`] on mount, mirrors the adapter's events into an
//! [`ObservedState`], re-emits them as [`PlayerEvent`]s, and rebuilds the
//! adapter whenever [`reconcile`] reports a transport change.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized -> Instantiating -> Bound -> TearingDown -> Uninitialized
//! ```
//!
//! Teardown always completes before the next adapter is created. The old
//! adapter's `close` is started but not awaited, and anything it emits after
//! teardown begins is ignored.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use stream_player::player::{PlayerEvent, PlayerProps, StreamPlayer};
//! use stream_player::stream::{LoopbackFactory, StreamType};
//!
//! # tokio_test_block(async {
//! let factory = Arc::new(LoopbackFactory::new());
//! let props = PlayerProps::new(StreamType::Sse, serde_json::Map::new()).auto_open(true);
//! let mut player = StreamPlayer::new(props, factory.clone());
//!
//! let _sub = player.handle().subscribe(Arc::new(|event: &PlayerEvent| println!("{}", event.name())));
//! player.mount().await.unwrap();
//! factory.latest().unwrap().push("hello".into()).unwrap();
//! assert_eq!(player.messages().len(), 1);
//! player.unmount();
//! # });
//! # fn tokio_test_block(f: impl std::future::Future<Output = ()>) {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

mod events;
mod props;
mod state;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::BoxFuture;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info, trace, warn};

use crate::error::{PlayerError, StreamError};
use crate::media::{MediaStream, PlaybackFlags, VideoElement};
use crate::stream::{
    EventKind, Listener, Listeners, StreamAdapter, StreamConfig, StreamEvent, StreamFactory,
    StreamOptions, StreamState, StreamStatus, StreamType, Subscription, SubscriptionSet,
};

pub use events::{PlayerEvent, sse_event};
pub use props::{DEFAULT_LOG_LIMIT, PlayerProps, Reconcile, VideoAttrs, reconcile};
pub use state::{MessageLog, ObservedState, PlayerSnapshot};

/// Binding lifecycle phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Uninitialized,
    Instantiating,
    Bound,
    TearingDown,
}

/// The live adapter and everything registered on it.
struct Binding {
    adapter: Arc<dyn StreamAdapter>,
    subscriptions: SubscriptionSet,
    generation: u64,
}

struct Shared {
    state: Mutex<ObservedState>,
    binding: Mutex<Option<Binding>>,
    phase: Mutex<Phase>,
    /// Bumped on every bind and teardown; listeners of older bindings go quiet.
    generation: AtomicU64,
    playback: Mutex<PlaybackFlags>,
    notifications: Listeners<PlayerEvent>,
    video: VideoElement,
}

impl Shared {
    fn set_phase(&self, phase: Phase) {
        *self.phase.lock() = phase;
    }

    fn bound_adapter(&self) -> Option<Arc<dyn StreamAdapter>> {
        self.binding
            .lock()
            .as_ref()
            .map(|binding| Arc::clone(&binding.adapter))
    }

    fn handle_event(&self, generation: u64, event: &StreamEvent) {
        if self.generation.load(Ordering::SeqCst) != generation {
            trace!(
                name: "player.event.stale",
                generation,
                kind = ?event.kind(),
                "Ignoring event from a torn-down adapter"
            );
            return;
        }

        let notification = {
            let mut state = self.state.lock();
            match event {
                StreamEvent::Open => {
                    state.is_open = true;
                    PlayerEvent::Open
                }
                StreamEvent::Close => {
                    state.is_open = false;
                    PlayerEvent::Close
                }
                StreamEvent::Status(status) => {
                    state.status = *status;
                    PlayerEvent::Status(*status)
                }
                StreamEvent::Error(error) => {
                    state.last_error = Some(error.clone());
                    PlayerEvent::Error(error.clone())
                }
                StreamEvent::Message(message) => {
                    state.messages.push(message.clone());
                    PlayerEvent::Message(message.clone())
                }
            }
        };

        self.notifications.emit(&notification);
    }

    /// Release the bound adapter, if any. Returns whether one was bound.
    fn teardown(&self) -> bool {
        let binding = self.binding.lock().take();
        let Some(mut binding) = binding else {
            self.state.lock().is_open = false;
            return false;
        };

        self.set_phase(Phase::TearingDown);
        self.generation.fetch_add(1, Ordering::SeqCst);

        detach("close", binding.adapter.close());
        let released = binding.subscriptions.cancel_all();

        self.state.lock().is_open = false;
        self.set_phase(Phase::Uninitialized);

        debug!(
            name: "player.teardown",
            generation = binding.generation,
            released,
            "Stream adapter torn down"
        );
        true
    }
}

/// Drive an adapter operation to completion without waiting for it.
///
/// Failures are logged; adapters report them to listeners through their
/// `error` event.
fn detach(operation: &'static str, completion: BoxFuture<'static, Result<(), StreamError>>) {
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        trace!(
            name: "player.detach.no_runtime",
            operation,
            "No async runtime; completion is not observed"
        );
        return;
    };

    runtime.spawn(async move {
        if let Err(e) = completion.await {
            debug!(
                name: "player.operation.failed",
                operation,
                error = %e,
                "Stream operation failed"
            );
        }
    });
}

/// `attachVideo` disables track attachment only when literally `false`.
fn attach_video_enabled(config: &StreamConfig) -> bool {
    config.get("attachVideo") != Some(&Value::Bool(false))
}

/// Imperative handle to a player.
///
/// Cheap to clone. Every command is a no-op when no adapter is bound, and
/// none of them fail.
#[derive(Clone)]
pub struct PlayerHandle {
    shared: Arc<Shared>,
}

impl PlayerHandle {
    fn new(log_limit: usize, playback: PlaybackFlags) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(ObservedState::new(log_limit)),
                binding: Mutex::new(None),
                phase: Mutex::new(Phase::Uninitialized),
                generation: AtomicU64::new(0),
                playback: Mutex::new(playback),
                notifications: Listeners::new(),
                video: VideoElement::new(),
            }),
        }
    }

    /// Start opening the bound stream.
    pub fn open(&self) {
        match self.shared.bound_adapter() {
            Some(adapter) => detach("open", adapter.open()),
            None => trace!(name: "player.open.unbound", "open ignored: no stream bound"),
        }
    }

    /// Start closing the bound stream.
    pub fn close(&self) {
        match self.shared.bound_adapter() {
            Some(adapter) => detach("close", adapter.close()),
            None => trace!(name: "player.close.unbound", "close ignored: no stream bound"),
        }
    }

    /// Send data if the bound transport supports it.
    pub fn send(&self, data: Value) {
        let Some(adapter) = self.shared.bound_adapter() else {
            trace!(name: "player.send.unbound", "send ignored: no stream bound");
            return;
        };
        if !adapter.can_send() {
            debug!(name: "player.send.unsupported", "send ignored: transport is read-only");
            return;
        }
        if let Err(e) = adapter.send(data) {
            warn!(name: "player.send.failed", error = %e, "Failed to send on stream");
        }
    }

    pub fn status(&self) -> StreamStatus {
        self.shared.state.lock().status
    }

    pub fn is_open(&self) -> bool {
        self.shared.state.lock().is_open
    }

    /// Most recent error reported by the bound adapter.
    pub fn error(&self) -> Option<StreamError> {
        self.shared.state.lock().last_error.clone()
    }

    /// Retained messages, oldest first.
    pub fn messages(&self) -> Vec<Value> {
        self.shared.state.lock().messages.to_vec()
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        self.shared.state.lock().snapshot()
    }

    /// The bound adapter's own state snapshot.
    pub fn adapter_state(&self) -> Option<StreamState> {
        self.shared.bound_adapter().map(|adapter| adapter.state())
    }

    pub fn phase(&self) -> Phase {
        *self.shared.phase.lock()
    }

    pub fn is_bound(&self) -> bool {
        self.shared.binding.lock().is_some()
    }

    /// The player's video element.
    pub fn video(&self) -> VideoElement {
        self.shared.video.clone()
    }

    /// Receive player notifications.
    pub fn subscribe(&self, listener: Listener<PlayerEvent>) -> Subscription {
        self.shared.notifications.add(listener)
    }
}

impl fmt::Debug for PlayerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerHandle")
            .field("phase", &self.phase())
            .field("state", &*self.shared.state.lock())
            .finish()
    }
}

/// Stream player component state.
pub struct StreamPlayer {
    props: PlayerProps,
    factory: Arc<dyn StreamFactory>,
    handle: PlayerHandle,
    mounted: bool,
}

impl StreamPlayer {
    pub fn new(props: PlayerProps, factory: Arc<dyn StreamFactory>) -> Self {
        let handle = PlayerHandle::new(props.log_limit, props.playback_flags());
        Self {
            props,
            factory,
            handle,
            mounted: false,
        }
    }

    pub fn props(&self) -> &PlayerProps {
        &self.props
    }

    pub fn handle(&self) -> PlayerHandle {
        self.handle.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Create and bind the first adapter. Calling it again is a no-op.
    ///
    /// With `auto_open`, waits for the adapter's `open` to complete; an open
    /// failure is reported through the `error` notification, not here.
    pub async fn mount(&mut self) -> Result<(), PlayerError> {
        if self.mounted {
            return Ok(());
        }
        self.mounted = true;
        info!(name: "player.mount", kind = %self.props.kind, "Mounting stream player");
        self.instantiate().await
    }

    /// Apply new props, recreating the adapter if the transport changed.
    pub async fn set_props(&mut self, next: PlayerProps) -> Result<Reconcile, PlayerError> {
        let outcome = reconcile(&self.props, &next);
        self.props = next;

        let shared = &self.handle.shared;
        shared.state.lock().messages.set_limit(self.props.log_limit);
        let flags = self.props.playback_flags();
        *shared.playback.lock() = flags;
        if self.props.kind.is_media() {
            shared.video.apply(flags);
        }

        if outcome.requires_recreation() && self.mounted {
            debug!(
                name: "player.reconcile.recreate",
                kind = %self.props.kind,
                "Transport changed; recreating stream adapter"
            );
            self.instantiate().await?;
        }
        Ok(outcome)
    }

    /// Tear down the bound adapter.
    pub fn unmount(&mut self) {
        self.mounted = false;
        if self.handle.shared.teardown() {
            info!(name: "player.unmount", kind = %self.props.kind, "Stream player unmounted");
        }
    }

    pub fn open(&self) {
        self.handle.open();
    }

    pub fn close(&self) {
        self.handle.close();
    }

    pub fn send(&self, data: Value) {
        self.handle.send(data);
    }

    pub fn status(&self) -> StreamStatus {
        self.handle.status()
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_open()
    }

    pub fn error(&self) -> Option<StreamError> {
        self.handle.error()
    }

    pub fn messages(&self) -> Vec<Value> {
        self.handle.messages()
    }

    async fn instantiate(&self) -> Result<(), PlayerError> {
        let shared = &self.handle.shared;
        shared.teardown();
        shared.set_phase(Phase::Instantiating);

        let options = self.build_options();
        let adapter = match self.factory.create(options) {
            Ok(adapter) => adapter,
            Err(e) => {
                shared.set_phase(Phase::Uninitialized);
                warn!(
                    name: "stream.create_failed",
                    kind = %self.props.kind,
                    error = %e,
                    "Failed to create stream adapter"
                );
                return Err(e.into());
            }
        };

        let generation = shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        shared.state.lock().reset();
        let subscriptions = self.bind(&adapter, generation);
        *shared.binding.lock() = Some(Binding {
            adapter: Arc::clone(&adapter),
            subscriptions,
            generation,
        });
        shared.set_phase(Phase::Bound);

        info!(
            name: "stream.created",
            kind = %self.props.kind,
            generation,
            "Stream adapter bound"
        );

        if self.props.auto_open {
            if let Err(e) = adapter.open().await {
                debug!(
                    name: "player.auto_open.failed",
                    error = %e,
                    "Auto-open failed"
                );
            }
        }
        Ok(())
    }

    fn bind(&self, adapter: &Arc<dyn StreamAdapter>, generation: u64) -> SubscriptionSet {
        let mut subscriptions = SubscriptionSet::new();
        for kind in EventKind::ALL {
            let weak = Arc::downgrade(&self.handle.shared);
            subscriptions.push(adapter.on(
                kind,
                Arc::new(move |event: &StreamEvent| {
                    if let Some(shared) = weak.upgrade() {
                        shared.handle_event(generation, event);
                    }
                }),
            ));
        }
        subscriptions
    }

    fn build_options(&self) -> StreamOptions {
        let props = &self.props;
        let shared = &self.handle.shared;
        let options = StreamOptions::new(props.kind, props.config.clone());

        match props.kind {
            StreamType::Hls => {
                shared.video.apply(props.playback_flags());
                options.with_video(shared.video.clone())
            }
            StreamType::WebRtc => {
                let attach = attach_video_enabled(&options.config);
                let weak = Arc::downgrade(shared);
                options.with_on_track(Arc::new(move |stream: MediaStream| {
                    if !attach {
                        trace!(name: "player.track.skipped", "attachVideo disabled; track not attached");
                        return;
                    }
                    if let Some(shared) = weak.upgrade() {
                        shared.video.attach(stream);
                        let flags = *shared.playback.lock();
                        shared.video.apply(flags);
                    }
                }))
            }
            StreamType::WebSocket | StreamType::Sse | StreamType::Http | StreamType::LongPolling => {
                options
            }
        }
    }
}

impl Drop for StreamPlayer {
    fn drop(&mut self) {
        if self.mounted {
            self.handle.shared.teardown();
        }
    }
}

impl fmt::Debug for StreamPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamPlayer")
            .field("props", &self.props)
            .field("mounted", &self.mounted)
            .field("handle", &self.handle)
            .finish()
    }
}
