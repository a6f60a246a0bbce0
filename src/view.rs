//! Leptos SSR rendering of the stream player.
//!
//! Rendering is a pure function of the player's props and a state snapshot.
//! Media transports render a `<video>` element; every other transport renders
//! a message log, either the built-in [`StreamLog`] or a host-supplied log
//! slot. An actions region is always rendered and holds the host's actions
//! slot, if any.
//!
//! # Example
//!
//! ```rust,ignore
//! let slots = PlayerSlots::default().with_actions(|actions| {
//!     view! { <button>{if actions.is_open { "Close" } else { "Open" }}</button> }.into_any()
//! });
//! let html = player.to_html(&slots);
//! ```

use std::fmt;
use std::sync::Arc;

use leptos::attr::any_attribute::AnyAttribute;
use leptos::attr::custom::custom_attribute;
use leptos::prelude::*;
use serde_json::Value;

use crate::error::StreamError;
use crate::player::{PlayerHandle, PlayerProps, PlayerSnapshot, StreamPlayer};
use crate::stream::StreamStatus;

const ROOT_STYLE: &str = "display:grid;gap:8px";
const VIDEO_STYLE: &str = "width:100%;border-radius:12px";
const LOG_STYLE: &str = "background:#0b1322;color:#e5e7eb;border:1px solid #1f2937;\
                         border-radius:10px;padding:8px;max-height:260px;overflow:auto;\
                         font:12px/1.5 ui-monospace,monospace";
const LINE_STYLE: &str = "white-space:pre-wrap;word-break:break-word";
const ACTIONS_STYLE: &str = "display:flex;gap:8px;flex-wrap:wrap";

/// Data handed to a custom log slot.
#[derive(Debug, Clone)]
pub struct LogSlotProps {
    pub messages: Vec<Value>,
    pub status: StreamStatus,
    pub error: Option<StreamError>,
}

/// Data handed to an actions slot.
#[derive(Debug, Clone)]
pub struct ActionsSlotProps {
    /// Handle for `open`, `close` and `send`.
    pub handle: PlayerHandle,
    pub is_open: bool,
    pub status: StreamStatus,
}

/// Render strategy replacing the built-in log.
pub type LogSlot = Arc<dyn Fn(LogSlotProps) -> AnyView + Send + Sync>;

/// Render strategy filling the actions region.
pub type ActionsSlot = Arc<dyn Fn(ActionsSlotProps) -> AnyView + Send + Sync>;

/// Host-supplied view overrides.
#[derive(Clone, Default)]
pub struct PlayerSlots {
    pub log: Option<LogSlot>,
    pub actions: Option<ActionsSlot>,
}

impl PlayerSlots {
    #[must_use]
    pub fn with_log(
        mut self,
        render: impl Fn(LogSlotProps) -> AnyView + Send + Sync + 'static,
    ) -> Self {
        self.log = Some(Arc::new(render));
        self
    }

    #[must_use]
    pub fn with_actions(
        mut self,
        render: impl Fn(ActionsSlotProps) -> AnyView + Send + Sync + 'static,
    ) -> Self {
        self.actions = Some(Arc::new(render));
        self
    }
}

impl fmt::Debug for PlayerSlots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerSlots")
            .field("log", &self.log.is_some())
            .field("actions", &self.actions.is_some())
            .finish()
    }
}

/// Text shown for one log entry: strings verbatim, anything else as JSON.
#[must_use]
pub fn format_message(message: &Value) -> String {
    match message {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Default scrolling monospaced message log.
#[component]
pub fn StreamLog(
    /// Messages, oldest first.
    messages: Vec<Value>,
) -> impl IntoView {
    let lines = messages
        .iter()
        .map(|message| {
            let text = format_message(message);
            view! { <div class="usp-line" style=LINE_STYLE>{text}</div> }
        })
        .collect_view();

    view! {
        <div class="usp-log" style=LOG_STYLE>
            {lines}
        </div>
    }
}

/// The player's `<video>` element.
#[component]
pub fn PlayerVideo(
    /// Player props supplying playback flags and attribute overrides.
    player: PlayerProps,
) -> impl IntoView {
    let flags = player.effective_playback();
    let attrs = player.video_attrs;
    let class = attrs.class.unwrap_or_else(|| "usp-video".to_string());
    let extra: Vec<AnyAttribute> = attrs
        .extra
        .into_iter()
        .map(|(name, value)| custom_attribute(name, value).into_any_attr())
        .collect();

    view! {
        <video
            class=class
            playsinline=flags.plays_inline
            controls=flags.controls
            autoplay=flags.autoplay
            muted=flags.muted
            poster=attrs.poster
            preload=attrs.preload
            style={VIDEO_STYLE}
            {..extra}
        ></video>
    }
}

/// Full player view.
#[component]
pub fn StreamPlayerView(
    /// Current player props.
    player: PlayerProps,
    /// Observed state to render.
    snapshot: PlayerSnapshot,
    /// Handle passed to the actions slot.
    handle: PlayerHandle,
    /// Host view overrides.
    #[prop(optional)]
    slots: PlayerSlots,
) -> impl IntoView {
    let kind = player.kind;
    let status = snapshot.status;

    let body = if kind.is_media() {
        view! { <PlayerVideo player=player /> }.into_any()
    } else if let Some(log) = slots.log.as_ref() {
        log(LogSlotProps {
            messages: snapshot.messages.clone(),
            status,
            error: snapshot.error.clone(),
        })
    } else {
        view! { <StreamLog messages=snapshot.messages.clone() /> }.into_any()
    };

    let actions = slots.actions.as_ref().map(|actions| {
        actions(ActionsSlotProps {
            handle,
            is_open: snapshot.is_open,
            status,
        })
    });

    view! {
        <div
            class="usp"
            data-stream-type=kind.as_str()
            data-status=status.as_str()
            style=ROOT_STYLE
        >
            {body}
            <div class="usp-actions" style=ACTIONS_STYLE>
                {actions}
            </div>
        </div>
    }
}

impl StreamPlayer {
    /// Render the current state.
    pub fn render(&self, slots: &PlayerSlots) -> AnyView {
        let handle = self.handle();
        let snapshot = handle.snapshot();
        view! {
            <StreamPlayerView
                player=self.props().clone()
                snapshot=snapshot
                handle=handle
                slots=slots.clone()
            />
        }
        .into_any()
    }

    /// Render the current state to an HTML fragment.
    pub fn to_html(&self, slots: &PlayerSlots) -> String {
        self.render(slots).to_html()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::VideoAttrs;
    use crate::stream::{LoopbackFactory, StreamAdapter, StreamConfig, StreamType};
    use serde_json::json;

    fn props(kind: StreamType) -> PlayerProps {
        let mut config = StreamConfig::new();
        config.insert("url".to_string(), json!("https://x"));
        PlayerProps::new(kind, config)
    }

    #[test]
    fn test_format_message() {
        assert_eq!(format_message(&json!("plain text")), "plain text");
        assert_eq!(format_message(&json!(42)), "42");
        assert_eq!(format_message(&json!([1, 2])), "[1,2]");
        assert_eq!(format_message(&json!(null)), "null");
    }

    #[test]
    fn test_stream_log_renders_each_message() {
        let html = view! { <StreamLog messages=vec![json!("first line"), json!([7, 8])] /> }
            .to_html();
        assert!(html.contains("usp-log"));
        assert!(html.contains("first line"));
        assert!(html.contains("[7,8]"));
        assert_eq!(html.matches("usp-line").count(), 2);
    }

    #[test]
    fn test_media_type_renders_video() {
        let player = StreamPlayer::new(
            props(StreamType::Hls).video_attrs(VideoAttrs {
                muted: Some(true),
                poster: Some("/poster.jpg".to_string()),
                ..VideoAttrs::default()
            }),
            Arc::new(LoopbackFactory::new()),
        );

        let html = player.to_html(&PlayerSlots::default());
        assert!(html.contains("<video"));
        assert!(html.contains("controls"));
        assert!(html.contains("playsinline"));
        assert!(html.contains("muted"));
        assert!(!html.contains("autoplay"));
        assert!(html.contains("/poster.jpg"));
        assert!(html.contains("width:100%;border-radius:12px"));
        assert!(!html.contains(";;"));
        assert!(!html.contains("usp-log"));
        assert!(html.contains("usp-actions"));
    }

    #[tokio::test]
    async fn test_text_type_renders_log() {
        let factory = Arc::new(LoopbackFactory::new());
        let mut player = StreamPlayer::new(props(StreamType::Sse), factory.clone());
        player.mount().await.unwrap();
        let stream = factory.latest().unwrap();
        stream.open().await.unwrap();
        stream.push(json!("tick")).unwrap();

        let html = player.to_html(&PlayerSlots::default());
        assert!(!html.contains("<video"));
        assert!(html.contains("usp-log"));
        assert!(html.contains("tick"));
        assert!(html.contains("data-stream-type=\"sse\""));
    }

    #[test]
    fn test_video_renders_extra_attributes() {
        let player = StreamPlayer::new(
            props(StreamType::WebRtc).video_attrs(
                VideoAttrs::default()
                    .attr("crossorigin", "anonymous")
                    .attr("data-track", "main")
                    .attr("aria-label", "Remote camera"),
            ),
            Arc::new(LoopbackFactory::new()),
        );

        let html = player.to_html(&PlayerSlots::default());
        assert!(html.contains("crossorigin=\"anonymous\""));
        assert!(html.contains("data-track=\"main\""));
        assert!(html.contains("aria-label=\"Remote camera\""));
    }

    #[test]
    fn test_custom_slots() {
        let player = StreamPlayer::new(props(StreamType::WebSocket), Arc::new(LoopbackFactory::new()));
        let slots = PlayerSlots::default()
            .with_log(|log| {
                let count = log.messages.len();
                view! { <p class="custom-log">{format!("{count} messages, {}", log.status)}</p> }
                    .into_any()
            })
            .with_actions(|actions| {
                let label = if actions.is_open { "disconnect" } else { "connect" };
                view! { <button class="custom-action">{label}</button> }.into_any()
            });

        let html = player.to_html(&slots);
        assert!(html.contains("custom-log"));
        assert!(html.contains("0 messages, idle"));
        assert!(!html.contains("usp-log"));
        assert!(html.contains("custom-action"));
        assert!(html.contains("connect"));
    }
}
