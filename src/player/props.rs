//! Player properties and reconciliation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::media::PlaybackFlags;
use crate::stream::{StreamConfig, StreamType};

/// Default number of messages kept in the log.
pub const DEFAULT_LOG_LIMIT: usize = 500;

/// Inbound configuration of a [`StreamPlayer`](super::StreamPlayer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProps {
    /// Transport to instantiate.
    #[serde(rename = "type")]
    pub kind: StreamType,
    /// Transport-specific configuration.
    #[serde(default)]
    pub config: StreamConfig,
    /// Open the stream as soon as it is bound.
    #[serde(default)]
    pub auto_open: bool,
    #[serde(default)]
    pub autoplay: bool,
    #[serde(default = "default_true")]
    pub controls: bool,
    #[serde(default = "default_true")]
    pub plays_inline: bool,
    #[serde(default)]
    pub muted: bool,
    /// Maximum messages retained in the log.
    #[serde(default = "default_log_limit")]
    pub log_limit: usize,
    /// Attribute overrides for the rendered video element.
    #[serde(default)]
    pub video_attrs: VideoAttrs,
}

fn default_true() -> bool {
    true
}

fn default_log_limit() -> usize {
    DEFAULT_LOG_LIMIT
}

impl PlayerProps {
    /// Props with defaults for everything except the transport and its config.
    pub fn new(kind: StreamType, config: StreamConfig) -> Self {
        Self {
            kind,
            config,
            auto_open: false,
            autoplay: false,
            controls: true,
            plays_inline: true,
            muted: false,
            log_limit: DEFAULT_LOG_LIMIT,
            video_attrs: VideoAttrs::default(),
        }
    }

    #[must_use]
    pub fn auto_open(mut self, auto_open: bool) -> Self {
        self.auto_open = auto_open;
        self
    }

    #[must_use]
    pub fn log_limit(mut self, log_limit: usize) -> Self {
        self.log_limit = log_limit;
        self
    }

    #[must_use]
    pub fn playback(mut self, flags: PlaybackFlags) -> Self {
        self.autoplay = flags.autoplay;
        self.controls = flags.controls;
        self.plays_inline = flags.plays_inline;
        self.muted = flags.muted;
        self
    }

    #[must_use]
    pub fn video_attrs(mut self, video_attrs: VideoAttrs) -> Self {
        self.video_attrs = video_attrs;
        self
    }

    /// Playback flags as given by the props.
    pub fn playback_flags(&self) -> PlaybackFlags {
        PlaybackFlags {
            autoplay: self.autoplay,
            controls: self.controls,
            plays_inline: self.plays_inline,
            muted: self.muted,
        }
    }

    /// Playback flags after applying `video_attrs` overrides.
    pub fn effective_playback(&self) -> PlaybackFlags {
        let attrs = &self.video_attrs;
        PlaybackFlags {
            autoplay: attrs.autoplay.unwrap_or(self.autoplay),
            controls: attrs.controls.unwrap_or(self.controls),
            plays_inline: attrs.plays_inline.unwrap_or(self.plays_inline),
            muted: attrs.muted.unwrap_or(self.muted),
        }
    }
}

/// Pass-through attributes for the `<video>` element.
///
/// Set fields win over the matching player props. Any other key (`loop`,
/// `crossorigin`, `aria-*`, `data-*`, ...) lands in `extra` and is rendered
/// verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoAttrs {
    pub autoplay: Option<bool>,
    pub controls: Option<bool>,
    pub plays_inline: Option<bool>,
    pub muted: Option<bool>,
    pub poster: Option<String>,
    pub preload: Option<String>,
    pub class: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl VideoAttrs {
    /// Add an arbitrary attribute.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}

/// Outcome of comparing two sets of props.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconcile {
    /// The bound adapter stays; other prop changes apply in place.
    Keep,
    /// Transport type or config changed; the adapter must be recreated.
    Recreate,
}

impl Reconcile {
    pub fn requires_recreation(self) -> bool {
        self == Self::Recreate
    }
}

/// Decide whether moving from `prev` to `next` needs a new adapter.
///
/// Keyed on deep value equality of the transport type and config, so an
/// equivalent but freshly built config does not trigger recreation.
pub fn reconcile(prev: &PlayerProps, next: &PlayerProps) -> Reconcile {
    if prev.kind != next.kind || prev.config != next.config {
        Reconcile::Recreate
    } else {
        Reconcile::Keep
    }
}
