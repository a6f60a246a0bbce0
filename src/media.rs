//! Video element model shared with media transports.
//!
//! The player owns exactly one [`VideoElement`] for its whole lifetime. Media
//! adapters receive a clone of the handle and mutate the element in place
//! (playback flags, attached stream) rather than replacing it.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A media stream delivered by a peer connection track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaStream {
    /// Stream identifier.
    pub id: Uuid,
    /// Human-readable label (track or peer name).
    pub label: String,
}

impl MediaStream {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
        }
    }
}

/// Playback flags applied to the video element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackFlags {
    pub autoplay: bool,
    pub controls: bool,
    pub plays_inline: bool,
    pub muted: bool,
}

impl Default for PlaybackFlags {
    fn default() -> Self {
        Self {
            autoplay: false,
            controls: true,
            plays_inline: true,
            muted: false,
        }
    }
}

/// Observable state of the video element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoState {
    pub autoplay: bool,
    pub controls: bool,
    pub plays_inline: bool,
    pub muted: bool,
    /// Stream currently attached as the element's source object.
    pub src_object: Option<MediaStream>,
}

/// Shared handle to the player's video element.
///
/// Clones refer to the same element.
#[derive(Clone, Default)]
pub struct VideoElement {
    inner: Arc<Mutex<VideoState>>,
}

impl VideoElement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply playback flags in place.
    pub fn apply(&self, flags: PlaybackFlags) {
        let mut state = self.inner.lock();
        state.autoplay = flags.autoplay;
        state.controls = flags.controls;
        state.plays_inline = flags.plays_inline;
        state.muted = flags.muted;
    }

    /// Set the element's source object.
    pub fn attach(&self, stream: MediaStream) {
        tracing::debug!(
            name: "video.attach",
            stream_id = %stream.id,
            label = %stream.label,
            "Media stream attached to video element"
        );
        self.inner.lock().src_object = Some(stream);
    }

    /// Detach and return the current source object.
    pub fn detach(&self) -> Option<MediaStream> {
        self.inner.lock().src_object.take()
    }

    pub fn src_object(&self) -> Option<MediaStream> {
        self.inner.lock().src_object.clone()
    }

    pub fn state(&self) -> VideoState {
        self.inner.lock().clone()
    }

    /// Whether both handles refer to the same element.
    pub fn same_element(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for VideoElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VideoElement").field(&*self.inner.lock()).finish()
    }
}

/// Callback invoked by peer-to-peer adapters when a remote track arrives.
pub type TrackHandler = Arc<dyn Fn(MediaStream) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_mutates_shared_element() {
        let video = VideoElement::new();
        let alias = video.clone();

        alias.apply(PlaybackFlags {
            autoplay: true,
            controls: false,
            plays_inline: true,
            muted: true,
        });

        let state = video.state();
        assert!(state.autoplay);
        assert!(!state.controls);
        assert!(state.muted);
        assert!(video.same_element(&alias));
        assert!(!video.same_element(&VideoElement::new()));
    }

    #[test]
    fn test_attach_and_detach() {
        let video = VideoElement::new();
        let stream = MediaStream::new("camera");

        video.attach(stream.clone());
        assert_eq!(video.src_object(), Some(stream.clone()));
        assert_eq!(video.detach(), Some(stream));
        assert!(video.src_object().is_none());
    }
}
