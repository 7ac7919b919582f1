//! Viewer events published to the presentation layer.
//!
//! Every change of what the viewer should render (overlay, hover,
//! explanation panel, return affordance) or of the host player's source
//! and position is announced as a [`ViewerEvent`] on an [`EventBus`].

use serde::Serialize;
use tokio::sync::broadcast;

use mentor_core::types::{AnnotationBox, BoxId, FrameIndex, VideoEntry, VideoId};

/// A presentation-level change produced by the viewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ViewerEvent {
    /// The sidebar list of lecture videos was (re)loaded.
    VideoListLoaded { videos: Vec<VideoEntry> },

    /// The player switched to another video.
    VideoSelected {
        video_id: VideoId,
        source: Option<String>,
    },

    /// Frame rate and annotated-frame metadata of a video are in place.
    MetadataLoaded {
        video_id: VideoId,
        fps: f64,
        annotated_frames: usize,
    },

    /// Boxes to draw over the paused video, in displayed pixels.
    OverlayPublished {
        video_id: VideoId,
        frame_index: FrameIndex,
        boxes: Vec<AnnotationBox>,
    },

    /// The overlay must no longer be drawn.
    OverlayCleared,

    HoverChanged { box_id: Option<BoxId> },

    /// The explanation text or the panel visibility changed.
    ExplanationUpdated {
        box_id: BoxId,
        text: String,
        panel_visible: bool,
    },

    /// The mentor panel was closed and its explanation forgotten.
    ExplanationDismissed,

    /// The player was seeked and playback started.
    SeekApplied { video_id: VideoId, timestamp: f64 },

    /// Show or hide the "return to where I was" control.
    ReturnAffordance { visible: bool },
}

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// Fan-out channel for [`ViewerEvent`]s.
pub struct EventBus {
    sender: broadcast::Sender<ViewerEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// Slow receivers observe `RecvError::Lagged` once the buffer is full.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: ViewerEvent) {
        // A send error only means there are no subscribers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewerEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
