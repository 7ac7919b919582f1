//! Frame index resolution: maps a playback timestamp to the annotated
//! frame whose boxes should be shown.
//!
//! Annotations exist only at sparse keyframes. Resolution always rounds
//! forward to the next annotated frame so the overlay reflects content at
//! or after the paused instant, and falls back to the last annotated
//! frame when playback is past it.

use crate::error::CoreError;
use crate::types::{FrameIndex, FrameMeta};

/// Frame rate assumed when a video's rate is unknown or unusable.
pub const DEFAULT_FPS: f64 = 25.0;

/// Return `fps` if it is a usable frame rate, otherwise `fallback`.
pub fn sanitize_fps(fps: Option<f64>, fallback: f64) -> f64 {
    match fps {
        Some(rate) if rate.is_finite() && rate > 0.0 => rate,
        _ => fallback,
    }
}

/// Frame index at `playback_time` seconds for a `fps` video, rounded down.
pub fn playback_frame(playback_time: f64, fps: f64) -> FrameIndex {
    (playback_time * fps).floor() as FrameIndex
}

// ---------------------------------------------------------------------------
// FrameTable
// ---------------------------------------------------------------------------

/// The annotated frames of one video, strictly ascending by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameTable {
    frames: Vec<FrameMeta>,
}

impl FrameTable {
    /// Build a table, sorting by `frame_index` and keeping only the first
    /// entry for any duplicated index.
    pub fn new(mut frames: Vec<FrameMeta>) -> Self {
        frames.sort_by_key(|f| f.frame_index);
        frames.dedup_by_key(|f| f.frame_index);
        Self { frames }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[FrameMeta] {
        &self.frames
    }

    /// Metadata of the annotated frame with exactly this index.
    pub fn get(&self, frame_index: FrameIndex) -> Option<&FrameMeta> {
        self.frames
            .binary_search_by_key(&frame_index, |f| f.frame_index)
            .ok()
            .map(|i| &self.frames[i])
    }

    /// Resolve the annotated frame for a paused playback position.
    ///
    /// Returns the first frame whose index is not less than
    /// `floor(playback_time * fps)`, or the last frame if every annotated
    /// frame lies before that position.
    pub fn resolve(&self, playback_time: f64, fps: f64) -> Result<&FrameMeta, CoreError> {
        let last = self.frames.last().ok_or(CoreError::NoFramesAvailable)?;
        let current = playback_frame(playback_time, fps);
        let pos = self.frames.partition_point(|f| f.frame_index < current);
        Ok(self.frames.get(pos).unwrap_or(last))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
