//! The host media-playback primitive.
//!
//! [`MediaPlayer`] is the seam to whatever actually decodes and renders
//! video. [`SimulatedPlayer`] is a headless stand-in used by the driver
//! binary and by tests.

use mentor_core::types::{DisplayedSize, VideoId};

/// Operations the viewer needs from the host player.
///
/// Pause, play and metadata readiness are reported to the viewer by the
/// host (`Viewer::on_pause`, `Viewer::on_play`,
/// `Viewer::on_metadata_ready`); calling [`play`](Self::play) does not
/// need to re-enter the viewer.
pub trait MediaPlayer {
    /// Current playback position in seconds.
    fn current_time(&self) -> f64;

    /// Whether the loaded video's metadata is available so it can be seeked.
    fn has_metadata(&self) -> bool;

    /// Rendered pixel size of the video element right now.
    fn displayed_size(&self) -> DisplayedSize;

    /// Replace the player's source. Metadata becomes unavailable until the
    /// host reports readiness again.
    fn load(&mut self, video_id: VideoId, source: Option<&str>);

    fn seek(&mut self, timestamp: f64);

    fn play(&mut self);
}

// ---------------------------------------------------------------------------
// SimulatedPlayer
// ---------------------------------------------------------------------------

/// Headless player whose clock only moves when told to.
#[derive(Debug, Clone)]
pub struct SimulatedPlayer {
    video_id: Option<VideoId>,
    source: Option<String>,
    time: f64,
    playing: bool,
    ready: bool,
    auto_ready: bool,
    size: DisplayedSize,
}

impl SimulatedPlayer {
    /// `auto_ready` makes metadata available immediately after every load.
    pub fn new(size: DisplayedSize, auto_ready: bool) -> Self {
        Self {
            video_id: None,
            source: None,
            time: 0.0,
            playing: false,
            ready: false,
            auto_ready,
            size,
        }
    }

    pub fn video_id(&self) -> Option<VideoId> {
        self.video_id
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Stop playback at `time` seconds.
    pub fn pause_at(&mut self, time: f64) {
        self.time = time.max(0.0);
        self.playing = false;
    }

    /// Deliver the readiness signal for the loaded video.
    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    pub fn resize(&mut self, size: DisplayedSize) {
        self.size = size;
    }
}

impl MediaPlayer for SimulatedPlayer {
    fn current_time(&self) -> f64 {
        self.time
    }

    fn has_metadata(&self) -> bool {
        self.ready
    }

    fn displayed_size(&self) -> DisplayedSize {
        self.size
    }

    fn load(&mut self, video_id: VideoId, source: Option<&str>) {
        self.video_id = Some(video_id);
        self.source = source.map(str::to_owned);
        self.time = 0.0;
        self.playing = false;
        self.ready = self.auto_ready;
    }

    fn seek(&mut self, timestamp: f64) {
        self.time = timestamp.max(0.0);
    }

    fn play(&mut self) {
        self.playing = true;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_resets_position_and_readiness() {
        let mut player = SimulatedPlayer::new(DisplayedSize::new(640.0, 360.0), false);
        player.mark_ready();
        player.seek(12.0);
        player.play();

        player.load(3, Some("media/3.mp4"));
        assert_eq!(player.video_id(), Some(3));
        assert_eq!(player.source(), Some("media/3.mp4"));
        assert_eq!(player.current_time(), 0.0);
        assert!(!player.is_playing());
        assert!(!player.has_metadata());
    }

    #[test]
    fn auto_ready_player_has_metadata_after_load() {
        let mut player = SimulatedPlayer::new(DisplayedSize::new(640.0, 360.0), true);
        player.load(1, None);
        assert!(player.has_metadata());
    }

    #[test]
    fn pause_at_clamps_negative_time() {
        let mut player = SimulatedPlayer::new(DisplayedSize::new(640.0, 360.0), true);
        player.pause_at(-3.0);
        assert_eq!(player.current_time(), 0.0);
    }
}
