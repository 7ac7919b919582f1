//! Jump-away / return navigation across independently loaded videos.
//!
//! [`Navigator`] owns the three single-slot pieces of navigation state:
//! the active video identity, the pending seek that waits for a video's
//! metadata, and the depth-1 return context. Every transition is a plain
//! method returning the [`PlayerCommand`] the host player must perform, if
//! any; the caller owns all I/O.
//!
//! | From                  | Event                                | To                     |
//! |-----------------------|--------------------------------------|------------------------|
//! | any                   | `jump_to` other video                | AwaitingTargetMetadata |
//! | any                   | `jump_to` same video, metadata ready | Seeking                |
//! | any                   | `jump_to` same video, not ready      | AwaitingTargetMetadata |
//! | AwaitingTargetMetadata| `metadata_ready` for pending video   | Seeking                |
//! | Seeking               | `playback_started`                   | Idle / ReturnArmed     |
//! | any                   | `select_video` other video           | Idle                   |

use serde::Serialize;

use crate::types::VideoId;

/// Seconds rewound before the origin on return, so the viewer regains
/// context before the point they left.
pub const RETURN_REWIND_SECS: f64 = 5.0;

/// Timestamp to resume at when returning to `origin_timestamp`.
pub fn return_timestamp(origin_timestamp: f64) -> f64 {
    (origin_timestamp - RETURN_REWIND_SECS).max(0.0)
}

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

/// Where the viewer was when a context jump began.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NavigationContext {
    pub origin_video_id: VideoId,
    pub origin_timestamp: f64,
}

/// A seek waiting for `video_id` to report metadata readiness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PendingSeek {
    pub video_id: VideoId,
    pub target_timestamp: f64,
}

/// Externally observable navigation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavState {
    Idle,
    AwaitingTargetMetadata,
    ReturnArmed,
    Seeking,
}

/// Instruction for the host media player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerCommand {
    /// Switch the player's source to another video.
    Load { video_id: VideoId },
    /// Seek the loaded video and start playback.
    SeekAndPlay { video_id: VideoId, timestamp: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Awaiting(PendingSeek),
    Seeking,
}

// ---------------------------------------------------------------------------
// Navigator
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Navigator {
    active_video: VideoId,
    phase: Phase,
    context: Option<NavigationContext>,
}

impl Navigator {
    pub fn new(initial_video: VideoId) -> Self {
        Self {
            active_video: initial_video,
            phase: Phase::Idle,
            context: None,
        }
    }

    pub fn active_video(&self) -> VideoId {
        self.active_video
    }

    pub fn context(&self) -> Option<&NavigationContext> {
        self.context.as_ref()
    }

    pub fn pending_seek(&self) -> Option<&PendingSeek> {
        match &self.phase {
            Phase::Awaiting(pending) => Some(pending),
            _ => None,
        }
    }

    /// Whether the return affordance should be shown.
    pub fn return_armed(&self) -> bool {
        self.context.is_some()
    }

    pub fn state(&self) -> NavState {
        match self.phase {
            Phase::Awaiting(_) => NavState::AwaitingTargetMetadata,
            Phase::Seeking => NavState::Seeking,
            Phase::Idle if self.context.is_some() => NavState::ReturnArmed,
            Phase::Idle => NavState::Idle,
        }
    }

    /// Navigate to `timestamp` on `target`.
    ///
    /// `metadata_ready` reports whether the currently loaded video can be
    /// seeked right now; it only matters when `target` is already active.
    /// Any outstanding pending seek is replaced, never queued.
    pub fn jump_to(
        &mut self,
        target: VideoId,
        timestamp: f64,
        metadata_ready: bool,
    ) -> Option<PlayerCommand> {
        if target == self.active_video {
            if metadata_ready {
                self.phase = Phase::Seeking;
                return Some(PlayerCommand::SeekAndPlay {
                    video_id: target,
                    timestamp,
                });
            }
            self.phase = Phase::Awaiting(PendingSeek {
                video_id: target,
                target_timestamp: timestamp,
            });
            return None;
        }

        self.phase = Phase::Awaiting(PendingSeek {
            video_id: target,
            target_timestamp: timestamp,
        });
        self.active_video = target;
        Some(PlayerCommand::Load { video_id: target })
    }

    /// Record where a context jump leaves from, overwriting any earlier
    /// origin (the return stack is one deep).
    pub fn record_origin(&mut self, origin_video_id: VideoId, origin_timestamp: f64) {
        self.context = Some(NavigationContext {
            origin_video_id,
            origin_timestamp,
        });
    }

    /// The host reports that `video_id` has metadata and can be seeked.
    ///
    /// Applies the pending seek only if it targets that video and that
    /// video is still the active one.
    pub fn metadata_ready(&mut self, video_id: VideoId) -> Option<PlayerCommand> {
        match self.phase {
            Phase::Awaiting(pending)
                if pending.video_id == video_id && video_id == self.active_video =>
            {
                self.phase = Phase::Seeking;
                Some(PlayerCommand::SeekAndPlay {
                    video_id,
                    timestamp: pending.target_timestamp,
                })
            }
            _ => None,
        }
    }

    /// The host reports that playback started.
    pub fn playback_started(&mut self) {
        if self.phase == Phase::Seeking {
            self.phase = Phase::Idle;
        }
    }

    /// Direct viewer selection from the video list.
    ///
    /// Selecting another video cancels any pending seek and silently drops
    /// the return context. Selecting the active video changes nothing.
    pub fn select_video(&mut self, video_id: VideoId) -> Option<PlayerCommand> {
        if video_id == self.active_video {
            return None;
        }
        self.phase = Phase::Idle;
        self.context = None;
        self.active_video = video_id;
        Some(PlayerCommand::Load { video_id })
    }

    /// The viewer asks to go back to where the last context jump began.
    ///
    /// Without a recorded context this only dismisses the affordance.
    pub fn request_return(&mut self, metadata_ready: bool) -> Option<PlayerCommand> {
        let context = self.context.take()?;
        self.jump_to(
            context.origin_video_id,
            return_timestamp(context.origin_timestamp),
            metadata_ready,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn return_timestamp_rewinds_five_seconds() {
        assert_eq!(return_timestamp(42.0), 37.0);
    }

    #[test]
    fn return_timestamp_clamps_at_zero() {
        assert_eq!(return_timestamp(2.0), 0.0);
        assert_eq!(return_timestamp(5.0), 0.0);
    }

    #[test]
    fn jump_same_video_with_metadata_seeks_immediately() {
        let mut nav = Navigator::new(1);
        let cmd = nav.jump_to(1, 12.5, true);
        assert_eq!(
            cmd,
            Some(PlayerCommand::SeekAndPlay {
                video_id: 1,
                timestamp: 12.5
            })
        );
        assert_eq!(nav.state(), NavState::Seeking);

        nav.playback_started();
        assert_eq!(nav.state(), NavState::Idle);
    }

    #[test]
    fn jump_same_video_without_metadata_waits() {
        let mut nav = Navigator::new(1);
        assert_eq!(nav.jump_to(1, 12.5, false), None);
        assert_eq!(nav.state(), NavState::AwaitingTargetMetadata);
        assert_eq!(
            nav.metadata_ready(1),
            Some(PlayerCommand::SeekAndPlay {
                video_id: 1,
                timestamp: 12.5
            })
        );
    }

    #[test]
    fn second_jump_replaces_pending_target() {
        let mut nav = Navigator::new(1);
        nav.jump_to(1, 10.0, false);
        nav.jump_to(1, 20.0, false);
        assert_eq!(nav.pending_seek().map(|p| p.target_timestamp), Some(20.0));

        let cmd = nav.metadata_ready(1);
        assert_eq!(
            cmd,
            Some(PlayerCommand::SeekAndPlay {
                video_id: 1,
                timestamp: 20.0
            })
        );
        // The replaced target never fires.
        assert_eq!(nav.metadata_ready(1), None);
    }

    #[test]
    fn jump_other_video_loads_then_seeks_on_readiness() {
        let mut nav = Navigator::new(1);
        assert_eq!(nav.jump_to(3, 8.0, true), Some(PlayerCommand::Load { video_id: 3 }));
        assert_eq!(nav.active_video(), 3);
        assert_eq!(nav.state(), NavState::AwaitingTargetMetadata);

        assert_eq!(
            nav.metadata_ready(3),
            Some(PlayerCommand::SeekAndPlay {
                video_id: 3,
                timestamp: 8.0
            })
        );
        assert!(nav.pending_seek().is_none());
    }

    #[test]
    fn readiness_of_other_video_is_ignored() {
        let mut nav = Navigator::new(1);
        nav.jump_to(3, 8.0, true);
        assert_eq!(nav.metadata_ready(1), None);
        assert_eq!(nav.state(), NavState::AwaitingTargetMetadata);
    }

    #[test]
    fn sidebar_selection_cancels_pending_seek() {
        let mut nav = Navigator::new(1);
        nav.jump_to(3, 8.0, true);
        assert_eq!(nav.select_video(4), Some(PlayerCommand::Load { video_id: 4 }));

        assert_eq!(nav.metadata_ready(4), None);
        assert_eq!(nav.metadata_ready(3), None);
        assert_eq!(nav.state(), NavState::Idle);
    }

    #[test]
    fn sidebar_selection_drops_return_context() {
        let mut nav = Navigator::new(1);
        nav.record_origin(1, 30.0);
        nav.jump_to(2, 4.0, true);
        nav.metadata_ready(2);
        nav.playback_started();
        assert_eq!(nav.state(), NavState::ReturnArmed);

        nav.select_video(5);
        assert!(nav.context().is_none());
        assert!(!nav.return_armed());
    }

    #[test]
    fn selecting_active_video_is_a_no_op() {
        let mut nav = Navigator::new(2);
        nav.jump_to(2, 9.0, false);
        assert_eq!(nav.select_video(2), None);
        assert!(nav.pending_seek().is_some());
    }

    #[test]
    fn second_context_jump_overwrites_origin() {
        let mut nav = Navigator::new(1);
        nav.record_origin(1, 100.0);
        nav.jump_to(2, 10.0, true);
        nav.record_origin(2, 15.0);
        nav.jump_to(3, 1.0, true);

        assert_eq!(
            nav.context(),
            Some(&NavigationContext {
                origin_video_id: 2,
                origin_timestamp: 15.0
            })
        );
    }

    #[test]
    fn return_to_other_video_rewinds_and_clears_context() {
        let mut nav = Navigator::new(1);
        nav.record_origin(1, 42.0);
        nav.jump_to(2, 10.0, true);
        nav.metadata_ready(2);

        assert_eq!(nav.request_return(true), Some(PlayerCommand::Load { video_id: 1 }));
        assert!(nav.context().is_none());
        assert_eq!(
            nav.metadata_ready(1),
            Some(PlayerCommand::SeekAndPlay {
                video_id: 1,
                timestamp: 37.0
            })
        );
    }

    #[test]
    fn return_within_same_video_seeks_directly() {
        let mut nav = Navigator::new(1);
        nav.record_origin(1, 2.0);
        nav.jump_to(1, 0.5, true);
        nav.playback_started();

        assert_eq!(
            nav.request_return(true),
            Some(PlayerCommand::SeekAndPlay {
                video_id: 1,
                timestamp: 0.0
            })
        );
    }

    #[test]
    fn return_without_context_does_nothing() {
        let mut nav = Navigator::new(1);
        assert_eq!(nav.request_return(true), None);
        assert_eq!(nav.state(), NavState::Idle);
    }
}
