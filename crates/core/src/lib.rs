//! Playback-synchronisation and cross-video navigation logic.
//!
//! Everything in this crate is pure and I/O-free: the frame index
//! resolver, the coordinate transform, the single-slot explanation cache,
//! the navigation state machine and the embedding similarity used for
//! context association. The orchestration that talks to the network and
//! the host media player lives in `mentor-viewer`.

pub mod error;
pub mod explanation;
pub mod frames;
pub mod navigation;
pub mod similarity;
pub mod transform;
pub mod types;

pub use error::CoreError;
