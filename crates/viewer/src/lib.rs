//! Lecture viewer core: pause-time layout overlays, explanations and
//! context jumps, driven by a host media player.

pub mod config;
pub mod driver;
pub mod error;
pub mod events;
pub mod media;
pub mod viewer;

pub use config::ViewerConfig;
pub use error::ViewerError;
pub use events::ViewerEvent;
pub use media::{MediaPlayer, SimulatedPlayer};
pub use viewer::{Overlay, Viewer, ViewerSnapshot};
