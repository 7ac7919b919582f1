//! Line-oriented command interface for the headless viewer binary.

use std::str::FromStr;

use mentor_core::types::{BoxId, DisplayedSize, VideoId};
use mentor_services::LectureService;

use crate::error::ViewerError;
use crate::media::{MediaPlayer, SimulatedPlayer};
use crate::viewer::{Viewer, ViewerSnapshot};

/// One line of driver input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Pause the simulated player at the given time (seconds).
    Pause(f64),
    Play,
    /// Deliver the metadata-ready signal.
    Ready,
    Resize(f64, f64),
    Select(VideoId),
    Videos,
    Hover(Option<BoxId>),
    Explain(BoxId),
    Context(BoxId),
    Dismiss,
    Return,
    State,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Missing argument <{0}>")]
    MissingArgument(&'static str),

    #[error("Invalid <{name}>: {value:?}")]
    InvalidArgument { name: &'static str, value: String },

    /// The box is not part of the published overlay.
    #[error("Box {0} is not in the current overlay")]
    UnknownBox(BoxId),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(CommandError::Empty)?;
        let command = match name.to_ascii_lowercase().as_str() {
            "pause" => Command::Pause(arg(&mut words, "time")?),
            "play" => Command::Play,
            "ready" => Command::Ready,
            "resize" => Command::Resize(arg(&mut words, "width")?, arg(&mut words, "height")?),
            "select" => Command::Select(arg(&mut words, "video_id")?),
            "videos" => Command::Videos,
            "hover" => match words.next() {
                None => return Err(CommandError::MissingArgument("box_id")),
                Some("none") => Command::Hover(None),
                Some(raw) => Command::Hover(Some(parse(raw, "box_id")?)),
            },
            "explain" => Command::Explain(arg(&mut words, "box_id")?),
            "context" => Command::Context(arg(&mut words, "box_id")?),
            "dismiss" => Command::Dismiss,
            "return" => Command::Return,
            "state" => Command::State,
            "quit" | "exit" => Command::Quit,
            _ => return Err(CommandError::Unknown(name.to_string())),
        };
        Ok(command)
    }
}

fn arg<'a, T: FromStr>(
    words: &mut impl Iterator<Item = &'a str>,
    name: &'static str,
) -> Result<T, CommandError> {
    let raw = words.next().ok_or(CommandError::MissingArgument(name))?;
    parse(raw, name)
}

fn parse<T: FromStr>(raw: &str, name: &'static str) -> Result<T, CommandError> {
    raw.parse().map_err(|_| CommandError::InvalidArgument {
        name,
        value: raw.to_string(),
    })
}

/// What the driver loop should do after a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Continue,
    Snapshot(Box<ViewerSnapshot>),
    Quit,
}

/// Apply one command to a viewer backed by a [`SimulatedPlayer`].
///
/// Viewer failures are already logged by the viewer and do not stop the
/// driver; they are only traced here at debug level.
pub async fn dispatch<S: LectureService>(
    viewer: &mut Viewer<S, SimulatedPlayer>,
    command: Command,
) -> Result<Outcome, CommandError> {
    let result: Result<(), ViewerError> = match command {
        Command::Pause(time) => {
            viewer.player_mut().pause_at(time);
            viewer.on_pause().await
        }
        Command::Play => {
            viewer.player_mut().play();
            viewer.on_play();
            Ok(())
        }
        Command::Ready => {
            viewer.player_mut().mark_ready();
            viewer.on_metadata_ready();
            Ok(())
        }
        Command::Resize(width, height) => {
            viewer
                .player_mut()
                .resize(DisplayedSize::new(width, height));
            Ok(())
        }
        Command::Select(video_id) => viewer.select_video(video_id).await,
        Command::Videos => viewer.load_video_list().await,
        Command::Hover(box_id) => {
            viewer.hover_box(box_id);
            Ok(())
        }
        Command::Explain(box_id) => {
            let coordinate = overlay_coordinate(viewer, box_id)?;
            viewer
                .request_explanation(box_id, coordinate, true)
                .await
                .map(|_| ())
        }
        Command::Context(box_id) => {
            let coordinate = overlay_coordinate(viewer, box_id)?;
            let timestamp = viewer.player().current_time();
            viewer
                .handle_show_context(box_id, coordinate, timestamp)
                .await
        }
        Command::Dismiss => {
            viewer.dismiss_explanation();
            Ok(())
        }
        Command::Return => viewer.on_return_requested().await,
        Command::State => return Ok(Outcome::Snapshot(Box::new(viewer.snapshot()))),
        Command::Quit => return Ok(Outcome::Quit),
    };

    if let Err(e) = result {
        tracing::debug!(?command, error = %e, "Command had no effect");
    }
    Ok(Outcome::Continue)
}

fn overlay_coordinate<S: LectureService>(
    viewer: &Viewer<S, SimulatedPlayer>,
    box_id: BoxId,
) -> Result<mentor_core::types::BoxCoordinate, CommandError> {
    viewer
        .overlay()
        .and_then(|o| o.get(box_id))
        .map(|b| b.coordinate)
        .ok_or(CommandError::UnknownBox(box_id))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
