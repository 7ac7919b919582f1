#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    /// The active video has no annotated frames (yet). Not a remote failure.
    #[error("No annotated frames available")]
    NoFramesAvailable,

    #[error("Validation failed: {0}")]
    Validation(String),
}
