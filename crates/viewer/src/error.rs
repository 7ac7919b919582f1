use mentor_core::CoreError;
use mentor_services::ServiceError;

/// Failures of viewer operations.
///
/// Remote failures are logged where they happen and leave viewer state
/// untouched; callers may ignore them without losing consistency.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("Failed to fetch video metadata: {0}")]
    MetadataFetch(#[source] ServiceError),

    #[error("Failed to fetch annotations: {0}")]
    AnnotationFetch(#[source] ServiceError),

    #[error("Failed to fetch explanation: {0}")]
    ExplanationFetch(#[source] ServiceError),

    #[error("Failed to fetch context association: {0}")]
    AssociationFetch(#[source] ServiceError),

    /// The active video has no annotated frames (yet).
    #[error("No annotated frames available")]
    NoFramesAvailable,

    #[error("Layout cannot be displayed: {0}")]
    InvalidLayout(#[source] CoreError),

    /// A response arrived after newer state replaced the request it
    /// answers; it was discarded.
    #[error("Response superseded by newer state")]
    Superseded,
}

impl From<CoreError> for ViewerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NoFramesAvailable => Self::NoFramesAvailable,
            other => Self::InvalidLayout(other),
        }
    }
}
