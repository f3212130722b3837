//! Aggregated error type returned by [`crate::EditorSession`] entry points.

use thiserror::Error;

use crate::{
    app_dirs::AppDirError,
    audio::{DecodeError, EncodeError},
    config::ConfigError,
    editor::FilterError,
    logging::LoggingError,
    playback::PlaybackError,
};

/// Coarse grouping of [`EditorError`] for user-facing messaging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The file could not be read or understood.
    Decode,
    /// Writing to disk failed.
    Io,
    /// An edit could not be computed; the buffer is unchanged.
    Edit,
    /// The audio device refused playback.
    Playback,
    /// Settings, log, or app directories could not be prepared.
    Environment,
    /// The request needs state that is not present, such as a loaded file.
    State,
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Playback(#[from] PlaybackError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error(transparent)]
    AppDir(#[from] AppDirError),
    #[error("No audio loaded")]
    NoAudioLoaded,
}

impl EditorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EditorError::Decode(_) => ErrorCategory::Decode,
            EditorError::Encode(_) => ErrorCategory::Io,
            EditorError::Filter(_) => ErrorCategory::Edit,
            EditorError::Playback(_) => ErrorCategory::Playback,
            EditorError::Config(_) | EditorError::Logging(_) | EditorError::AppDir(_) => {
                ErrorCategory::Environment
            }
            EditorError::NoAudioLoaded => ErrorCategory::State,
        }
    }
}
