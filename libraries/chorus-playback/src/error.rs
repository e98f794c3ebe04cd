//! Error types for playback management

use chorus_core::{ResolveError, TrackRef, UnknownName, VoiceError};
use thiserror::Error;

/// Playback errors
///
/// Every variant is recoverable at the command boundary; none of them leave
/// another guild's state touched.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The resolver could not produce a stream for a reference
    #[error("Could not play {reference}: {cause}")]
    ResolutionFailed {
        /// Reference that failed
        reference: TrackRef,
        /// Resolver error
        cause: ResolveError,
    },

    /// A control command needs an active track
    #[error("Nothing is playing")]
    NothingPlaying,

    /// Out-of-range value or unknown name
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Catalog expansion is not configured or the reference was not recognised
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// The command needs a voice connection
    #[error("Not in a voice channel")]
    NotInVoiceChannel,

    /// Voice transport rejected a command
    #[error("Voice error: {0}")]
    Voice(String),
}

impl From<VoiceError> for PlaybackError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::NotConnected => PlaybackError::NotInVoiceChannel,
            VoiceError::Transport(msg) => PlaybackError::Voice(msg),
        }
    }
}

impl From<UnknownName> for PlaybackError {
    fn from(err: UnknownName) -> Self {
        PlaybackError::InvalidArgument(err.to_string())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
