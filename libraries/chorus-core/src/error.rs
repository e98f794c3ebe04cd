/// Error types for the external collaborators
use thiserror::Error;

/// Track resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Nothing matched the search term or the locator is dead
    #[error("No results for {0}")]
    NotFound(String),

    /// The resolver could not run or returned garbage
    #[error("Resolver failed: {0}")]
    Failed(String),
}

impl ResolveError {
    /// Create a resolver failure
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

/// Voice transport errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoiceError {
    /// No voice connection exists for the guild
    #[error("Not connected to a voice channel")]
    NotConnected,

    /// The transport rejected the command
    #[error("Voice transport error: {0}")]
    Transport(String),
}

impl VoiceError {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

/// Catalog expansion errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Expander not configured (e.g. missing credentials)
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    /// The reference is not a playlist, album, or track
    #[error("Unsupported catalog reference: {0}")]
    Unsupported(String),

    /// The catalog service returned an error
    #[error("Catalog request failed: {0}")]
    Request(String),
}

/// A name that does not match any known mode
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind}: {name}")]
pub struct UnknownName {
    /// What was being parsed ("effect", "repeat mode")
    pub kind: &'static str,

    /// The rejected input
    pub name: String,
}

impl UnknownName {
    /// Create an unknown-name error
    pub fn new(kind: &'static str, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}
