/// Bot error types
use chorus_core::CatalogError;
use chorus_playback::PlaybackError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BotError>;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Gateway error: {0}")]
    Gateway(#[from] serenity::Error),

    #[error("Voice error: {0}")]
    Voice(String),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for BotError {
    fn from(err: config::ConfigError) -> Self {
        BotError::Config(err.to_string())
    }
}

impl From<songbird::error::JoinError> for BotError {
    fn from(err: songbird::error::JoinError) -> Self {
        BotError::Voice(err.to_string())
    }
}
