//! Chorus Bot Library
//!
//! Discord front-end for the Chorus playback controller: text commands,
//! yt-dlp resolution, songbird voice output and a health endpoint.
//!
//! This library exposes the components for testing purposes.

pub mod commands;
pub mod config;
pub mod error;
pub mod executor;
pub mod handler;
pub mod health;
pub mod relay;
pub mod replies;
pub mod sources;
pub mod voice;

pub use config::BotConfig;
pub use error::{BotError, Result};
pub use executor::Executor;
pub use handler::Handler;
pub use health::HealthState;
pub use sources::YtDlpResolver;
pub use voice::SongbirdSink;
