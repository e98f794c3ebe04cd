//! Chorus - Playback Management
//!
//! Per-guild queue and playback state machine for the Chorus music bot.
//!
//! This crate provides:
//! - FIFO request queue with shuffle and clear
//! - Bounded playback history
//! - Repeat modes (Off, Track, Queue)
//! - Audio effects applied at stream start
//! - Volume control (0-100%)
//! - Idle auto-leave timers
//!
//! # Architecture
//!
//! `chorus-playback` knows nothing about Discord, yt-dlp or ffmpeg. Track
//! resolution and voice output come in through the [`TrackResolver`] and
//! [`VoiceSink`] traits from `chorus-core`; the bot application provides the
//! real implementations.
//!
//! Each guild gets its own [`GuildMusicState`] behind an async mutex in the
//! [`StateRegistry`]. The [`PlaybackController`] is the only writer.
//!
//! # Example
//!
//! ```rust,no_run
//! use chorus_playback::{PlaybackConfig, PlaybackController, StateRegistry};
//! use chorus_core::{GuildId, TrackRef, TrackResolver, VoiceSink};
//! use std::sync::Arc;
//!
//! # async fn demo(resolver: Arc<dyn TrackResolver>, sink: Arc<dyn VoiceSink>) {
//! let config = PlaybackConfig::default();
//! let registry = Arc::new(StateRegistry::new(config.history_size));
//! let controller = Arc::new(PlaybackController::new(registry, resolver, sink, config));
//! controller.spawn_track_end_dispatcher();
//!
//! let guild = GuildId::new(42);
//! controller
//!     .enqueue_or_play(guild, TrackRef::new("never gonna give you up"))
//!     .await
//!     .ok();
//! # }
//! ```
//!
//! [`TrackResolver`]: chorus_core::TrackResolver
//! [`VoiceSink`]: chorus_core::VoiceSink

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod controller;
mod error;
mod history;
mod idle;
mod queue;
mod registry;
mod state;
pub mod types;
mod volume;

// Public exports
pub use controller::PlaybackController;
pub use error::{PlaybackError, Result};
pub use history::History;
pub use idle::IdleMonitor;
pub use queue::TrackQueue;
pub use registry::{GuildHandle, StateRegistry};
pub use state::{GuildMusicState, NextStep};
pub use types::{
    CurrentTrack, EffectOutcome, ListSnapshot, NowPlaying, PlayOutcome, PlaybackConfig,
    PlaybackNotice, PlaybackPhase, LISTING_LIMIT,
};
pub use volume::Volume;
