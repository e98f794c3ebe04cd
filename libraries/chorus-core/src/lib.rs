//! Chorus Core
//!
//! Types, collaborator traits, and error handling shared by every Chorus crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `GuildId`, `TrackRef`, `ResolvedTrack`, `EffectMode`, `RepeatMode`
//! - **Collaborator Traits**: `TrackResolver`, `VoiceSink`, `CatalogExpander`
//! - **Error Handling**: `ResolveError`, `VoiceError`, `CatalogError`
//!
//! The traits describe everything the playback state machine needs from the
//! outside world. Concrete implementations (yt-dlp, songbird, Spotify) live in
//! the application and catalog crates.
//!
//! # Example
//!
//! ```rust
//! use chorus_core::{EffectMode, GuildId, RepeatMode};
//!
//! let guild = GuildId::new(42);
//! let effect: EffectMode = "nightcore".parse().unwrap();
//! let repeat: RepeatMode = "queue".parse().unwrap();
//!
//! assert_eq!(guild.get(), 42);
//! assert_eq!(effect.ffmpeg_filter(), Some("asetrate=44100*1.25,atempo=1.25"));
//! assert_eq!(repeat, RepeatMode::Queue);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{CatalogError, ResolveError, UnknownName, VoiceError};
pub use traits::{CatalogExpander, TrackEndNotifier, TrackEnded, TrackResolver, VoiceSink};
pub use types::{
    CatalogTrack, CollectionKind, EffectMode, GuildId, PlaybackToken, RepeatMode, ResolvedTrack,
    StreamHandle, TrackRef,
};
