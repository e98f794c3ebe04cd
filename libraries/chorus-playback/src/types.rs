//! Core types for playback management

use chorus_core::{EffectMode, GuildId, RepeatMode, TrackRef};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Number of entries shown by queue and history listings
pub const LISTING_LIMIT: usize = 10;

/// Per-guild playback phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackPhase {
    /// No current track, nothing being started
    #[default]
    Idle,

    /// Streaming
    Playing,

    /// Paused mid-track
    Paused,

    /// Between an end-of-track signal (or a start request) and the next stream
    Transitioning,
}

impl PlaybackPhase {
    /// Whether a track is loaded in the transport
    pub fn has_stream(self) -> bool {
        matches!(self, PlaybackPhase::Playing | PlaybackPhase::Paused)
    }
}

/// The in-flight track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentTrack {
    /// Reference as it was requested or queued
    pub reference: TrackRef,

    /// Stable locator used to resolve the same track again
    pub canonical_reference: TrackRef,

    /// Display title
    pub title: String,

    /// Duration (`None` for live streams)
    pub duration: Option<Duration>,

    /// Linear volume (0.0 - 1.0)
    pub volume: f32,
}

/// Snapshot of what a guild is playing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NowPlaying {
    /// Display title
    pub title: String,

    /// Requested reference
    pub reference: TrackRef,

    /// Duration (`None` for live streams)
    pub duration: Option<Duration>,

    /// Volume in percent
    pub volume_percent: u8,

    /// Whether the stream is paused
    pub paused: bool,

    /// Guild repeat mode
    pub repeat: RepeatMode,

    /// Guild effect
    pub effect: EffectMode,
}

/// Display-truncated listing of a queue or history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSnapshot {
    /// First entries in listing order
    pub entries: Vec<TrackRef>,

    /// Total number of entries
    pub total: usize,
}

impl ListSnapshot {
    /// Entries not shown
    pub fn hidden(&self) -> usize {
        self.total.saturating_sub(self.entries.len())
    }

    /// Whether the listing is empty
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Result of an enqueue-or-play request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayOutcome {
    /// Playback started immediately
    Started {
        /// Title of the track now playing
        title: String,
        /// References queued behind it
        queued: usize,
    },

    /// The guild was busy; references were appended
    Queued {
        /// 1-based queue position of the first appended reference
        position: usize,
        /// Number of references appended
        added: usize,
    },

    /// The guild was stopped or reset while resolving; nothing was played
    Discarded,
}

/// Result of an effect change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectOutcome {
    /// The current track was restarted under the new effect
    Restarted {
        /// Title of the restarted track
        title: String,
    },

    /// Nothing was playing; the effect applies to the next track
    Deferred,
}

/// Caller-visible playback notices
///
/// Emitted for transitions that happen outside any command (end of track,
/// skip-ahead), so a front-end can tell the guild what is going on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackNotice {
    /// A new track started
    NowPlaying {
        /// Guild
        guild: GuildId,
        /// Track title
        title: String,
        /// Repeat mode at start
        repeat: RepeatMode,
        /// Effect applied
        effect: EffectMode,
    },

    /// The current track restarted under track repeat
    Repeating {
        /// Guild
        guild: GuildId,
        /// Track title
        title: String,
    },

    /// A reference could not be resolved
    ResolutionFailed {
        /// Guild
        guild: GuildId,
        /// Reference that failed
        reference: TrackRef,
        /// Resolver error message
        cause: String,
    },

    /// Nothing left to play
    QueueFinished {
        /// Guild
        guild: GuildId,
    },

    /// The bot left the guild's voice channel and dropped its state
    Left {
        /// Guild
        guild: GuildId,
    },
}

impl PlaybackNotice {
    /// Guild the notice belongs to
    pub fn guild(&self) -> GuildId {
        match self {
            PlaybackNotice::NowPlaying { guild, .. }
            | PlaybackNotice::Repeating { guild, .. }
            | PlaybackNotice::ResolutionFailed { guild, .. }
            | PlaybackNotice::QueueFinished { guild }
            | PlaybackNotice::Left { guild } => *guild,
        }
    }
}

/// Configuration for the playback controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Maximum history size (default: 20)
    pub history_size: usize,

    /// Volume for a fresh track (0.0 - 1.0, default: 0.5)
    pub default_volume: f32,

    /// Grace period before leaving an empty voice channel (default: 300 s)
    pub idle_timeout: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            history_size: 20,
            default_volume: 0.5,
            idle_timeout: Duration::from_secs(300),
        }
    }
}
