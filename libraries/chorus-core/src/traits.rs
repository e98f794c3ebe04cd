//! Collaborator traits
//!
//! The playback controller talks to the outside world only through these.

use crate::error::{CatalogError, ResolveError, VoiceError};
use crate::types::{
    CatalogTrack, CollectionKind, EffectMode, GuildId, PlaybackToken, ResolvedTrack, StreamHandle,
    TrackRef,
};
use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Turns a track reference into a playable stream
#[async_trait]
pub trait TrackResolver: Send + Sync {
    /// Resolve a locator or free-text search (first match) under `effect`
    ///
    /// # Errors
    /// Returns an error if nothing matches or the resolver cannot run
    async fn resolve(
        &self,
        reference: &TrackRef,
        effect: EffectMode,
    ) -> Result<ResolvedTrack, ResolveError>;
}

/// End-of-track signal for one `play` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackEnded {
    /// Guild whose stream ended
    pub guild: GuildId,

    /// Token of the play that ended
    pub token: PlaybackToken,
}

/// Callback handed to `VoiceSink::play`
///
/// Clones share one "fired" flag: however many transport events a sink wires
/// to it (end, error), the signal is delivered at most once.
#[derive(Clone)]
pub struct TrackEndNotifier {
    event: TrackEnded,
    fired: Arc<AtomicBool>,
    dispatch: Arc<dyn Fn(TrackEnded) + Send + Sync>,
}

impl TrackEndNotifier {
    /// Create a notifier that forwards to `dispatch`
    pub fn new(
        guild: GuildId,
        token: PlaybackToken,
        dispatch: Arc<dyn Fn(TrackEnded) + Send + Sync>,
    ) -> Self {
        Self {
            event: TrackEnded { guild, token },
            fired: Arc::new(AtomicBool::new(false)),
            dispatch,
        }
    }

    /// Deliver the signal; later calls are ignored
    pub fn notify(&self) {
        if !self.fired.swap(true, Ordering::AcqRel) {
            (self.dispatch)(self.event);
        }
    }

    /// Whether the signal was already delivered
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    /// The signal this notifier carries
    pub fn event(&self) -> TrackEnded {
        self.event
    }
}

impl fmt::Debug for TrackEndNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackEndNotifier")
            .field("event", &self.event)
            .field("fired", &self.has_fired())
            .finish()
    }
}

/// Voice transport for all guilds
///
/// At most one stream per guild. `play` replaces nothing: callers stop the
/// previous stream first.
#[async_trait]
pub trait VoiceSink: Send + Sync {
    /// Start streaming; `on_ended` fires once when the stream finishes or is stopped
    async fn play(
        &self,
        guild: GuildId,
        stream: StreamHandle,
        on_ended: TrackEndNotifier,
    ) -> Result<(), VoiceError>;

    /// Stop the current stream
    async fn stop(&self, guild: GuildId) -> Result<(), VoiceError>;

    /// Pause the current stream
    async fn pause(&self, guild: GuildId) -> Result<(), VoiceError>;

    /// Resume a paused stream
    async fn resume(&self, guild: GuildId) -> Result<(), VoiceError>;

    /// Whether a stream is actively playing
    async fn is_playing(&self, guild: GuildId) -> bool;

    /// Whether a stream is paused
    async fn is_paused(&self, guild: GuildId) -> bool;

    /// Set stream volume (0.0 - 1.0)
    async fn set_volume(&self, guild: GuildId, volume: f32) -> Result<(), VoiceError>;

    /// Leave the guild's voice channel
    async fn disconnect(&self, guild: GuildId) -> Result<(), VoiceError>;
}

/// Lists the tracks of an external catalog collection
#[async_trait]
pub trait CatalogExpander: Send + Sync {
    /// Ordered entries of a collection
    ///
    /// `None` entries are items the catalog returned without track data
    /// (removed or local files in a playlist).
    ///
    /// # Errors
    /// Returns `CatalogError::Unavailable` when the expander is not configured
    async fn list_tracks(
        &self,
        kind: CollectionKind,
        id: &str,
    ) -> Result<Vec<Option<CatalogTrack>>, CatalogError>;
}
