//! Guild state registry
//!
//! One owned registry per process, passed to whoever needs it. Each guild's
//! state sits behind its own async mutex, which is the per-guild
//! serialization point for every playback operation.

use crate::state::GuildMusicState;
use chorus_core::{GuildId, PlaybackToken};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Mutex as AsyncMutex;
use tracing::info;

/// Shared handle to one guild's state
pub type GuildHandle = Arc<AsyncMutex<GuildMusicState>>;

/// Process-wide guild -> state mapping
#[derive(Debug)]
pub struct StateRegistry {
    guilds: Mutex<HashMap<GuildId, GuildHandle>>,
    history_size: usize,
    next_token: AtomicU64,
}

impl StateRegistry {
    /// Create an empty registry whose states keep `history_size` entries
    pub fn new(history_size: usize) -> Self {
        Self {
            guilds: Mutex::new(HashMap::new()),
            history_size,
            next_token: AtomicU64::new(1),
        }
    }

    fn guilds(&self) -> MutexGuard<'_, HashMap<GuildId, GuildHandle>> {
        // The map is only ever touched by short insert/remove/lookup sections
        self.guilds.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// State for `guild`, created with defaults on first access
    pub fn get_or_create(&self, guild: GuildId) -> GuildHandle {
        let history_size = self.history_size;
        Arc::clone(
            self.guilds()
                .entry(guild)
                .or_insert_with(|| Arc::new(AsyncMutex::new(GuildMusicState::new(history_size)))),
        )
    }

    /// State for `guild` if it exists
    pub fn get(&self, guild: GuildId) -> Option<GuildHandle> {
        self.guilds().get(&guild).cloned()
    }

    /// Drop all state for `guild`
    ///
    /// The removed state is also reset in place, so anyone still holding the
    /// handle (an in-flight resolution) sees its token revoked and discards
    /// its result. Safe to call for unknown guilds; returns whether state
    /// existed.
    pub async fn teardown(&self, guild: GuildId) -> bool {
        let removed = self.guilds().remove(&guild);
        match removed {
            Some(handle) => {
                handle.lock().await.reset();
                info!("Guild {} state cleared", guild);
                true
            }
            None => false,
        }
    }

    /// Fresh token for a stream start, unique for the process lifetime
    pub fn issue_token(&self) -> PlaybackToken {
        PlaybackToken::new(self.next_token.fetch_add(1, Ordering::Relaxed))
    }

    /// Number of guilds with state
    pub fn len(&self) -> usize {
        self.guilds().len()
    }

    /// Whether no guild has state
    pub fn is_empty(&self) -> bool {
        self.guilds().is_empty()
    }

    /// Whether `guild` has state
    pub fn contains(&self, guild: GuildId) -> bool {
        self.guilds().contains_key(&guild)
    }
}

impl Default for StateRegistry {
    fn default() -> Self {
        Self::new(20)
    }
}
