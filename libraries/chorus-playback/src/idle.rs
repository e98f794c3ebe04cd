//! Auto-leave when the bot is alone in a voice channel

use crate::controller::PlaybackController;
use chorus_core::GuildId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

type Timers = Arc<Mutex<HashMap<GuildId, (u64, JoinHandle<()>)>>>;

/// Per-guild idle timers
///
/// Call [`membership_changed`](Self::membership_changed) whenever the
/// membership of the bot's voice channel changes. While the bot is alone a
/// timer runs; when it fires the guild is left via
/// [`PlaybackController::leave`]. Any change before then restarts or cancels
/// the timer.
pub struct IdleMonitor {
    controller: Arc<PlaybackController>,
    timeout: Duration,
    timers: Timers,
    next_generation: Mutex<u64>,
}

impl IdleMonitor {
    /// Create a monitor that leaves after `timeout` alone
    pub fn new(controller: Arc<PlaybackController>, timeout: Duration) -> Self {
        Self {
            controller,
            timeout,
            timers: Arc::new(Mutex::new(HashMap::new())),
            next_generation: Mutex::new(0),
        }
    }

    fn timers(&self) -> MutexGuard<'_, HashMap<GuildId, (u64, JoinHandle<()>)>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Idle timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Record the bot's voice channel membership for `guild`
    pub fn membership_changed(&self, guild: GuildId, bot_alone: bool) {
        if bot_alone {
            self.arm(guild);
        } else if self.cancel(guild) {
            debug!("Guild {}: idle timer cancelled", guild);
        }
    }

    /// Start (or restart) the idle timer for `guild`
    pub fn arm(&self, guild: GuildId) {
        let generation = {
            let mut next = self
                .next_generation
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            *next += 1;
            *next
        };

        let controller = Arc::clone(&self.controller);
        let timers = Arc::clone(&self.timers);
        let timeout = self.timeout;

        // Held until the new timer is registered, so it cannot fire unregistered
        let mut registered = self.timers();
        let task = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;

            {
                let mut timers = timers.lock().unwrap_or_else(PoisonError::into_inner);
                // Replaced by a newer timer in the meantime
                if timers.get(&guild).map(|(g, _)| *g) != Some(generation) {
                    return;
                }
                timers.remove(&guild);
            }

            info!("Guild {}: alone for {:?}, leaving", guild, timeout);
            if let Err(err) = controller.leave(guild).await {
                warn!("Guild {}: idle leave failed: {}", guild, err);
            }
        });

        if let Some((_, previous)) = registered.insert(guild, (generation, task)) {
            previous.abort();
        }
        drop(registered);
        debug!("Guild {}: idle timer armed for {:?}", guild, self.timeout);
    }

    /// Cancel the idle timer for `guild`; returns false if none was running
    pub fn cancel(&self, guild: GuildId) -> bool {
        match self.timers().remove(&guild) {
            Some((_, task)) => {
                task.abort();
                true
            }
            None => false,
        }
    }

    /// Whether an idle timer is running for `guild`
    pub fn is_armed(&self, guild: GuildId) -> bool {
        self.timers().contains_key(&guild)
    }
}

impl Drop for IdleMonitor {
    fn drop(&mut self) {
        for (_, (_, task)) in self.timers().drain() {
            task.abort();
        }
    }
}
