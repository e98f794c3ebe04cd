/// Runs parsed commands against the playback controller
///
/// Voice connections are the gateway handler's job: by the time `Join` or
/// `Play` gets here the bot is already in the author's channel.
use crate::commands::Command;
use crate::replies;
use chorus_catalog::{is_catalog_reference, CatalogAdapter};
use chorus_core::{GuildId, TrackRef};
use chorus_playback::{PlaybackController, PlaybackError, Result};
use std::sync::Arc;

pub struct Executor {
    controller: Arc<PlaybackController>,
    catalog: Arc<CatalogAdapter>,
    prefix: String,
}

impl Executor {
    pub fn new(
        controller: Arc<PlaybackController>,
        catalog: Arc<CatalogAdapter>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            controller,
            catalog,
            prefix: prefix.into(),
        }
    }

    pub fn controller(&self) -> &Arc<PlaybackController> {
        &self.controller
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Run `command` for `guild` and return the reply text
    pub async fn run(&self, guild: GuildId, command: Command) -> Result<String> {
        let controller = &self.controller;

        match command {
            Command::Join => Ok("✅ Joined your voice channel!".to_string()),
            Command::Play(query) => self.play(guild, &query).await,
            Command::Skip => {
                let title = controller.skip(guild).await?;
                Ok(format!("⏭️ Skipped **{}**", title))
            }
            Command::Stop => {
                controller.stop(guild).await?;
                Ok("⏹️ Stopped playback and cleared the queue".to_string())
            }
            Command::Pause => Ok(if controller.pause(guild).await? {
                "⏸️ Paused".to_string()
            } else {
                "⏸️ Already paused".to_string()
            }),
            Command::Resume => Ok(if controller.resume(guild).await? {
                "▶️ Resumed".to_string()
            } else {
                "▶️ Already playing".to_string()
            }),
            Command::Volume(percent) => {
                let percent = controller.set_volume(guild, percent).await?;
                Ok(format!("🔊 Volume set to {}%", percent))
            }
            Command::Effect(effect) => {
                let outcome = controller.set_effect(guild, effect).await?;
                Ok(replies::effect_outcome(effect, &outcome))
            }
            Command::Effects => Ok(replies::effects(controller.effect(guild).await)),
            Command::Repeat(Some(mode)) => {
                controller.set_repeat_mode(guild, mode).await;
                Ok(replies::repeat_mode(mode))
            }
            Command::Repeat(None) => Ok(replies::repeat_mode(
                controller.cycle_repeat_mode(guild).await,
            )),
            Command::NowPlaying => controller
                .now_playing(guild)
                .await
                .map(|now| replies::now_playing(&now))
                .ok_or(PlaybackError::NothingPlaying),
            Command::Queue => Ok(replies::listing(
                "📋 Queue",
                &controller.list_queue(guild).await,
                "📭 The queue is empty",
            )),
            Command::History => Ok(replies::listing(
                "📜 Recently played",
                &controller.list_history(guild).await,
                "📭 Nothing has been played yet",
            )),
            Command::Shuffle => Ok(if controller.shuffle_queue(guild).await {
                "🔀 Shuffled the queue".to_string()
            } else {
                "❌ Need at least two queued tracks to shuffle".to_string()
            }),
            Command::Clear => {
                let cleared = controller.clear_queue(guild).await;
                Ok(format!("🗑️ Cleared {} tracks from the queue", cleared))
            }
            Command::Leave => {
                controller.leave(guild).await?;
                Ok("👋 Left the voice channel".to_string())
            }
            Command::Help => Ok(replies::help(&self.prefix)),
        }
    }

    async fn play(&self, guild: GuildId, query: &str) -> Result<String> {
        let outcome = if is_catalog_reference(query) {
            self.catalog.enqueue(&self.controller, guild, query).await?
        } else {
            self.controller
                .enqueue_or_play(guild, TrackRef::new(query))
                .await?
        };
        Ok(replies::play_outcome(&outcome))
    }
}
