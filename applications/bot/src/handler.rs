/// Discord gateway event handler
use crate::commands::{self, Command};
use crate::executor::Executor;
use crate::health::HealthState;
use crate::relay::NoticeChannels;
use crate::replies;
use chorus_core::GuildId;
use chorus_playback::{IdleMonitor, PlaybackError};
use serenity::async_trait;
use serenity::gateway::ActivityData;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::id::{ChannelId, GuildId as DiscordGuildId, UserId};
use serenity::model::voice::VoiceState;
use serenity::prelude::{Context, EventHandler};
use songbird::Songbird;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct Handler {
    executor: Executor,
    monitor: Arc<IdleMonitor>,
    songbird: Arc<Songbird>,
    channels: NoticeChannels,
    health: HealthState,
}

impl Handler {
    pub fn new(
        executor: Executor,
        monitor: Arc<IdleMonitor>,
        songbird: Arc<Songbird>,
        channels: NoticeChannels,
        health: HealthState,
    ) -> Self {
        Self {
            executor,
            monitor,
            songbird,
            channels,
            health,
        }
    }

    async fn handle(
        &self,
        ctx: &Context,
        msg: &Message,
        guild_id: DiscordGuildId,
        command: Command,
    ) -> Result<String, PlaybackError> {
        let guild = GuildId::new(guild_id.get());

        match &command {
            Command::Join => self.join(ctx, guild_id, msg.author.id).await?,
            Command::Play(_) if self.songbird.get(guild_id).is_none() => {
                self.join(ctx, guild_id, msg.author.id).await?;
            }
            _ => {}
        }

        let leaving = command == Command::Leave;
        let reply = self.executor.run(guild, command).await?;
        if leaving {
            self.monitor.cancel(guild);
        }
        Ok(reply)
    }

    /// Join the voice channel `user` is in
    async fn join(
        &self,
        ctx: &Context,
        guild_id: DiscordGuildId,
        user: UserId,
    ) -> Result<(), PlaybackError> {
        let channel =
            author_voice_channel(ctx, guild_id, user).ok_or(PlaybackError::NotInVoiceChannel)?;

        self.songbird
            .join(guild_id, channel)
            .await
            .map_err(|e| PlaybackError::Voice(e.to_string()))?;
        info!("Joined voice channel {} in guild {}", channel, guild_id);

        // The author is in there with us
        self.monitor
            .membership_changed(GuildId::new(guild_id.get()), false);
        Ok(())
    }
}

/// Voice channel `user` is connected to, from the cache
fn author_voice_channel(ctx: &Context, guild_id: DiscordGuildId, user: UserId) -> Option<ChannelId> {
    let guild = ctx.cache.guild(guild_id)?;
    guild.voice_states.get(&user).and_then(|state| state.channel_id)
}

/// Human listeners in `channel`, `None` if the guild is not cached
fn listeners(
    ctx: &Context,
    guild_id: DiscordGuildId,
    channel: ChannelId,
    bot: UserId,
) -> Option<usize> {
    let guild = ctx.cache.guild(guild_id)?;
    let count = guild
        .voice_states
        .values()
        .filter(|state| state.channel_id == Some(channel) && state.user_id != bot)
        .filter(|state| !state.member.as_ref().is_some_and(|m| m.user.bot))
        .count();
    Some(count)
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected", ready.user.name);
        ctx.set_activity(Some(ActivityData::listening(format!(
            "{}mhelp",
            self.executor.prefix()
        ))));
        self.health.set_ready(ready.user.tag()).await;
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        let Some(guild_id) = msg.guild_id else {
            return;
        };
        let Some(parsed) = commands::parse(self.executor.prefix(), &msg.content) else {
            return;
        };

        let guild = GuildId::new(guild_id.get());
        self.channels.remember(guild, msg.channel_id);

        let reply = match parsed {
            Err(err) => replies::parse_error(&err, self.executor.prefix()),
            Ok(command) => {
                debug!("Guild {}: {:?} from {}", guild, command, msg.author.name);
                match self.handle(&ctx, &msg, guild_id, command).await {
                    Ok(text) => text,
                    Err(err) => {
                        debug!("Guild {}: command failed: {}", guild, err);
                        replies::error(&err)
                    }
                }
            }
        };

        if let Err(e) = msg.channel_id.say(&ctx.http, reply).await {
            warn!("Failed to reply in {}: {}", msg.channel_id, e);
        }
    }

    async fn voice_state_update(&self, ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        let Some(guild_id) = new
            .guild_id
            .or_else(|| old.as_ref().and_then(|state| state.guild_id))
        else {
            return;
        };
        let guild = GuildId::new(guild_id.get());
        let bot = ctx.cache.current_user().id;

        if new.user_id == bot && new.channel_id.is_none() {
            // Disconnected, possibly by a moderator
            self.monitor.cancel(guild);
            let controller = self.executor.controller();
            if controller.registry().contains(guild) {
                if let Err(err) = controller.leave(guild).await {
                    warn!("Guild {}: cleanup after disconnect failed: {}", guild, err);
                }
            }
            return;
        }

        let Some(call) = self.songbird.get(guild_id) else {
            self.monitor.cancel(guild);
            return;
        };
        let Some(current) = call.lock().await.current_channel() else {
            return;
        };
        let channel = ChannelId::from(current.0);

        let Some(count) = listeners(&ctx, guild_id, channel, bot) else {
            return;
        };
        if count == 0 {
            // Unrelated voice traffic must not push the deadline back
            if !self.monitor.is_armed(guild) {
                info!(
                    "Guild {}: alone in voice, leaving in {:?}",
                    guild,
                    self.monitor.timeout()
                );
                self.monitor.arm(guild);
            }
        } else {
            self.monitor.membership_changed(guild, false);
        }
    }
}
