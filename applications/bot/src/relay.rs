/// Posts playback notices to the channel each guild last used
use crate::replies;
use chorus_core::GuildId;
use chorus_playback::PlaybackNotice;
use serenity::http::Http;
use serenity::model::id::ChannelId;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Last command channel per guild
#[derive(Debug, Clone, Default)]
pub struct NoticeChannels {
    inner: Arc<Mutex<HashMap<GuildId, ChannelId>>>,
}

impl NoticeChannels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remember(&self, guild: GuildId, channel: ChannelId) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(guild, channel);
    }

    pub fn channel(&self, guild: GuildId) -> Option<ChannelId> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&guild)
            .copied()
    }

    pub fn forget(&self, guild: GuildId) -> Option<ChannelId> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&guild)
    }
}

/// Spawn a task posting notices through the Discord HTTP client
pub fn spawn_notice_relay(
    http: Arc<Http>,
    channels: NoticeChannels,
    notices: broadcast::Receiver<PlaybackNotice>,
) -> JoinHandle<()> {
    tokio::spawn(relay_notices(notices, channels, move |channel, text| {
        let http = Arc::clone(&http);
        async move {
            if let Err(e) = channel.say(&*http, text).await {
                tracing::warn!("Failed to post notice to {}: {}", channel, e);
            }
        }
    }))
}

/// Forward notices to `post` until the controller goes away
pub async fn relay_notices<F, Fut>(
    mut notices: broadcast::Receiver<PlaybackNotice>,
    channels: NoticeChannels,
    post: F,
) where
    F: Fn(ChannelId, String) -> Fut,
    Fut: Future<Output = ()>,
{
    loop {
        let notice = match notices.recv().await {
            Ok(notice) => notice,
            Err(RecvError::Lagged(missed)) => {
                tracing::warn!("Notice relay fell behind, dropped {} notices", missed);
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        let guild = notice.guild();
        let channel = match notice {
            PlaybackNotice::Left { .. } => channels.forget(guild),
            _ => channels.channel(guild),
        };

        if let (Some(channel), Some(text)) = (channel, replies::notice(&notice)) {
            post(channel, text).await;
        }
    }
}
