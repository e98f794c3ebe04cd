/// Songbird voice sink
///
/// Streams are opened by piping ffmpeg (effect filter applied, 48 kHz stereo
/// wav) into songbird. Songbird's End and Error track events are relayed to
/// the controller's end notifier.
use async_trait::async_trait;
use chorus_core::{GuildId, StreamHandle, TrackEndNotifier, VoiceError, VoiceSink};
use songbird::events::{Event, EventContext, EventHandler as VoiceEventHandler, TrackEvent};
use songbird::input::{ChildContainer, Input};
use songbird::tracks::{PlayMode, TrackHandle};
use songbird::Songbird;
use std::collections::HashMap;
use std::num::NonZeroU64;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex, PoisonError};

/// Songbird guild id, `None` for the invalid id 0
pub fn songbird_guild(guild: GuildId) -> Option<songbird::id::GuildId> {
    NonZeroU64::new(guild.get()).map(songbird::id::GuildId::from)
}

/// ffmpeg arguments for one stream
pub fn ffmpeg_args(stream: &StreamHandle) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
    ];
    args.extend(stream.input_args.iter().cloned());

    if !stream.http_headers.is_empty() {
        let headers: String = stream
            .http_headers
            .iter()
            .map(|(name, value)| format!("{}: {}\r\n", name, value))
            .collect();
        args.push("-headers".into());
        args.push(headers);
    }

    args.push("-i".into());
    args.push(stream.url.clone());
    args.push("-vn".into());

    if let Some(filter) = &stream.filter {
        args.push("-af".into());
        args.push(filter.clone());
    }

    args.extend(
        ["-c:a", "pcm_s16le", "-f", "wav", "-ar", "48000", "-ac", "2", "pipe:1"]
            .iter()
            .map(|arg| arg.to_string()),
    );
    args
}

/// Relays a track's End/Error events to its end notifier
struct EndRelay {
    notifier: TrackEndNotifier,
}

#[async_trait]
impl VoiceEventHandler for EndRelay {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        if let EventContext::Track(tracks) = ctx {
            for (state, _) in *tracks {
                if let PlayMode::Errored(err) = &state.playing {
                    tracing::warn!(
                        "Guild {}: stream failed: {:?}",
                        self.notifier.event().guild,
                        err
                    );
                }
            }
        }
        self.notifier.notify();
        None
    }
}

/// VoiceSink backed by songbird calls
pub struct SongbirdSink {
    manager: Arc<Songbird>,
    ffmpeg: PathBuf,
    tracks: Mutex<HashMap<GuildId, TrackHandle>>,
}

impl SongbirdSink {
    pub fn new(manager: Arc<Songbird>, ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            manager,
            ffmpeg: ffmpeg.into(),
            tracks: Mutex::new(HashMap::new()),
        }
    }

    /// Songbird manager shared with the gateway client
    pub fn manager(&self) -> &Arc<Songbird> {
        &self.manager
    }

    fn track(&self, guild: GuildId) -> Option<TrackHandle> {
        self.tracks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&guild)
            .cloned()
    }

    fn take_track(&self, guild: GuildId) -> Option<TrackHandle> {
        self.tracks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&guild)
    }

    async fn play_mode(&self, guild: GuildId) -> Option<PlayMode> {
        let track = self.track(guild)?;
        track.get_info().await.ok().map(|info| info.playing)
    }

    fn spawn_ffmpeg(&self, stream: &StreamHandle) -> Result<Input, VoiceError> {
        let child = Command::new(&self.ffmpeg)
            .args(ffmpeg_args(stream))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                VoiceError::transport(format!("could not run {}: {}", self.ffmpeg.display(), e))
            })?;
        Ok(ChildContainer::from(child).into())
    }
}

#[async_trait]
impl VoiceSink for SongbirdSink {
    async fn play(
        &self,
        guild: GuildId,
        stream: StreamHandle,
        on_ended: TrackEndNotifier,
    ) -> Result<(), VoiceError> {
        let call = songbird_guild(guild)
            .and_then(|id| self.manager.get(id))
            .ok_or(VoiceError::NotConnected)?;

        let input = self.spawn_ffmpeg(&stream)?;
        let track = call.lock().await.play_input(input);

        for event in [TrackEvent::End, TrackEvent::Error] {
            track
                .add_event(
                    Event::Track(event),
                    EndRelay {
                        notifier: on_ended.clone(),
                    },
                )
                .map_err(|e| VoiceError::transport(e.to_string()))?;
        }

        let previous = self
            .tracks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(guild, track);
        if let Some(previous) = previous {
            let _ = previous.stop();
        }
        Ok(())
    }

    async fn stop(&self, guild: GuildId) -> Result<(), VoiceError> {
        if let Some(track) = self.take_track(guild) {
            // Already finished is fine
            let _ = track.stop();
        }
        Ok(())
    }

    async fn pause(&self, guild: GuildId) -> Result<(), VoiceError> {
        let track = self.track(guild).ok_or(VoiceError::NotConnected)?;
        track
            .pause()
            .map_err(|e| VoiceError::transport(e.to_string()))
    }

    async fn resume(&self, guild: GuildId) -> Result<(), VoiceError> {
        let track = self.track(guild).ok_or(VoiceError::NotConnected)?;
        track.play().map_err(|e| VoiceError::transport(e.to_string()))
    }

    async fn is_playing(&self, guild: GuildId) -> bool {
        matches!(self.play_mode(guild).await, Some(PlayMode::Play))
    }

    async fn is_paused(&self, guild: GuildId) -> bool {
        matches!(self.play_mode(guild).await, Some(PlayMode::Pause))
    }

    async fn set_volume(&self, guild: GuildId, volume: f32) -> Result<(), VoiceError> {
        let track = self.track(guild).ok_or(VoiceError::NotConnected)?;
        track
            .set_volume(volume)
            .map_err(|e| VoiceError::transport(e.to_string()))
    }

    async fn disconnect(&self, guild: GuildId) -> Result<(), VoiceError> {
        if let Some(track) = self.take_track(guild) {
            let _ = track.stop();
        }

        let id = songbird_guild(guild).ok_or(VoiceError::NotConnected)?;
        match self.manager.remove(id).await {
            Ok(()) => Ok(()),
            Err(songbird::error::JoinError::NoCall) => Err(VoiceError::NotConnected),
            Err(err) => Err(VoiceError::transport(err.to_string())),
        }
    }
}
