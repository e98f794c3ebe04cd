//! In-memory collaborators for bot integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chorus_bot::Executor;
use chorus_catalog::CatalogAdapter;
use chorus_core::{
    CatalogError, CatalogExpander, CatalogTrack, CollectionKind, EffectMode, GuildId,
    ResolveError, ResolvedTrack, StreamHandle, TrackEndNotifier, TrackRef, TrackResolver,
    VoiceError, VoiceSink,
};
use chorus_playback::{PlaybackConfig, PlaybackController, StateRegistry};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Resolver that titles tracks after their reference; "missing ..." fails
pub struct TitleResolver;

#[async_trait]
impl TrackResolver for TitleResolver {
    async fn resolve(
        &self,
        reference: &TrackRef,
        effect: EffectMode,
    ) -> Result<ResolvedTrack, ResolveError> {
        if reference.as_str().starts_with("missing") {
            return Err(ResolveError::NotFound(reference.to_string()));
        }
        Ok(ResolvedTrack {
            title: format!("Title {}", reference),
            duration: Some(Duration::from_secs(95)),
            stream: StreamHandle {
                url: format!("https://cdn.example.com/{}", reference),
                http_headers: Vec::new(),
                input_args: Vec::new(),
                filter: effect.ffmpeg_filter().map(String::from),
            },
            canonical_reference: reference.clone(),
        })
    }
}

/// Spotify stand-in with one album, "alb1"
pub struct OneAlbum;

#[async_trait]
impl CatalogExpander for OneAlbum {
    async fn list_tracks(
        &self,
        _kind: CollectionKind,
        id: &str,
    ) -> Result<Vec<Option<CatalogTrack>>, CatalogError> {
        if id == "alb1" {
            Ok(vec![
                Some(CatalogTrack::new("Band", "One")),
                Some(CatalogTrack::new("Band", "Two")),
            ])
        } else {
            Err(CatalogError::Request(format!("{} not found", id)))
        }
    }
}

#[derive(Default)]
struct Stream {
    notifier: Option<TrackEndNotifier>,
    paused: bool,
}

/// Sink holding one stream per guild; `stop` fires the end signal
#[derive(Default)]
pub struct MemorySink {
    streams: Mutex<HashMap<GuildId, Stream>>,
    volumes: Mutex<Vec<f32>>,
}

impl MemorySink {
    pub fn volumes(&self) -> Vec<f32> {
        self.volumes.lock().unwrap().clone()
    }
}

#[async_trait]
impl VoiceSink for MemorySink {
    async fn play(
        &self,
        guild: GuildId,
        _stream: StreamHandle,
        on_ended: TrackEndNotifier,
    ) -> Result<(), VoiceError> {
        self.streams.lock().unwrap().insert(
            guild,
            Stream {
                notifier: Some(on_ended),
                paused: false,
            },
        );
        Ok(())
    }

    async fn stop(&self, guild: GuildId) -> Result<(), VoiceError> {
        let notifier = self
            .streams
            .lock()
            .unwrap()
            .remove(&guild)
            .and_then(|s| s.notifier);
        if let Some(notifier) = notifier {
            notifier.notify();
        }
        Ok(())
    }

    async fn pause(&self, guild: GuildId) -> Result<(), VoiceError> {
        match self.streams.lock().unwrap().get_mut(&guild) {
            Some(stream) => {
                stream.paused = true;
                Ok(())
            }
            None => Err(VoiceError::NotConnected),
        }
    }

    async fn resume(&self, guild: GuildId) -> Result<(), VoiceError> {
        match self.streams.lock().unwrap().get_mut(&guild) {
            Some(stream) => {
                stream.paused = false;
                Ok(())
            }
            None => Err(VoiceError::NotConnected),
        }
    }

    async fn is_playing(&self, guild: GuildId) -> bool {
        self.streams
            .lock()
            .unwrap()
            .get(&guild)
            .is_some_and(|s| !s.paused)
    }

    async fn is_paused(&self, guild: GuildId) -> bool {
        self.streams
            .lock()
            .unwrap()
            .get(&guild)
            .is_some_and(|s| s.paused)
    }

    async fn set_volume(&self, _guild: GuildId, volume: f32) -> Result<(), VoiceError> {
        self.volumes.lock().unwrap().push(volume);
        Ok(())
    }

    async fn disconnect(&self, guild: GuildId) -> Result<(), VoiceError> {
        self.stop(guild).await
    }
}

pub struct Bot {
    pub executor: Executor,
    pub controller: Arc<PlaybackController>,
    pub sink: Arc<MemorySink>,
}

/// Executor over in-memory collaborators, prefix "!"
pub fn bot() -> Bot {
    let config = PlaybackConfig::default();
    let sink = Arc::new(MemorySink::default());
    let controller = Arc::new(PlaybackController::new(
        Arc::new(StateRegistry::new(config.history_size)),
        Arc::new(TitleResolver),
        sink.clone(),
        config,
    ));
    let catalog = Arc::new(CatalogAdapter::new(Arc::new(OneAlbum)));

    Bot {
        executor: Executor::new(Arc::clone(&controller), catalog, "!"),
        controller,
        sink,
    }
}
