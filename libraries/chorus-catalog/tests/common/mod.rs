//! In-memory collaborators for catalog integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chorus_core::{
    CatalogError, CatalogExpander, CatalogTrack, CollectionKind, EffectMode, GuildId,
    ResolveError, ResolvedTrack, StreamHandle, TrackEndNotifier, TrackRef, TrackResolver,
    VoiceError, VoiceSink,
};
use chorus_playback::{PlaybackConfig, PlaybackController, StateRegistry};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Expander serving fixed collections keyed by id
#[derive(Default)]
pub struct MemoryExpander {
    collections: HashMap<String, Vec<Option<CatalogTrack>>>,
}

impl MemoryExpander {
    pub fn with(mut self, id: &str, tracks: Vec<Option<CatalogTrack>>) -> Self {
        self.collections.insert(id.to_string(), tracks);
        self
    }
}

#[async_trait]
impl CatalogExpander for MemoryExpander {
    async fn list_tracks(
        &self,
        _kind: CollectionKind,
        id: &str,
    ) -> Result<Vec<Option<CatalogTrack>>, CatalogError> {
        self.collections
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::Request(format!("{} not found", id)))
    }
}

/// Resolver that echoes the search term as the title
pub struct EchoResolver;

#[async_trait]
impl TrackResolver for EchoResolver {
    async fn resolve(
        &self,
        reference: &TrackRef,
        effect: EffectMode,
    ) -> Result<ResolvedTrack, ResolveError> {
        Ok(ResolvedTrack {
            title: reference.as_str().to_string(),
            duration: None,
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

/// Sink that keeps the latest stream per guild
#[derive(Default)]
pub struct RecordingSink {
    streams: Mutex<HashMap<GuildId, TrackEndNotifier>>,
    plays: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn plays(&self) -> Vec<String> {
        self.plays.lock().unwrap().clone()
    }
}

#[async_trait]
impl VoiceSink for RecordingSink {
    async fn play(
        &self,
        guild: GuildId,
        stream: StreamHandle,
        on_ended: TrackEndNotifier,
    ) -> Result<(), VoiceError> {
        self.plays.lock().unwrap().push(stream.url);
        self.streams.lock().unwrap().insert(guild, on_ended);
        Ok(())
    }

    async fn stop(&self, guild: GuildId) -> Result<(), VoiceError> {
        if let Some(notifier) = self.streams.lock().unwrap().remove(&guild) {
            notifier.notify();
        }
        Ok(())
    }

    async fn pause(&self, _guild: GuildId) -> Result<(), VoiceError> {
        Ok(())
    }

    async fn resume(&self, _guild: GuildId) -> Result<(), VoiceError> {
        Ok(())
    }

    async fn is_playing(&self, guild: GuildId) -> bool {
        self.streams.lock().unwrap().contains_key(&guild)
    }

    async fn is_paused(&self, _guild: GuildId) -> bool {
        false
    }

    async fn set_volume(&self, _guild: GuildId, _volume: f32) -> Result<(), VoiceError> {
        Ok(())
    }

    async fn disconnect(&self, guild: GuildId) -> Result<(), VoiceError> {
        self.stop(guild).await
    }
}

pub fn controller(sink: Arc<RecordingSink>) -> PlaybackController {
    let config = PlaybackConfig::default();
    PlaybackController::new(
        Arc::new(StateRegistry::new(config.history_size)),
        Arc::new(EchoResolver),
        sink,
        config,
    )
}
