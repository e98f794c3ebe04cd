//! Shared fakes for playback integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chorus_core::{
    EffectMode, GuildId, ResolveError, ResolvedTrack, StreamHandle, TrackEndNotifier,
    TrackRef, TrackResolver, VoiceError, VoiceSink,
};
use chorus_playback::{PlaybackConfig, PlaybackController, StateRegistry};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub const LOCATOR_PREFIX: &str = "https://example.com/";

/// Name a reference or its canonical locator stands for
pub fn base_name(reference: &TrackRef) -> &str {
    reference
        .as_str()
        .strip_prefix(LOCATOR_PREFIX)
        .unwrap_or(reference.as_str())
}

/// Title the fake resolver gives `name`
pub fn title_of(name: &str) -> String {
    format!("Title {}", name)
}

/// Resolver that knows every reference except the ones marked failing
///
/// Canonical locators are `https://example.com/<name>`.
#[derive(Default)]
pub struct FakeResolver {
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<(TrackRef, EffectMode)>>,
    held: AtomicBool,
    entered: Notify,
    release: Notify,
}

impl FakeResolver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail(&self, name: &str) {
        self.failing.lock().unwrap().insert(name.to_string());
    }

    pub fn calls(&self) -> Vec<(TrackRef, EffectMode)> {
        self.calls.lock().unwrap().clone()
    }

    /// Make the next resolutions wait for `release`
    pub fn hold(&self) {
        self.held.store(true, Ordering::SeqCst);
    }

    /// Wait until a held resolution has started
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    /// Let one held resolution finish and stop holding
    pub fn release(&self) {
        self.held.store(false, Ordering::SeqCst);
        self.release.notify_one();
    }
}

#[async_trait]
impl TrackResolver for FakeResolver {
    async fn resolve(
        &self,
        reference: &TrackRef,
        effect: EffectMode,
    ) -> Result<ResolvedTrack, ResolveError> {
        self.calls.lock().unwrap().push((reference.clone(), effect));

        if self.held.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }

        let name = base_name(reference).to_string();
        if self.failing.lock().unwrap().contains(&name) {
            return Err(ResolveError::NotFound(name));
        }

        Ok(ResolvedTrack {
            title: title_of(&name),
            duration: Some(Duration::from_secs(180)),
            stream: StreamHandle {
                url: format!("https://cdn.example.com/{}.webm", name),
                http_headers: Vec::new(),
                input_args: Vec::new(),
                filter: effect.ffmpeg_filter().map(String::from),
            },
            canonical_reference: TrackRef::new(format!("{}{}", LOCATOR_PREFIX, name)),
        })
    }
}

#[derive(Default)]
struct GuildStream {
    current: Option<(StreamHandle, TrackEndNotifier)>,
    paused: bool,
    volume: Option<f32>,
}

/// Voice sink that records what it was asked to do
///
/// `stop` fires the stream's end signal, like a real transport does.
#[derive(Default)]
pub struct FakeSink {
    guilds: Mutex<HashMap<GuildId, GuildStream>>,
    plays: Mutex<Vec<(GuildId, StreamHandle)>>,
    disconnects: Mutex<Vec<GuildId>>,
}

impl FakeSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The current stream of `guild` finishes on its own
    pub fn finish(&self, guild: GuildId) {
        let ended = self
            .guilds
            .lock()
            .unwrap()
            .get_mut(&guild)
            .and_then(|stream| stream.current.take());
        if let Some((_, notifier)) = ended {
            notifier.notify();
        }
    }

    /// Notifier of the current stream
    pub fn notifier(&self, guild: GuildId) -> Option<TrackEndNotifier> {
        self.guilds
            .lock()
            .unwrap()
            .get(&guild)
            .and_then(|stream| stream.current.as_ref().map(|(_, n)| n.clone()))
    }

    pub fn plays(&self) -> Vec<(GuildId, StreamHandle)> {
        self.plays.lock().unwrap().clone()
    }

    pub fn play_count(&self) -> usize {
        self.plays.lock().unwrap().len()
    }

    pub fn volume(&self, guild: GuildId) -> Option<f32> {
        self.guilds.lock().unwrap().get(&guild).and_then(|s| s.volume)
    }

    pub fn has_stream(&self, guild: GuildId) -> bool {
        self.guilds
            .lock()
            .unwrap()
            .get(&guild)
            .is_some_and(|s| s.current.is_some())
    }

    pub fn disconnects(&self) -> Vec<GuildId> {
        self.disconnects.lock().unwrap().clone()
    }
}

#[async_trait]
impl VoiceSink for FakeSink {
    async fn play(
        &self,
        guild: GuildId,
        stream: StreamHandle,
        on_ended: TrackEndNotifier,
    ) -> Result<(), VoiceError> {
        self.plays.lock().unwrap().push((guild, stream.clone()));
        let mut guilds = self.guilds.lock().unwrap();
        let entry = guilds.entry(guild).or_default();
        entry.current = Some((stream, on_ended));
        entry.paused = false;
        Ok(())
    }

    async fn stop(&self, guild: GuildId) -> Result<(), VoiceError> {
        self.finish(guild);
        Ok(())
    }

    async fn pause(&self, guild: GuildId) -> Result<(), VoiceError> {
        let mut guilds = self.guilds.lock().unwrap();
        match guilds.get_mut(&guild) {
            Some(stream) if stream.current.is_some() => {
                stream.paused = true;
                Ok(())
            }
            _ => Err(VoiceError::NotConnected),
        }
    }

    async fn resume(&self, guild: GuildId) -> Result<(), VoiceError> {
        let mut guilds = self.guilds.lock().unwrap();
        match guilds.get_mut(&guild) {
            Some(stream) if stream.current.is_some() => {
                stream.paused = false;
                Ok(())
            }
            _ => Err(VoiceError::NotConnected),
        }
    }

    async fn is_playing(&self, guild: GuildId) -> bool {
        self.guilds
            .lock()
            .unwrap()
            .get(&guild)
            .is_some_and(|s| s.current.is_some() && !s.paused)
    }

    async fn is_paused(&self, guild: GuildId) -> bool {
        self.guilds
            .lock()
            .unwrap()
            .get(&guild)
            .is_some_and(|s| s.current.is_some() && s.paused)
    }

    async fn set_volume(&self, guild: GuildId, volume: f32) -> Result<(), VoiceError> {
        self.guilds.lock().unwrap().entry(guild).or_default().volume = Some(volume);
        Ok(())
    }

    async fn disconnect(&self, guild: GuildId) -> Result<(), VoiceError> {
        self.finish(guild);
        self.guilds.lock().unwrap().remove(&guild);
        self.disconnects.lock().unwrap().push(guild);
        Ok(())
    }
}

pub struct Harness {
    pub controller: Arc<PlaybackController>,
    pub resolver: Arc<FakeResolver>,
    pub sink: Arc<FakeSink>,
}

/// Controller over fresh fakes, dispatcher not started
pub fn harness() -> Harness {
    harness_with(PlaybackConfig::default())
}

pub fn harness_with(config: PlaybackConfig) -> Harness {
    let resolver = FakeResolver::new();
    let sink = FakeSink::new();
    let registry = Arc::new(StateRegistry::new(config.history_size));
    let controller = Arc::new(PlaybackController::new(
        registry,
        resolver.clone(),
        sink.clone(),
        config,
    ));
    Harness {
        controller,
        resolver,
        sink,
    }
}

pub fn refs(names: &[&str]) -> Vec<TrackRef> {
    names.iter().map(|n| TrackRef::new(*n)).collect()
}

/// History of `guild`, oldest first
pub async fn history(controller: &PlaybackController, guild: GuildId) -> Vec<String> {
    let handle = controller.registry().get_or_create(guild);
    let state = handle.lock().await;
    state
        .history
        .oldest_first()
        .map(|r| r.as_str().to_string())
        .collect()
}

/// Queue of `guild`, in play order
pub async fn queue(controller: &PlaybackController, guild: GuildId) -> Vec<String> {
    let handle = controller.registry().get_or_create(guild);
    let state = handle.lock().await;
    state.queue.iter().map(|r| r.as_str().to_string()).collect()
}

/// Reference of the current track
pub async fn current(controller: &PlaybackController, guild: GuildId) -> Option<String> {
    controller
        .now_playing(guild)
        .await
        .map(|np| np.reference.as_str().to_string())
}
