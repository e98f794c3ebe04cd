//! Playback controller - track transition protocol
//!
//! Drives one stream per guild through the voice sink and decides, at the end
//! of every track, what plays next.
//!
//! Every operation follows the same locking discipline:
//! - take the guild lock, decide, and claim a fresh [`PlaybackToken`]
//! - release the lock while the resolver runs
//! - re-take the lock and commit only if the token is still active
//!
//! `stop`, teardown, effect changes and newer transitions all revoke the token,
//! so a resolution that finishes late is dropped instead of clobbering state.
//! End-of-track signals carry the token of the play that produced them and go
//! through the same check, which is what keeps a natural end racing a skip
//! from advancing twice.

use crate::error::{PlaybackError, Result};
use crate::registry::{GuildHandle, StateRegistry};
use crate::state::NextStep;
use crate::types::{
    CurrentTrack, EffectOutcome, ListSnapshot, NowPlaying, PlayOutcome, PlaybackConfig,
    PlaybackNotice, PlaybackPhase,
};
use crate::volume::Volume;
use chorus_core::{
    EffectMode, GuildId, PlaybackToken, RepeatMode, ResolveError, ResolvedTrack, TrackEndNotifier,
    TrackEnded, TrackRef, TrackResolver, VoiceError, VoiceSink,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Buffered notices per subscriber before the oldest are dropped
const NOTICE_CAPACITY: usize = 64;

/// Result of resolving and starting one track
enum Attempt {
    Started { title: String, effect: EffectMode },
    Discarded,
    Unresolvable(ResolveError),
}

/// Result of handing a resolved stream to the sink
enum Commit {
    Started(String),
    Discarded,
    /// The guild's effect changed while resolving
    Retune { effect: EffectMode, locator: TrackRef },
}

/// Per-guild playback state machine
pub struct PlaybackController {
    registry: Arc<StateRegistry>,
    resolver: Arc<dyn TrackResolver>,
    sink: Arc<dyn VoiceSink>,
    config: PlaybackConfig,
    ended_tx: mpsc::UnboundedSender<TrackEnded>,
    ended_rx: Mutex<Option<mpsc::UnboundedReceiver<TrackEnded>>>,
    notices: broadcast::Sender<PlaybackNotice>,
}

impl PlaybackController {
    /// Create a controller over `registry`
    ///
    /// End-of-track signals are only acted on once
    /// [`spawn_track_end_dispatcher`](Self::spawn_track_end_dispatcher) runs.
    pub fn new(
        registry: Arc<StateRegistry>,
        resolver: Arc<dyn TrackResolver>,
        sink: Arc<dyn VoiceSink>,
        config: PlaybackConfig,
    ) -> Self {
        let (ended_tx, ended_rx) = mpsc::unbounded_channel();
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);

        Self {
            registry,
            resolver,
            sink,
            config,
            ended_tx,
            ended_rx: Mutex::new(Some(ended_rx)),
            notices,
        }
    }

    /// Guild state registry
    pub fn registry(&self) -> &Arc<StateRegistry> {
        &self.registry
    }

    /// Controller configuration
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Subscribe to playback notices
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackNotice> {
        self.notices.subscribe()
    }

    /// Start routing end-of-track signals into [`handle_track_ended`](Self::handle_track_ended)
    ///
    /// Each signal is handled on its own task so a slow resolution in one
    /// guild never holds up another; the guild lock serializes within a guild.
    /// Returns `None` if the dispatcher was already started.
    pub fn spawn_track_end_dispatcher(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let mut ended_rx = self
            .ended_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()?;
        let controller = Arc::clone(self);

        Some(tokio::spawn(async move {
            while let Some(event) = ended_rx.recv().await {
                let controller = Arc::clone(&controller);
                tokio::spawn(async move {
                    controller.handle_track_ended(event).await;
                });
            }
        }))
    }

    fn emit(&self, notice: PlaybackNotice) {
        // No subscribers is fine
        let _ = self.notices.send(notice);
    }

    fn end_notifier(&self, guild: GuildId, token: PlaybackToken) -> TrackEndNotifier {
        let ended_tx = self.ended_tx.clone();
        TrackEndNotifier::new(
            guild,
            token,
            Arc::new(move |event| {
                let _ = ended_tx.send(event);
            }),
        )
    }

    // ===== Requests =====

    /// Play `reference` now if the guild is idle, otherwise queue it
    ///
    /// # Errors
    /// `ResolutionFailed` if an immediate play cannot be resolved; the guild
    /// is not marked playing in that case.
    pub async fn enqueue_or_play(&self, guild: GuildId, reference: TrackRef) -> Result<PlayOutcome> {
        self.enqueue_all_or_play(guild, vec![reference]).await
    }

    /// Play the first reference now and queue the rest if the guild is idle,
    /// otherwise queue all of them in order
    ///
    /// If the first reference fails to resolve, playback continues with the
    /// next queued reference and the failure is still returned.
    pub async fn enqueue_all_or_play(
        &self,
        guild: GuildId,
        references: Vec<TrackRef>,
    ) -> Result<PlayOutcome> {
        let mut references = references.into_iter();
        let Some(first) = references.next() else {
            return Err(PlaybackError::InvalidArgument("nothing to play".to_string()));
        };
        let handle = self.registry.get_or_create(guild);

        let (token, effect, queued) = {
            let mut state = handle.lock().await;
            if state.is_busy() || self.sink.is_playing(guild).await {
                let position = state.queue.push(first);
                let before = state.queue.len();
                state.queue.extend(references);
                let added = 1 + state.queue.len() - before;
                debug!("Guild {} queued {} track(s) at {}", guild, added, position);
                return Ok(PlayOutcome::Queued { position, added });
            }

            let before = state.queue.len();
            state.queue.extend(references);
            let queued = state.queue.len() - before;
            let token = self.registry.issue_token();
            state.begin_transition(token);
            (token, state.effect, queued)
        };

        match self
            .start(guild, &handle, token, &first, first.clone(), effect, true)
            .await?
        {
            Attempt::Started { title, .. } => Ok(PlayOutcome::Started { title, queued }),
            Attempt::Discarded => Ok(PlayOutcome::Discarded),
            Attempt::Unresolvable(cause) => {
                warn!("Guild {}: could not resolve {}: {}", guild, first, cause);
                let carry_on = {
                    let mut state = handle.lock().await;
                    if !state.is_active(token) {
                        false
                    } else if state.queue.is_empty() {
                        state.go_idle();
                        false
                    } else {
                        true
                    }
                };
                if carry_on {
                    if let Err(err) = self.advance(guild, &handle, token).await {
                        warn!("Guild {}: skip-ahead after failed start: {}", guild, err);
                    }
                }
                Err(PlaybackError::ResolutionFailed {
                    reference: first,
                    cause,
                })
            }
        }
    }

    // ===== Transitions =====

    /// Handle an end-of-track signal from the voice sink
    ///
    /// Signals whose token is no longer active (the stream was stopped,
    /// replaced, or the guild torn down) are ignored.
    pub async fn handle_track_ended(&self, event: TrackEnded) {
        let Some(handle) = self.registry.get(event.guild) else {
            debug!("End signal {} for guild {} without state", event.token, event.guild);
            return;
        };

        let token = {
            let mut state = handle.lock().await;
            if !state.is_active(event.token) || !state.phase().has_stream() {
                debug!(
                    "Ignoring stale end signal {} for guild {}",
                    event.token, event.guild
                );
                return;
            }
            let token = self.registry.issue_token();
            state.begin_transition(token);
            token
        };

        if let Err(err) = self.advance(event.guild, &handle, token).await {
            warn!("Guild {}: advance failed: {}", event.guild, err);
        }
    }

    /// Decide and start what plays after the current track
    ///
    /// Assumes the transport stream has already ended. Returns the title of
    /// the track that started, or `None` when the guild went idle.
    pub async fn on_track_end(&self, guild: GuildId) -> Result<Option<String>> {
        let handle = self.registry.get_or_create(guild);
        let token = self.registry.issue_token();
        handle.lock().await.begin_transition(token);
        self.advance(guild, &handle, token).await
    }

    /// Pick the next track and start it, skipping past references that fail
    /// to resolve
    ///
    /// A reference that already failed in this transition is not resolved
    /// again. Once every queued reference has failed the guild goes idle, so
    /// an all-failing queue under queue repeat costs one pass.
    async fn advance(
        &self,
        guild: GuildId,
        handle: &GuildHandle,
        token: PlaybackToken,
    ) -> Result<Option<String>> {
        let mut failed: HashSet<TrackRef> = HashSet::new();

        loop {
            let decision = {
                let mut state = handle.lock().await;
                if !state.is_active(token) {
                    debug!("Guild {}: transition {} superseded", guild, token);
                    return Ok(None);
                }

                let step = match state.next_step() {
                    NextStep::Play(reference) if failed.contains(&reference) => {
                        if state.queue.iter().all(|queued| failed.contains(queued)) {
                            warn!(
                                "Guild {}: giving up after {} unplayable tracks",
                                guild,
                                failed.len()
                            );
                            NextStep::Idle
                        } else {
                            continue;
                        }
                    }
                    step => step,
                };

                match step {
                    NextStep::Repeat { reference, locator } => {
                        Some((reference, locator, true, state.effect, state.repeat))
                    }
                    NextStep::Play(reference) => Some((
                        reference.clone(),
                        reference,
                        false,
                        state.effect,
                        state.repeat,
                    )),
                    NextStep::Idle => {
                        state.go_idle();
                        None
                    }
                }
            };

            let Some((reference, locator, repeating, effect, repeat)) = decision else {
                info!("Guild {}: queue finished", guild);
                self.emit(PlaybackNotice::QueueFinished { guild });
                return Ok(None);
            };

            match self
                .start(guild, handle, token, &reference, locator, effect, !repeating)
                .await?
            {
                Attempt::Started { title, effect } => {
                    self.emit(if repeating {
                        PlaybackNotice::Repeating {
                            guild,
                            title: title.clone(),
                        }
                    } else {
                        PlaybackNotice::NowPlaying {
                            guild,
                            title: title.clone(),
                            repeat,
                            effect,
                        }
                    });
                    return Ok(Some(title));
                }
                Attempt::Discarded => return Ok(None),
                Attempt::Unresolvable(cause) => {
                    warn!("Guild {}: could not resolve {}: {}", guild, reference, cause);
                    self.emit(PlaybackNotice::ResolutionFailed {
                        guild,
                        reference: reference.clone(),
                        cause: cause.to_string(),
                    });

                    if repeating {
                        // A dead repeated track is not skipped past
                        let mut state = handle.lock().await;
                        if state.is_active(token) {
                            state.go_idle();
                        }
                        return Ok(None);
                    }
                    failed.insert(reference);
                }
            }
        }
    }

    /// Resolve `locator` under `effect` and start it for `token`
    ///
    /// If the guild's effect changed while the resolver ran, the track is
    /// resolved again under the new effect before anything is streamed.
    #[allow(clippy::too_many_arguments)]
    async fn start(
        &self,
        guild: GuildId,
        handle: &GuildHandle,
        token: PlaybackToken,
        reference: &TrackRef,
        locator: TrackRef,
        effect: EffectMode,
        record_history: bool,
    ) -> Result<Attempt> {
        let mut locator = locator;
        let mut effect = effect;

        loop {
            let resolved = match self.resolver.resolve(&locator, effect).await {
                Ok(resolved) => resolved,
                Err(cause) => return Ok(Attempt::Unresolvable(cause)),
            };

            match self
                .commit(guild, handle, token, reference, resolved, effect, record_history)
                .await?
            {
                Commit::Started(title) => return Ok(Attempt::Started { title, effect }),
                Commit::Discarded => return Ok(Attempt::Discarded),
                Commit::Retune {
                    effect: current,
                    locator: canonical,
                } => {
                    debug!(
                        "Guild {}: effect changed to {} while resolving {}, resolving again",
                        guild, current, reference
                    );
                    effect = current;
                    locator = canonical;
                }
            }
        }
    }

    /// Start a resolved stream if `token` is still active and the stream was
    /// resolved under the guild's current effect
    #[allow(clippy::too_many_arguments)]
    async fn commit(
        &self,
        guild: GuildId,
        handle: &GuildHandle,
        token: PlaybackToken,
        reference: &TrackRef,
        resolved: ResolvedTrack,
        effect: EffectMode,
        record_history: bool,
    ) -> Result<Commit> {
        let mut state = handle.lock().await;
        if !state.is_active(token) {
            debug!(
                "Guild {}: discarding resolution of {}, state changed meanwhile",
                guild, reference
            );
            return Ok(Commit::Discarded);
        }
        if state.effect != effect {
            return Ok(Commit::Retune {
                effect: state.effect,
                locator: resolved.canonical_reference,
            });
        }

        let volume = state.volume_or(self.config.default_volume);
        if let Err(err) = self
            .sink
            .play(guild, resolved.stream, self.end_notifier(guild, token))
            .await
        {
            warn!("Guild {}: voice sink refused {}: {}", guild, reference, err);
            state.go_idle();
            return Err(err.into());
        }
        if let Err(err) = self.sink.set_volume(guild, volume).await {
            warn!("Guild {}: could not set volume: {}", guild, err);
        }

        info!("Guild {} now playing {}", guild, resolved.title);
        state.start_track(
            CurrentTrack {
                reference: reference.clone(),
                canonical_reference: resolved.canonical_reference,
                title: resolved.title.clone(),
                duration: resolved.duration,
                volume,
            },
            record_history,
        );
        Ok(Commit::Started(resolved.title))
    }

    // ===== Playback Control =====

    /// Stop the current track; the end signal advances as usual
    ///
    /// Repeat modes apply, so under track repeat the same track restarts.
    /// Returns the title that was skipped.
    pub async fn skip(&self, guild: GuildId) -> Result<String> {
        let handle = self.registry.get_or_create(guild);
        // Held across the transport call so a natural end cannot slip in between
        let state = handle.lock().await;
        let title = match &state.current {
            Some(track) if state.phase().has_stream() => track.title.clone(),
            _ => return Err(PlaybackError::NothingPlaying),
        };
        self.sink.stop(guild).await?;
        info!("Guild {} skipped {}", guild, title);
        Ok(title)
    }

    /// Clear the queue, turn repeat off and stop without advancing
    ///
    /// Idempotent.
    pub async fn stop(&self, guild: GuildId) -> Result<()> {
        let handle = self.registry.get_or_create(guild);
        let mut state = handle.lock().await;
        state.stop();
        match self.sink.stop(guild).await {
            Ok(()) | Err(VoiceError::NotConnected) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Pause the current track; returns false if it was already paused
    pub async fn pause(&self, guild: GuildId) -> Result<bool> {
        let handle = self.registry.get_or_create(guild);
        let mut state = handle.lock().await;
        match state.phase() {
            PlaybackPhase::Playing => {
                self.sink.pause(guild).await?;
                state.set_paused(true);
                Ok(true)
            }
            PlaybackPhase::Paused => Ok(false),
            _ => Err(PlaybackError::NothingPlaying),
        }
    }

    /// Resume a paused track; returns false if it was not paused
    pub async fn resume(&self, guild: GuildId) -> Result<bool> {
        let handle = self.registry.get_or_create(guild);
        let mut state = handle.lock().await;
        match state.phase() {
            PlaybackPhase::Paused => {
                self.sink.resume(guild).await?;
                state.set_paused(false);
                Ok(true)
            }
            PlaybackPhase::Playing => Ok(false),
            _ => Err(PlaybackError::NothingPlaying),
        }
    }

    /// Set the current track's volume in percent
    ///
    /// # Errors
    /// `NothingPlaying` without a current track, `InvalidArgument` outside 0-100
    pub async fn set_volume(&self, guild: GuildId, percent: i64) -> Result<u8> {
        let handle = self.registry.get_or_create(guild);
        let mut state = handle.lock().await;
        if state.current.is_none() || !state.phase().has_stream() {
            return Err(PlaybackError::NothingPlaying);
        }
        let volume = Volume::from_percent(percent)?;
        self.sink.set_volume(guild, volume.gain()).await?;
        if let Some(track) = state.current.as_mut() {
            track.volume = volume.gain();
        }
        Ok(volume.percent())
    }

    /// Change the guild's effect, restarting the current track under it
    ///
    /// Queue and history are left exactly as they were, and a paused track
    /// comes back paused. While a track is still being resolved the effect is
    /// stored and that track starts under it. If the restart cannot be
    /// resolved the guild goes idle.
    pub async fn set_effect(&self, guild: GuildId, effect: EffectMode) -> Result<EffectOutcome> {
        let handle = self.registry.get_or_create(guild);

        let (token, reference, locator, paused) = {
            let mut state = handle.lock().await;
            state.effect = effect;
            let paused = state.phase() == PlaybackPhase::Paused;
            let (reference, locator) = match &state.current {
                Some(track) if state.phase().has_stream() => {
                    (track.reference.clone(), track.canonical_reference.clone())
                }
                _ => return Ok(EffectOutcome::Deferred),
            };

            let token = self.registry.issue_token();
            state.begin_transition(token);
            // The old stream's end signal now carries a revoked token
            if let Err(err) = self.sink.stop(guild).await {
                warn!("Guild {}: could not stop for effect change: {}", guild, err);
            }
            (token, reference, locator, paused)
        };

        match self
            .start(guild, &handle, token, &reference, locator, effect, false)
            .await?
        {
            Attempt::Started { title, effect } => {
                if paused {
                    self.repause(guild, &handle, token).await;
                }
                info!("Guild {}: restarted {} with {}", guild, title, effect);
                Ok(EffectOutcome::Restarted { title })
            }
            Attempt::Discarded => Ok(EffectOutcome::Deferred),
            Attempt::Unresolvable(cause) => {
                warn!("Guild {}: could not restart {}: {}", guild, reference, cause);
                let mut state = handle.lock().await;
                if state.is_active(token) {
                    state.go_idle();
                }
                Err(PlaybackError::ResolutionFailed { reference, cause })
            }
        }
    }

    /// Pause a restarted stream again
    async fn repause(&self, guild: GuildId, handle: &GuildHandle, token: PlaybackToken) {
        let mut state = handle.lock().await;
        if !state.is_active(token) || state.phase() != PlaybackPhase::Playing {
            return;
        }
        match self.sink.pause(guild).await {
            Ok(()) => state.set_paused(true),
            Err(err) => warn!("Guild {}: could not pause restarted track: {}", guild, err),
        }
    }

    /// Set the repeat mode; takes effect at the next track end
    pub async fn set_repeat_mode(&self, guild: GuildId, mode: RepeatMode) {
        self.registry.get_or_create(guild).lock().await.repeat = mode;
    }

    /// Advance the repeat mode Off -> Track -> Queue -> Off
    pub async fn cycle_repeat_mode(&self, guild: GuildId) -> RepeatMode {
        let handle = self.registry.get_or_create(guild);
        let mut state = handle.lock().await;
        state.repeat = state.repeat.cycle();
        state.repeat
    }

    /// Current repeat mode
    pub async fn repeat_mode(&self, guild: GuildId) -> RepeatMode {
        self.registry.get_or_create(guild).lock().await.repeat
    }

    /// Current effect
    pub async fn effect(&self, guild: GuildId) -> EffectMode {
        self.registry.get_or_create(guild).lock().await.effect
    }

    // ===== Queue =====

    /// What is playing
    pub async fn now_playing(&self, guild: GuildId) -> Option<NowPlaying> {
        self.registry.get_or_create(guild).lock().await.now_playing()
    }

    /// Queue in play order, first entries only
    pub async fn list_queue(&self, guild: GuildId) -> ListSnapshot {
        self.registry.get_or_create(guild).lock().await.queue_listing()
    }

    /// History, most recent first, first entries only
    pub async fn list_history(&self, guild: GuildId) -> ListSnapshot {
        self.registry.get_or_create(guild).lock().await.history_listing()
    }

    /// Randomly permute the queue; false if it had fewer than two entries
    pub async fn shuffle_queue(&self, guild: GuildId) -> bool {
        self.registry.get_or_create(guild).lock().await.queue.shuffle()
    }

    /// Drop every queued reference; returns how many were dropped
    pub async fn clear_queue(&self, guild: GuildId) -> usize {
        self.registry.get_or_create(guild).lock().await.queue.clear()
    }

    // ===== Lifecycle =====

    /// Stop, leave the voice channel, and drop the guild's state
    pub async fn leave(&self, guild: GuildId) -> Result<()> {
        self.stop(guild).await?;
        let disconnected = self.sink.disconnect(guild).await;
        self.registry.teardown(guild).await;
        self.emit(PlaybackNotice::Left { guild });
        info!("Guild {}: left voice channel", guild);

        match disconnected {
            Ok(()) | Err(VoiceError::NotConnected) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
