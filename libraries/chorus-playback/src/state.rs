//! Per-guild music state
//!
//! Pure data plus the repeat-mode decision of what plays next. All transport
//! side effects live in the controller.

use crate::history::History;
use crate::queue::TrackQueue;
use crate::types::{CurrentTrack, ListSnapshot, NowPlaying, PlaybackPhase, LISTING_LIMIT};
use crate::volume::Volume;
use chorus_core::{EffectMode, PlaybackToken, RepeatMode, TrackRef};

/// What the end of a track leads to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    /// Track repeat: play the current track again
    Repeat {
        /// Reference the track was requested with
        reference: TrackRef,
        /// Locator to resolve
        locator: TrackRef,
    },

    /// Play a reference taken from the queue
    Play(TrackRef),

    /// Nothing to play
    Idle,
}

/// Queue, history, modes, and current track of one guild
#[derive(Debug, Clone)]
pub struct GuildMusicState {
    /// References waiting to play
    pub queue: TrackQueue,

    /// Track starts, chronological
    pub history: History,

    /// Repeat mode
    pub repeat: RepeatMode,

    /// Effect applied to new streams
    pub effect: EffectMode,

    /// In-flight track
    pub current: Option<CurrentTrack>,

    phase: PlaybackPhase,

    /// Token of the play (or pending play) this state accepts results for
    active_token: Option<PlaybackToken>,
}

impl GuildMusicState {
    /// Create an empty state with defaults
    pub fn new(history_size: usize) -> Self {
        Self {
            queue: TrackQueue::new(),
            history: History::new(history_size),
            repeat: RepeatMode::Off,
            effect: EffectMode::Normal,
            current: None,
            phase: PlaybackPhase::Idle,
            active_token: None,
        }
    }

    /// Current phase
    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    /// Whether a new request must be queued instead of played
    pub fn is_busy(&self) -> bool {
        self.phase != PlaybackPhase::Idle || !self.queue.is_empty()
    }

    /// Whether `token` is the play this state currently accepts
    pub fn is_active(&self, token: PlaybackToken) -> bool {
        self.active_token == Some(token)
    }

    /// Claim the state for a pending play
    ///
    /// Results and end signals for any earlier token are ignored from now on.
    pub fn begin_transition(&mut self, token: PlaybackToken) {
        self.phase = PlaybackPhase::Transitioning;
        self.active_token = Some(token);
    }

    /// Record a successful stream start for the active token
    pub fn start_track(&mut self, track: CurrentTrack, record_history: bool) {
        if record_history {
            self.history.push(track.reference.clone());
        }
        self.current = Some(track);
        self.phase = PlaybackPhase::Playing;
    }

    /// Mark the stream paused or resumed
    pub fn set_paused(&mut self, paused: bool) {
        if self.phase.has_stream() {
            self.phase = if paused {
                PlaybackPhase::Paused
            } else {
                PlaybackPhase::Playing
            };
        }
    }

    /// Nothing left to play: drop the current track, keep queue and history
    pub fn go_idle(&mut self) {
        self.current = None;
        self.phase = PlaybackPhase::Idle;
        self.active_token = None;
    }

    /// Stop command: clear queue and current track, repeat off
    pub fn stop(&mut self) {
        self.queue.clear();
        self.repeat = RepeatMode::Off;
        self.go_idle();
    }

    /// Back to a freshly created state
    pub fn reset(&mut self) {
        self.stop();
        self.history.clear();
        self.effect = EffectMode::Normal;
    }

    /// Decide what plays after the current track
    ///
    /// 1. Track repeat with a current track replays it.
    /// 2. Otherwise the queue front plays; under queue repeat it is also
    ///    re-appended so it comes round again.
    /// 3. An empty queue under queue repeat is rebuilt from history: the
    ///    oldest entry plays, the others are queued in order, followed by the
    ///    oldest entry itself.
    /// 4. Otherwise idle.
    pub fn next_step(&mut self) -> NextStep {
        if self.repeat == RepeatMode::Track {
            if let Some(current) = &self.current {
                return NextStep::Repeat {
                    reference: current.reference.clone(),
                    locator: current.canonical_reference.clone(),
                };
            }
        }

        if let Some(next) = self.queue.pop_next() {
            if self.repeat == RepeatMode::Queue {
                self.queue.push(next.clone());
            }
            return NextStep::Play(next);
        }

        if self.repeat == RepeatMode::Queue {
            let mut replay = self.history.oldest_first().cloned();
            if let Some(next) = replay.next() {
                self.queue.extend(replay);
                self.queue.push(next.clone());
                return NextStep::Play(next);
            }
        }

        NextStep::Idle
    }

    /// Volume of the current track, or `fallback`
    pub fn volume_or(&self, fallback: f32) -> f32 {
        self.current.as_ref().map_or(fallback, |track| track.volume)
    }

    /// Snapshot of the current track
    ///
    /// `None` while the next track is being started, since `current` still
    /// holds the one that finished.
    pub fn now_playing(&self) -> Option<NowPlaying> {
        if self.phase == PlaybackPhase::Transitioning {
            return None;
        }
        self.current.as_ref().map(|track| NowPlaying {
            title: track.title.clone(),
            reference: track.reference.clone(),
            duration: track.duration,
            volume_percent: Volume::from_gain(track.volume).percent(),
            paused: self.phase == PlaybackPhase::Paused,
            repeat: self.repeat,
            effect: self.effect,
        })
    }

    /// First entries of the queue in play order
    pub fn queue_listing(&self) -> ListSnapshot {
        self.queue.snapshot(LISTING_LIMIT)
    }

    /// First entries of the history, most recent first
    pub fn history_listing(&self) -> ListSnapshot {
        ListSnapshot {
            entries: self
                .history
                .newest_first()
                .take(LISTING_LIMIT)
                .cloned()
                .collect(),
            total: self.history.len(),
        }
    }
}

impl Default for GuildMusicState {
    fn default() -> Self {
        Self::new(20)
    }
}
