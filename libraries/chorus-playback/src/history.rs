//! Playback history tracking
//!
//! Bounded record of track starts, used for the history listing and for
//! rebuilding the queue when queue repeat runs dry.

use chorus_core::TrackRef;
use std::collections::VecDeque;

/// Playback history with bounded size
///
/// Ring buffer in chronological order: oldest at the front, most recent at
/// the back. Pushing onto a full history discards the oldest entry.
#[derive(Debug, Clone)]
pub struct History {
    /// History buffer (most recent = back)
    tracks: VecDeque<TrackRef>,

    /// Maximum history size
    max_size: usize,
}

impl History {
    /// Create new history with specified maximum size
    pub fn new(max_size: usize) -> Self {
        Self {
            tracks: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Record a track start
    ///
    /// If history is full, oldest track is discarded
    pub fn push(&mut self, track: TrackRef) {
        if self.max_size == 0 {
            return;
        }
        if self.tracks.len() >= self.max_size {
            self.tracks.pop_front();
        }
        self.tracks.push_back(track);
    }

    /// Most recent track
    pub fn peek(&self) -> Option<&TrackRef> {
        self.tracks.back()
    }

    /// All entries, oldest first
    pub fn oldest_first(&self) -> impl Iterator<Item = &TrackRef> {
        self.tracks.iter()
    }

    /// All entries, most recent first
    pub fn newest_first(&self) -> impl Iterator<Item = &TrackRef> {
        self.tracks.iter().rev()
    }

    /// Get number of tracks in history
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if history is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    /// Get maximum history size
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(20)
    }
}
