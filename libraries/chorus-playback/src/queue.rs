//! Playback queue
//!
//! Plain FIFO of track references. Insertion order is play order.

use crate::types::ListSnapshot;
use chorus_core::TrackRef;
use rand::seq::SliceRandom;
use rand::thread_rng;
use std::collections::VecDeque;

/// FIFO queue of references waiting to play
#[derive(Debug, Clone, Default)]
pub struct TrackQueue {
    tracks: VecDeque<TrackRef>,
}

impl TrackQueue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the back; returns the 1-based position
    pub fn push(&mut self, track: TrackRef) -> usize {
        self.tracks.push_back(track);
        self.tracks.len()
    }

    /// Append several references in order
    pub fn extend(&mut self, tracks: impl IntoIterator<Item = TrackRef>) {
        self.tracks.extend(tracks);
    }

    /// Take the next reference to play
    pub fn pop_next(&mut self) -> Option<TrackRef> {
        self.tracks.pop_front()
    }

    /// Peek at next reference without removing
    pub fn peek_next(&self) -> Option<&TrackRef> {
        self.tracks.front()
    }

    /// References in play order
    pub fn iter(&self) -> impl Iterator<Item = &TrackRef> {
        self.tracks.iter()
    }

    /// Randomly permute the queue
    ///
    /// Pure Fisher-Yates; returns false (and leaves the queue alone) when
    /// there are fewer than two entries.
    pub fn shuffle(&mut self) -> bool {
        if self.tracks.len() < 2 {
            return false;
        }
        self.tracks.make_contiguous().shuffle(&mut thread_rng());
        true
    }

    /// Clear entire queue; returns how many entries were dropped
    pub fn clear(&mut self) -> usize {
        let dropped = self.tracks.len();
        self.tracks.clear();
        dropped
    }

    /// Listing of the first `limit` entries
    pub fn snapshot(&self, limit: usize) -> ListSnapshot {
        ListSnapshot {
            entries: self.tracks.iter().take(limit).cloned().collect(),
            total: self.tracks.len(),
        }
    }

    /// Number of queued references
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
