//! Track references, resolved tracks, and catalog items

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A search term or direct locator, not yet resolved to a stream
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackRef(String);

impl TrackRef {
    /// Create a new track reference
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is a direct locator (URL) rather than free text
    pub fn is_locator(&self) -> bool {
        self.0.starts_with("http://") || self.0.starts_with("https://")
    }
}

impl From<&str> for TrackRef {
    fn from(reference: &str) -> Self {
        Self::new(reference)
    }
}

impl From<String> for TrackRef {
    fn from(reference: String) -> Self {
        Self(reference)
    }
}

impl fmt::Display for TrackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How to open a resolved stream
///
/// Produced by a `TrackResolver` for one effect; consumed by a `VoiceSink`.
/// Streams expire, so a handle must not be reused to replay a track later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamHandle {
    /// Direct media URL
    pub url: String,

    /// HTTP headers the media host expects
    pub http_headers: Vec<(String, String)>,

    /// ffmpeg input options (placed before `-i`)
    pub input_args: Vec<String>,

    /// ffmpeg audio filter for the requested effect
    pub filter: Option<String>,
}

/// A track resolved to playable audio plus metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTrack {
    /// Display title
    pub title: String,

    /// Duration, `None` for live streams
    pub duration: Option<Duration>,

    /// Stream to hand to the voice sink
    pub stream: StreamHandle,

    /// Stable locator for resolving the same track again (e.g. the page URL)
    pub canonical_reference: TrackRef,
}

/// Shape of an expandable catalog reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    /// User playlist
    Playlist,

    /// Album
    Album,

    /// Single track
    Track,
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CollectionKind::Playlist => "playlist",
            CollectionKind::Album => "album",
            CollectionKind::Track => "track",
        })
    }
}

/// One entry of an expanded catalog collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTrack {
    /// Primary artist name
    pub artist: String,

    /// Track title
    pub title: String,
}

impl CatalogTrack {
    /// Create a new catalog entry
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
        }
    }

    /// "artist title" search term, `None` when either part is blank
    pub fn search_term(&self) -> Option<String> {
        let artist = self.artist.trim();
        let title = self.title.trim();
        if artist.is_empty() || title.is_empty() {
            return None;
        }
        Some(format!("{} {}", artist, title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locator_detection() {
        assert!(TrackRef::new("https://youtu.be/abc").is_locator());
        assert!(!TrackRef::new("daft punk one more time").is_locator());
    }

    #[test]
    fn search_term_joins_artist_and_title() {
        let track = CatalogTrack::new("Daft Punk", " One More Time ");
        assert_eq!(track.search_term().as_deref(), Some("Daft Punk One More Time"));
    }

    #[test]
    fn search_term_requires_both_parts() {
        assert_eq!(CatalogTrack::new("", "Intro").search_term(), None);
        assert_eq!(CatalogTrack::new("Artist", "  ").search_term(), None);
    }
}
