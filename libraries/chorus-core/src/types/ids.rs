/// ID types for Chorus entities
use serde::{Deserialize, Serialize};
use std::fmt;

/// Guild (server) identifier
///
/// State is fully partitioned per guild; this is the partition key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuildId(u64);

impl GuildId {
    /// Create a new guild ID
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw snowflake
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for GuildId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for GuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one `play` call on a voice sink
///
/// Every stream start gets a fresh token. End-of-track signals carry the
/// token of the play that produced them, so signals from a stream that was
/// replaced or stopped can be told apart from the live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaybackToken(u64);

impl PlaybackToken {
    /// Wrap a raw token value
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw token value
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PlaybackToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
