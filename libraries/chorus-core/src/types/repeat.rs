/// Repeat (loop) mode
use crate::error::UnknownName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Repeat mode for a guild
///
/// Guild-scoped: persists across track transitions until changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop when the queue runs out
    #[default]
    Off,

    /// Replay the current track
    Track,

    /// Cycle the entire play order indefinitely
    Queue,
}

impl RepeatMode {
    /// Next mode in the Off -> Track -> Queue -> Off cycle
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::Track,
            RepeatMode::Track => RepeatMode::Queue,
            RepeatMode::Queue => RepeatMode::Off,
        }
    }

    /// Canonical lowercase name
    pub fn name(self) -> &'static str {
        match self {
            RepeatMode::Off => "off",
            RepeatMode::Track => "track",
            RepeatMode::Queue => "queue",
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RepeatMode {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" | "0" => Ok(RepeatMode::Off),
            "track" | "song" | "one" | "1" => Ok(RepeatMode::Track),
            "queue" | "all" | "2" => Ok(RepeatMode::Queue),
            _ => Err(UnknownName::new("repeat mode", s)),
        }
    }
}
