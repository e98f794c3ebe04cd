//! Audio effects
//!
//! Effects are applied when a track is resolved into a stream, as an ffmpeg
//! audio filter. Changing the effect of a playing track therefore means
//! resolving it again.

use crate::error::UnknownName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Audio effect applied to a guild's streams
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectMode {
    /// No processing
    #[default]
    Normal,

    /// Low-shelf boost
    BassBoost,

    /// Sped up and pitched up
    Nightcore,

    /// Slowed down and pitched down
    Slowed,

    /// Slowed with tremolo
    Vaporwave,

    /// Slow stereo panning
    #[serde(rename = "8d")]
    EightD,

    /// Single long echo
    Echo,

    /// High-shelf boost
    Treble,
}

impl EffectMode {
    /// Every effect, in display order
    pub const ALL: [EffectMode; 8] = [
        EffectMode::Normal,
        EffectMode::BassBoost,
        EffectMode::Nightcore,
        EffectMode::Slowed,
        EffectMode::Vaporwave,
        EffectMode::EightD,
        EffectMode::Echo,
        EffectMode::Treble,
    ];

    /// Name used in commands and messages
    pub fn name(self) -> &'static str {
        match self {
            EffectMode::Normal => "normal",
            EffectMode::BassBoost => "bassboost",
            EffectMode::Nightcore => "nightcore",
            EffectMode::Slowed => "slowed",
            EffectMode::Vaporwave => "vaporwave",
            EffectMode::EightD => "8d",
            EffectMode::Echo => "echo",
            EffectMode::Treble => "treble",
        }
    }

    /// ffmpeg `-af` filter graph, `None` for `Normal`
    pub fn ffmpeg_filter(self) -> Option<&'static str> {
        match self {
            EffectMode::Normal => None,
            EffectMode::BassBoost => Some("bass=g=10"),
            EffectMode::Nightcore => Some("asetrate=44100*1.25,atempo=1.25"),
            EffectMode::Slowed => Some("asetrate=44100*0.8,atempo=0.8"),
            EffectMode::Vaporwave => Some("asetrate=44100*0.9,atempo=0.9,tremolo=5:0.7"),
            EffectMode::EightD => Some("apulsator=hz=0.125"),
            EffectMode::Echo => Some("aecho=0.8:0.9:1000:0.3"),
            EffectMode::Treble => Some("treble=g=5"),
        }
    }

    /// Whether this is the pass-through effect
    pub fn is_normal(self) -> bool {
        self == EffectMode::Normal
    }
}

impl fmt::Display for EffectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EffectMode {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        EffectMode::ALL
            .into_iter()
            .find(|effect| effect.name() == wanted)
            .ok_or_else(|| UnknownName::new("effect", s))
    }
}
