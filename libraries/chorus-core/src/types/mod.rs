//! Domain types shared across crates

mod effect;
mod ids;
mod repeat;
mod track;

pub use effect::EffectMode;
pub use ids::{GuildId, PlaybackToken};
pub use repeat::RepeatMode;
pub use track::{CatalogTrack, CollectionKind, ResolvedTrack, StreamHandle, TrackRef};
