/// Chat reply formatting
use crate::commands::ParseError;
use chorus_core::{EffectMode, RepeatMode};
use chorus_playback::{
    EffectOutcome, ListSnapshot, NowPlaying, PlayOutcome, PlaybackError, PlaybackNotice,
};
use std::fmt::Write;
use std::time::Duration;

/// Marker shown before a title for the repeat mode
pub fn repeat_marker(mode: RepeatMode) -> &'static str {
    match mode {
        RepeatMode::Off => "",
        RepeatMode::Track => "🔂 ",
        RepeatMode::Queue => "🔁 ",
    }
}

/// Marker shown before a title for a non-normal effect
pub fn effect_marker(effect: EffectMode) -> String {
    if effect.is_normal() {
        String::new()
    } else {
        format!("🎛️[{}] ", effect)
    }
}

/// `m:ss`, or `h:mm:ss` for an hour or more
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

pub fn play_outcome(outcome: &PlayOutcome) -> String {
    match outcome {
        PlayOutcome::Started { title, queued: 0 } => format!("🎵 Now playing: **{}**", title),
        PlayOutcome::Started { title, queued } => format!(
            "🎵 Now playing: **{}**\n📝 {} more added to the queue",
            title, queued
        ),
        PlayOutcome::Queued { position, added: 1 } => {
            format!("📝 Added to the queue at position {}", position)
        }
        PlayOutcome::Queued { position, added } => format!(
            "📝 Added {} tracks to the queue starting at position {}",
            added, position
        ),
        PlayOutcome::Discarded => "⏹️ Playback was stopped before the track started".to_string(),
    }
}

pub fn effect_outcome(effect: EffectMode, outcome: &EffectOutcome) -> String {
    match outcome {
        EffectOutcome::Restarted { title } => {
            format!("🎛️ Effect **{}** applied, restarting **{}**", effect, title)
        }
        EffectOutcome::Deferred => {
            format!("🎛️ Effect **{}** will apply to the next track", effect)
        }
    }
}

pub fn error(err: &PlaybackError) -> String {
    match err {
        PlaybackError::ResolutionFailed { reference, cause } => {
            format!("❌ Could not play `{}`: {}", reference, cause)
        }
        PlaybackError::NothingPlaying => "❌ Nothing is playing right now!".to_string(),
        PlaybackError::InvalidArgument(msg) => format!("❌ {}", msg),
        PlaybackError::CatalogUnavailable(_) => {
            "❌ Could not get any tracks from that Spotify link".to_string()
        }
        PlaybackError::NotInVoiceChannel => {
            "❌ You need to join a voice channel first!".to_string()
        }
        PlaybackError::Voice(msg) => format!("❌ Voice error: {}", msg),
    }
}

pub fn parse_error(err: &ParseError, prefix: &str) -> String {
    match err {
        ParseError::Unknown(_) => format!(
            "❌ Command not found! Use `{}mhelp` to see all commands.",
            prefix
        ),
        ParseError::MissingArgument(usage) => {
            format!("❌ Missing argument! Usage: `{}{}`", prefix, usage)
        }
        ParseError::Invalid(msg) => format!("❌ {}", msg),
    }
}

/// Text for a playback notice, `None` for notices that stay silent
pub fn notice(notice: &PlaybackNotice) -> Option<String> {
    match notice {
        PlaybackNotice::NowPlaying {
            title,
            repeat,
            effect,
            ..
        } => Some(format!(
            "🎵 {}{}Now playing: **{}**",
            repeat_marker(*repeat),
            effect_marker(*effect),
            title
        )),
        PlaybackNotice::Repeating { title, .. } => Some(format!("🔂 Repeating: **{}**", title)),
        PlaybackNotice::ResolutionFailed {
            reference, cause, ..
        } => Some(format!("❌ Skipping `{}`: {}", reference, cause)),
        PlaybackNotice::QueueFinished { .. } | PlaybackNotice::Left { .. } => None,
    }
}

pub fn now_playing(now: &NowPlaying) -> String {
    let mut text = format!(
        "🎵 {}{}Now playing: **{}**",
        repeat_marker(now.repeat),
        effect_marker(now.effect),
        now.title
    );
    if let Some(duration) = now.duration {
        let _ = write!(text, "\n⏱️ Duration: {}", format_duration(duration));
    }
    let _ = write!(text, "\n🔊 Volume: {}%", now.volume_percent);
    let _ = write!(text, "\n🔁 Repeat: {}", now.repeat);
    if now.paused {
        text.push_str("\n⏸️ Paused");
    }
    text
}

/// Numbered listing with a "more" line for hidden entries
pub fn listing(title: &str, snapshot: &ListSnapshot, empty: &str) -> String {
    if snapshot.is_empty() {
        return empty.to_string();
    }

    let mut text = format!("**{}** ({} total)", title, snapshot.total);
    for (i, entry) in snapshot.entries.iter().enumerate() {
        let _ = write!(text, "\n{}. {}", i + 1, entry);
    }
    if snapshot.hidden() > 0 {
        let _ = write!(text, "\n... and {} more", snapshot.hidden());
    }
    text
}

pub fn repeat_mode(mode: RepeatMode) -> String {
    match mode {
        RepeatMode::Off => "➡️ Repeat is **off**".to_string(),
        RepeatMode::Track => "🔂 Repeating the current **track**".to_string(),
        RepeatMode::Queue => "🔁 Repeating the **queue**".to_string(),
    }
}

pub fn effects(current: EffectMode) -> String {
    let mut text = String::from("🎛️ **Available effects**");
    for effect in EffectMode::ALL {
        let marker = if effect == current { " ◀ active" } else { "" };
        let _ = write!(text, "\n• `{}`{}", effect, marker);
    }
    text
}

pub fn help(prefix: &str) -> String {
    let commands: [(&str, &str); 17] = [
        ("join", "Join your voice channel"),
        ("play <song|link>", "Play or queue a song, YouTube link or Spotify link"),
        ("skip", "Skip the current track"),
        ("stop", "Stop and clear the queue"),
        ("pause", "Pause playback"),
        ("resume", "Resume playback"),
        ("volume <0-100>", "Set the volume"),
        ("effect <name>", "Apply an audio effect"),
        ("effects", "List audio effects"),
        ("repeat [off|track|queue]", "Set or cycle the repeat mode"),
        ("nowplaying", "Show the current track"),
        ("queue", "Show the queue"),
        ("history", "Show recently played tracks"),
        ("shuffle", "Shuffle the queue"),
        ("clear", "Clear the queue"),
        ("leave", "Leave the voice channel"),
        ("mhelp", "Show this message"),
    ];

    let mut text = String::from("🎵 **Music commands**");
    for (usage, description) in commands {
        let _ = write!(text, "\n`{}{}` - {}", prefix, usage, description);
    }
    text
}
