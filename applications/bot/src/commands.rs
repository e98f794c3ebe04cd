/// Text command parsing
use chorus_core::{EffectMode, RepeatMode};
use thiserror::Error;

/// A parsed guild command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Join,
    Play(String),
    Skip,
    Stop,
    Pause,
    Resume,
    Volume(i64),
    Effect(EffectMode),
    Effects,
    /// `None` cycles to the next mode
    Repeat(Option<RepeatMode>),
    NowPlaying,
    Queue,
    History,
    Shuffle,
    Clear,
    Leave,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Missing argument, usage: {0}")]
    MissingArgument(&'static str),

    #[error("{0}")]
    Invalid(String),
}

/// Parse a message addressed to the bot
///
/// Returns `None` when the message does not start with `prefix` or holds
/// nothing but the prefix.
pub fn parse(prefix: &str, content: &str) -> Option<Result<Command, ParseError>> {
    let rest = content.trim_start().strip_prefix(prefix)?;
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
        None => (rest.trim_end(), None),
    };
    if name.is_empty() {
        return None;
    }

    let command = match name.to_lowercase().as_str() {
        "join" | "connect" => Ok(Command::Join),
        "play" | "p" => arg
            .map(|query| Command::Play(query.to_string()))
            .ok_or(ParseError::MissingArgument("play <song name or link>")),
        "skip" | "next" => Ok(Command::Skip),
        "stop" => Ok(Command::Stop),
        "pause" => Ok(Command::Pause),
        "resume" | "unpause" => Ok(Command::Resume),
        "volume" | "vol" => parse_volume(arg),
        "effect" | "fx" => match arg {
            Some(name) => name
                .parse()
                .map(Command::Effect)
                .map_err(|e: chorus_core::UnknownName| ParseError::Invalid(e.to_string())),
            None => Err(ParseError::MissingArgument("effect <name>")),
        },
        "effects" => Ok(Command::Effects),
        "repeat" | "loop" => arg
            .map(str::parse::<RepeatMode>)
            .transpose()
            .map(Command::Repeat)
            .map_err(|e| ParseError::Invalid(e.to_string())),
        "nowplaying" | "np" => Ok(Command::NowPlaying),
        "queue" | "q" => Ok(Command::Queue),
        "history" => Ok(Command::History),
        "shuffle" => Ok(Command::Shuffle),
        "clear" => Ok(Command::Clear),
        "leave" | "disconnect" => Ok(Command::Leave),
        "mhelp" => Ok(Command::Help),
        other => Err(ParseError::Unknown(other.to_string())),
    };
    Some(command)
}

fn parse_volume(arg: Option<&str>) -> Result<Command, ParseError> {
    let arg = arg.ok_or(ParseError::MissingArgument("volume <0-100>"))?;
    arg.trim_end_matches('%')
        .parse::<i64>()
        .map(Command::Volume)
        .map_err(|_| ParseError::Invalid("Volume must be a number between 0 and 100".to_string()))
}
