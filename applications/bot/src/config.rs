/// Bot configuration
use crate::error::{BotError, Result};
use chorus_catalog::SpotifyCredentials;
use chorus_playback::PlaybackConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file, read if present
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    #[serde(default)]
    pub discord: DiscordSettings,

    #[serde(default)]
    pub spotify: SpotifySettings,

    #[serde(default)]
    pub playback: PlaybackSettings,

    #[serde(default)]
    pub health: HealthSettings,

    #[serde(default)]
    pub tools: ToolSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiscordSettings {
    #[serde(default)]
    pub token: String,

    #[serde(default = "default_prefix")]
    pub prefix: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SpotifySettings {
    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default)]
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    #[serde(default = "default_volume")]
    pub default_volume: f32,

    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolSettings {
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp: PathBuf,

    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg: PathBuf,
}

/// Plain environment variables that override everything else
const LEGACY_OVERRIDES: [(&str, &str); 4] = [
    ("DISCORD_TOKEN", "discord.token"),
    ("SPOTIFY_CLIENT_ID", "spotify.client_id"),
    ("SPOTIFY_CLIENT_SECRET", "spotify.client_secret"),
    ("PORT", "health.port"),
];

impl BotConfig {
    /// Load configuration from file and the process environment
    ///
    /// Sources, later ones winning:
    /// 1. `path`, or `config.toml` if it exists
    /// 2. `CHORUS__SECTION__KEY` variables
    /// 3. `DISCORD_TOKEN`, `SPOTIFY_CLIENT_ID`, `SPOTIFY_CLIENT_SECRET`, `PORT`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(path, None)
    }

    /// Load configuration with an explicit environment instead of the process one
    pub fn load_from(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        let lookup = |key: &str| match &env {
            Some(vars) => vars.get(key).cloned(),
            None => std::env::var(key).ok(),
        };
        let legacy: Vec<(&str, Option<String>)> = LEGACY_OVERRIDES
            .iter()
            .map(|(var, key)| (*key, lookup(var).filter(|v| !v.is_empty())))
            .collect();

        // Override with environment variables (CHORUS__DISCORD__PREFIX etc.)
        settings = settings.add_source(
            config::Environment::with_prefix("CHORUS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        for (key, value) in legacy {
            if key == "health.port" {
                let port = value
                    .map(|v| {
                        v.parse::<u16>()
                            .map_err(|_| BotError::Config(format!("PORT is not a port: {}", v)))
                    })
                    .transpose()?;
                settings = settings.set_override_option(key, port.map(i64::from))?;
            } else {
                settings = settings.set_override_option(key, value)?;
            }
        }

        settings.build()?.try_deserialize().map_err(BotError::from)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.discord.token.trim().is_empty() {
            return Err(BotError::Config(
                "Discord token is required (set DISCORD_TOKEN)".to_string(),
            ));
        }

        if self.discord.prefix.is_empty() || self.discord.prefix.contains(char::is_whitespace) {
            return Err(BotError::Config(format!(
                "Invalid command prefix {:?}",
                self.discord.prefix
            )));
        }

        if !(0.0..=1.0).contains(&self.playback.default_volume) {
            return Err(BotError::Config(format!(
                "Default volume must be between 0.0 and 1.0, got {}",
                self.playback.default_volume
            )));
        }

        if self.playback.history_size == 0 {
            return Err(BotError::Config(
                "History size must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Playback controller settings
    pub fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            history_size: self.playback.history_size,
            default_volume: self.playback.default_volume,
            idle_timeout: Duration::from_secs(self.playback.idle_timeout_secs),
        }
    }

    /// Spotify credentials, if both parts are set
    pub fn spotify_credentials(&self) -> Option<SpotifyCredentials> {
        SpotifyCredentials::from_parts(
            self.spotify.client_id.clone(),
            self.spotify.client_secret.clone(),
        )
    }
}

impl Default for DiscordSettings {
    fn default() -> Self {
        Self {
            token: String::new(),
            prefix: default_prefix(),
        }
    }
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            history_size: default_history_size(),
            default_volume: default_volume(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ytdlp: default_ytdlp_path(),
            ffmpeg: default_ffmpeg_path(),
        }
    }
}

// Default values
fn default_prefix() -> String {
    "!".to_string()
}

fn default_history_size() -> usize {
    20
}

fn default_volume() -> f32 {
    0.5
}

fn default_idle_timeout_secs() -> u64 {
    300
}

fn default_enabled() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_ytdlp_path() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}
