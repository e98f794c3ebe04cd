/// Configuration loading tests
use chorus_bot::{BotConfig, BotError};
use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn env(vars: &[(&str, &str)]) -> Option<HashMap<String, String>> {
    Some(
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_defaults_with_token_from_env() {
    let config = BotConfig::load_from(None, env(&[("DISCORD_TOKEN", "abc")])).unwrap();

    assert_eq!(config.discord.token, "abc");
    assert_eq!(config.discord.prefix, "!");
    assert_eq!(config.playback.history_size, 20);
    assert_eq!(config.health.port, 5000);
    assert!(config.spotify_credentials().is_none());
    config.validate().unwrap();

    let playback = config.playback_config();
    assert_eq!(playback.default_volume, 0.5);
    assert_eq!(playback.idle_timeout, Duration::from_secs(300));
}

#[test]
fn test_missing_token_fails_validation() {
    let config = BotConfig::load_from(None, env(&[])).unwrap();
    assert!(matches!(config.validate(), Err(BotError::Config(_))));
}

#[test]
fn test_file_values() {
    let file = config_file(
        r#"
[discord]
token = "from-file"
prefix = "?"

[playback]
history_size = 5
idle_timeout_secs = 60

[spotify]
client_id = "id"
client_secret = "secret"
"#,
    );

    let config = BotConfig::load_from(Some(file.path()), env(&[])).unwrap();

    assert_eq!(config.discord.token, "from-file");
    assert_eq!(config.discord.prefix, "?");
    assert_eq!(config.playback.history_size, 5);
    assert_eq!(config.playback_config().idle_timeout, Duration::from_secs(60));
    assert!(config.spotify_credentials().is_some());
}

#[test]
fn test_environment_overrides_file() {
    let file = config_file(
        r#"
[discord]
token = "from-file"

[health]
port = 8080
"#,
    );

    let config = BotConfig::load_from(
        Some(file.path()),
        env(&[
            ("CHORUS__DISCORD__PREFIX", "$"),
            ("DISCORD_TOKEN", "from-env"),
            ("PORT", "9000"),
        ]),
    )
    .unwrap();

    assert_eq!(config.discord.prefix, "$");
    assert_eq!(config.discord.token, "from-env");
    assert_eq!(config.health.port, 9000);
}

#[test]
fn test_invalid_port() {
    let result = BotConfig::load_from(None, env(&[("PORT", "http")]));
    assert!(matches!(result, Err(BotError::Config(_))));
}

#[test]
fn test_missing_explicit_file() {
    let result = BotConfig::load_from(
        Some(std::path::Path::new("/nonexistent/chorus.toml")),
        env(&[]),
    );
    assert!(result.is_err());
}

#[test]
fn test_validation_rejects_bad_values() {
    let mut config = BotConfig::load_from(None, env(&[("DISCORD_TOKEN", "abc")])).unwrap();
    config.playback.default_volume = 1.5;
    assert!(config.validate().is_err());

    config.playback.default_volume = 0.5;
    config.playback.history_size = 0;
    assert!(config.validate().is_err());

    config.playback.history_size = 20;
    config.discord.prefix = "a b".to_string();
    assert!(config.validate().is_err());
}
