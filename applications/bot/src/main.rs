/// Chorus - Discord music bot
use chorus_bot::{
    config::BotConfig, executor::Executor, handler::Handler, health, relay, HealthState,
    SongbirdSink, YtDlpResolver,
};
use chorus_catalog::{CatalogAdapter, SpotifyExpander};
use chorus_playback::{IdleMonitor, PlaybackController, StateRegistry};
use clap::{Parser, Subcommand};
use serenity::prelude::{Client, GatewayIntents};
use songbird::{SerenityInit, Songbird};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "chorus-bot")]
#[command(about = "Discord music bot with per-guild queues", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Discord and start playing (default)
    Run {
        /// Configuration file path
        #[arg(short, long, env = "CHORUS_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Load and validate the configuration, then exit
    CheckConfig {
        /// Configuration file path
        #[arg(short, long, env = "CHORUS_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "chorus_bot=info,chorus_playback=info,chorus_catalog=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run { config: None }) {
        Commands::Run { config } => {
            run(config).await?;
        }
        Commands::CheckConfig { config } => {
            check_config(config)?;
        }
    }

    Ok(())
}

fn check_config(path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = BotConfig::load(path.as_deref())?;
    config.validate()?;

    println!("Configuration OK");
    println!("  prefix:       {}", config.discord.prefix);
    println!(
        "  spotify:      {}",
        if config.spotify_credentials().is_some() {
            "configured"
        } else {
            "not configured"
        }
    );
    println!("  history size: {}", config.playback.history_size);
    println!("  idle timeout: {}s", config.playback.idle_timeout_secs);
    if config.health.enabled {
        println!("  health:       {}:{}", config.health.host, config.health.port);
    }
    Ok(())
}

async fn run(path: Option<PathBuf>) -> anyhow::Result<()> {
    // Load configuration
    let config = BotConfig::load(path.as_deref())?;
    config.validate()?;

    tracing::info!("Starting Chorus");
    tracing::info!("Command prefix: {}", config.discord.prefix);

    // Playback
    let songbird = Songbird::serenity();
    let playback_config = config.playback_config();
    let registry = Arc::new(StateRegistry::new(playback_config.history_size));
    let controller = Arc::new(PlaybackController::new(
        registry,
        Arc::new(YtDlpResolver::new(config.tools.ytdlp.clone())),
        Arc::new(SongbirdSink::new(
            Arc::clone(&songbird),
            config.tools.ffmpeg.clone(),
        )),
        playback_config.clone(),
    ));
    controller.spawn_track_end_dispatcher();
    let monitor = Arc::new(IdleMonitor::new(
        Arc::clone(&controller),
        playback_config.idle_timeout,
    ));

    // Catalog
    let credentials = config.spotify_credentials();
    if credentials.is_none() {
        tracing::warn!("Spotify credentials not set, Spotify links will be rejected");
    }
    let catalog = Arc::new(CatalogAdapter::new(Arc::new(SpotifyExpander::new(
        credentials,
    )?)));

    // Health endpoint
    let health_state = HealthState::new();
    if config.health.enabled {
        let addr = SocketAddr::from((
            config.health.host.parse::<std::net::IpAddr>()?,
            config.health.port,
        ));
        let state = health_state.clone();
        tokio::spawn(async move {
            if let Err(e) = health::serve(addr, state).await {
                tracing::error!("Health endpoint stopped: {}", e);
            }
        });
    }

    // Gateway
    let channels = relay::NoticeChannels::new();
    let handler = Handler::new(
        Executor::new(
            Arc::clone(&controller),
            catalog,
            config.discord.prefix.clone(),
        ),
        monitor,
        Arc::clone(&songbird),
        channels.clone(),
        health_state,
    );

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_VOICE_STATES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord.token, intents)
        .event_handler(handler)
        .register_songbird_with(songbird)
        .await?;

    relay::spawn_notice_relay(Arc::clone(&client.http), channels, controller.subscribe());

    let shard_manager = Arc::clone(&client.shard_manager);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutting down");
            shard_manager.shutdown_all().await;
        }
    });

    client.start().await?;
    Ok(())
}
