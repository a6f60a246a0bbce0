//! Application configuration for the `stream-player` binary.
//!
//! Precedence, lowest to highest: built-in defaults, config file,
//! `STREAM_PLAYER__*` environment variables, CLI flags (which also read their
//! own environment variables through clap).

use std::ffi::OsString;
use std::path::Path;

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::player::{DEFAULT_LOG_LIMIT, PlayerProps};
use crate::stream::StreamType;

/// Prefix for environment overrides, e.g. `STREAM_PLAYER__PLAYER__LOG_LIMIT=50`.
pub const ENV_PREFIX: &str = "STREAM_PLAYER";

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_NAME: &str = "stream-player";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "STREAM_PLAYER_CONFIG")]
    pub config: Option<String>,

    /// Stream type (websocket, sse, http, long-polling, hls, webrtc), case-insensitive
    #[arg(short = 't', long = "type")]
    pub kind: Option<StreamType>,

    /// Stream URL, stored as `config.url`
    #[arg(long)]
    pub url: Option<String>,

    /// Open the stream immediately after mounting
    #[arg(long)]
    pub auto_open: Option<bool>,

    /// Maximum messages kept in the log
    #[arg(long)]
    pub log_limit: Option<usize>,

    /// Print notifications as Server-Sent Events frames
    #[arg(long)]
    pub emit_events: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub player: PlayerProps,
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    /// Fallback filter when `RUST_LOG` is unset.
    pub filter: String,
    /// Emit JSON log lines instead of the compact format.
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub emit_events: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("player.type", "sse")?
            .set_default("player.auto_open", false)?
            .set_default("player.log_limit", DEFAULT_LOG_LIMIT as u64)?
            .set_default("telemetry.filter", "info,stream_player=debug")?
            .set_default("telemetry.json", false)?
            .set_default("output.emit_events", false)?;

        builder = match &cli.config {
            Some(path) => builder.add_source(File::from(Path::new(path))),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_NAME).required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(kind) = cli.kind {
            builder = builder.set_override("player.type", kind.as_str())?;
        }
        if let Some(url) = cli.url {
            builder = builder.set_override("player.config.url", url)?;
        }
        if let Some(auto_open) = cli.auto_open {
            builder = builder.set_override("player.auto_open", auto_open)?;
        }
        if let Some(log_limit) = cli.log_limit {
            builder = builder.set_override("player.log_limit", log_limit as u64)?;
        }
        if cli.emit_events {
            builder = builder.set_override("output.emit_events", true)?;
        }

        builder.build()?.try_deserialize()
    }
}
