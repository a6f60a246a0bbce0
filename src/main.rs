//! Stream Player preview
//!
//! Mounts a player over the in-process loopback adapter, feeds it one message
//! per stdin line, and prints the rendered HTML fragment.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use stream_player::config::AppConfig;
use stream_player::player::{PlayerEvent, StreamPlayer, sse_event};
use stream_player::stream::{LoopbackFactory, StreamAdapter};
use stream_player::{PlayerSlots, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let config = AppConfig::load().context("Failed to load configuration")?;
    telemetry::init(&config.telemetry);

    info!(
        name: "player.config.loaded",
        kind = %config.player.kind,
        auto_open = config.player.auto_open,
        log_limit = config.player.log_limit,
        "Player configuration loaded"
    );

    let factory = Arc::new(LoopbackFactory::new());
    let mut player = StreamPlayer::new(config.player.clone(), factory.clone());

    let emit_events = config.output.emit_events;
    let _events = player.handle().subscribe(Arc::new(move |event: &PlayerEvent| {
        info!(name: "player.event", event = event.name(), "Player notification");
        if emit_events {
            print!("{}", sse_event(event));
        }
    }));

    player.mount().await.context("Failed to mount stream player")?;

    let stream = factory
        .latest()
        .context("Loopback factory produced no stream")?;
    if !stream.state().is_open {
        stream.open().await.context("Failed to open loopback stream")?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let message = serde_json::from_str::<Value>(&line).unwrap_or(Value::String(line));
        if let Err(e) = stream.push(message) {
            warn!(name: "player.input.dropped", error = %e, "Dropped input line");
        }
    }

    println!("{}", player.to_html(&PlayerSlots::default()));
    player.unmount();
    Ok(())
}
