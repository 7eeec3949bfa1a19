//! Banner Demo
//!
//! Replays the banner demo screen: two banners, cleared after two seconds,
//! four banners after five, auto-advancing with a dot indicator.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod demo;

use config::DemoConfig;
use demo::Demo;

#[derive(Parser)]
#[command(name = "banner-demo")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Auto-advancing banner carousel demo", long_about = None)]
struct Cli {
    /// Demo config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seconds of demo time to run
    #[arg(short, long, default_value = "12")]
    duration: u64,

    /// Play in wall-clock time instead of finishing instantly
    #[arg(long)]
    realtime: bool,

    /// Tap the banner after this many seconds
    #[arg(long)]
    tap_at: Option<f64>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = DemoConfig::load(cli.config.as_deref())?;
    info!(
        "rolling every {}s, {} banners first, {} later",
        config.widget.rolling_frequency_secs,
        config.script.initial_images.len(),
        config.script.refill_images.len()
    );

    let demo = Demo::new(config)?;
    if let Some(secs) = cli.tap_at {
        let delay = Duration::try_from_secs_f64(secs)
            .map_err(|err| anyhow::anyhow!("Invalid --tap-at {}: {}", secs, err))?;
        demo.tap_at(delay)?;
    }

    let end = Duration::from_secs(cli.duration);
    let delivered = if cli.realtime {
        demo.run_realtime(end).await
    } else {
        demo.run_virtual(end)
    };
    info!("{} messages delivered", delivered);

    demo.finish()
}
