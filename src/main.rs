//! Demo driver: signs into the pets backend, runs the vitals simulation
//! for the first pet, and logs mood transitions until interrupted.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error, info};

use petvitals::api::{ApiConfig, HttpBackend};
use petvitals::{SimTuning, VitalsSession};

#[derive(Debug, Parser)]
#[command(name = "petvitals", version, about = "Virtual-pet vitals simulation driver")]
struct Cli {
    /// Backend base URL (overrides PETVITALS_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Bearer token (overrides PETVITALS_TOKEN)
    #[arg(long)]
    token: Option<String>,

    /// Info-level logging
    #[arg(short, long)]
    verbose: bool,

    /// Debug-level logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(log_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting petvitals {}", env!("CARGO_PKG_VERSION"));

    let mut config = ApiConfig::from_env().unwrap_or_else(|e| {
        debug!("{e}; falling back to defaults");
        ApiConfig::default()
    });
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(token) = cli.token {
        config.token = token;
    }

    let backend = Arc::new(HttpBackend::new(config).context("building API client")?);
    let session = VitalsSession::new(backend, SimTuning::default());
    session.start().await.context("initial fetch")?;

    let mut view_rx = session.subscribe();
    let mut last_mood = None;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted; shutting down");
                break;
            }
            changed = view_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = view_rx.borrow_and_update().clone();
                if view.unauthenticated {
                    error!("session unauthenticated; sign in again");
                    break;
                }
                if view.mood != last_mood {
                    if let (Some(pet), Some(mood)) = (&view.active, view.mood) {
                        info!(
                            pet = pet.id,
                            hunger = pet.hunger,
                            happiness = pet.happiness,
                            "{} is {mood}",
                            pet.name
                        );
                    }
                    last_mood = view.mood;
                }
            }
        }
    }

    session.shutdown();
    Ok(())
}
