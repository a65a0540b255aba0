mod service;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use stats_engine::{SessionRoster, Settings, StatsEngine};
use stats_net::connection::default_url;
use stats_net::subjects::DEFAULT_PREFIX;
use stats_net::{NatsConnection, Subjects};
use tracing::info;

use service::StatsService;

#[derive(Parser)]
#[command(name = "stats-server", about = "Player stats engine over NATS")]
struct Args {
    /// NATS server URL (defaults to $NATS_URL, then localhost)
    #[arg(short, long)]
    nats_url: Option<String>,

    /// NATS subject prefix
    #[arg(short, long, default_value = DEFAULT_PREFIX)]
    prefix: String,

    /// Path to the JSON settings file
    #[arg(short, long)]
    settings: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => Settings::load(path),
        None => {
            info!("no settings file given, using defaults");
            Settings::default()
        }
    };

    let engine = StatsEngine::new(settings, Arc::new(SessionRoster::new()));

    let url = args.nats_url.unwrap_or_else(default_url);
    let conn = NatsConnection::connect_to(&url).await?;

    StatsService::new(engine, conn, Subjects::new(args.prefix))
        .run()
        .await
}
