use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Campus event listing, registration and admin dashboard
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the persisted events, registrations and admin flag
    #[arg(long)]
    state_path: Option<PathBuf>,

    /// Port to listen on (overrides PORT)
    #[arg(long, short = 'p')]
    port: Option<u16>,

    /// Discard stored events and registrations so the sample events are loaded again
    #[arg(long)]
    reset: bool,
}

mod error;
mod logging;
mod models;
mod payment;
mod session;
mod state;
mod web;

use session::AdminSession;
use state::storage::{EVENTS_KEY, REGISTRATIONS_KEY};
use state::{create_shared_event_store, EventStore, Storage};
use web::{start_web_server, AppState, WebServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    // Recent activity shown on the admin overview
    let activity = logging::create_activity_log(500);

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(logging::ActivityLayer::new(activity.clone(), Level::INFO))
        .init();

    let state_path = args.state_path.unwrap_or_else(|| {
        std::env::var("EVENTHUB_STATE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("state"))
    });
    let storage = Storage::new(state_path);
    storage.ensure_root().await?;

    if args.reset {
        warn!("--reset: discarding stored events and registrations");
        storage.remove(EVENTS_KEY).await?;
        storage.remove(REGISTRATIONS_KEY).await?;
    }

    info!("Loading events from {}...", storage.root().display());
    let store = create_shared_event_store(EventStore::hydrate(storage.clone()).await);

    let mut web_config = WebServerConfig::from_env();
    if let Some(port) = args.port {
        web_config.port = port;
    }

    let app_state = AppState::new(
        store,
        AdminSession::new(storage),
        &web_config.checkout_key_id,
        activity,
    );

    start_web_server(web_config, app_state).await
}
