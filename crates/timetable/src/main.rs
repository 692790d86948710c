use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use timetable::config::{AppConfig, SourceKind};
use timetable::db::EventDb;
use timetable::export::IcsFileExporter;
use timetable::importer::Importer;
use timetable::server::{create_router, AppState};
use timetable::source::{MockPortalSource, ScheduleSource, WebPortalSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = load_config()?;

    let db = EventDb::open(&config.db_path)
        .with_context(|| format!("Failed to open event database at {}", config.db_path))?;

    let source: Box<dyn ScheduleSource> = match config.source {
        SourceKind::Mock => Box::new(MockPortalSource),
        SourceKind::Portal => {
            let portal = config
                .portal
                .clone()
                .context("source = \"portal\" requires a portal section")?;
            Box::new(WebPortalSource::new(portal)?)
        }
    };

    let state = Arc::new(AppState {
        db,
        importer: Importer::new(config.build_resolver()?),
        source,
        exporter: IcsFileExporter::new(&config.export_dir),
        first_weekday: config.first_weekday()?,
    });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Loads the config file named by the first CLI argument, falling back to
/// defaults when no argument is given.
fn load_config() -> anyhow::Result<AppConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from {path}");
            AppConfig::load_from_file(Path::new(&path))
                .with_context(|| format!("Failed to load config file {path}"))
        }
        None => {
            warn!("No config file given; using defaults with the mock source");
            Ok(AppConfig::default())
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to install ctrl-c handler: {err}");
        return;
    }
    info!("Shutting down");
}
