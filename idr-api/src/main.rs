//! idr-api - Contact identity reconciliation service
//!
//! Accepts partially-overlapping contact facts over HTTP and maintains one
//! linked cluster of records per real-world identity.

use anyhow::Result;
use clap::Parser;
use idr_api::{build_router, AppState};
use idr_common::config;
use idr_common::db::init_database;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "idr-api", about = "Contact identity reconciliation service")]
struct Cli {
    /// Folder holding the service database (overrides IDR_ROOT_FOLDER and
    /// the config file)
    #[arg(long)]
    root_folder: Option<String>,

    /// Socket address to listen on (overrides IDR_BIND and the config file)
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting IDR Identity API (idr-api) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let cli = Cli::parse();
    let cfg = config::resolve_config(cli.root_folder.as_deref(), cli.bind.as_deref())?;

    std::fs::create_dir_all(&cfg.root_folder)?;
    let db_path = cfg.database_path();
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path).await?;

    let state = AppState::new(pool, cfg.max_lock_wait_ms);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(cfg.bind).await?;
    info!("idr-api listening on http://{}", cfg.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
