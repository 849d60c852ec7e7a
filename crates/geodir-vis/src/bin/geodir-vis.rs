//! Geodir Map Server
//!
//! Load the directory records and serve the map frontend.

use std::env;
use std::path::PathBuf;

use geodir_search::load_file;
use geodir_vis::{VisConfig, VisServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "geodir_vis=info,geodir_search=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = VisConfig::from_env()?;

    // First positional argument overrides the records file
    if let Some(path) = env::args().nth(1) {
        config.records_path = PathBuf::from(path);
    }

    tracing::info!(
        "Loading {} records from {}",
        config.schema,
        config.records_path.display()
    );
    let report = load_file(&config.records_path, config.schema)?;
    if !report.rejected.is_empty() {
        tracing::warn!("{} rows skipped", report.rejected.len());
    }

    let store = report.into_store();
    tracing::info!(
        "{} records in {} categories",
        store.len(),
        store.categories().len()
    );

    let server = VisServer::from_config(store, &config);
    server.serve(config.addr).await?;

    Ok(())
}
