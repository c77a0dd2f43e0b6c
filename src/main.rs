use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use matchup_sim::config::Config;
use matchup_sim::predict::{GbtModel, FEATURE_COLUMNS};
use matchup_sim::server::{self, AppState};
use matchup_sim::store::{SupabaseStore, TeamStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    // Load the model once; it is read-only shared state for the whole process.
    let model = GbtModel::load(&config.model_path)
        .with_context(|| format!("Failed to load model artifact '{}'", config.model_path))?;
    if model.num_features() != FEATURE_COLUMNS.len() {
        anyhow::bail!(
            "Model expects {} features but the store schema defines {}; \
             the artifact and the feature list are out of sync",
            model.num_features(),
            FEATURE_COLUMNS.len()
        );
    }
    info!(
        "Model loaded from '{}': {} trees, {} features",
        config.model_path,
        model.num_trees(),
        model.num_features()
    );

    let store = SupabaseStore::new(&config.supabase_url, &config.supabase_key, &config.table)?;
    info!(
        "Statistics store: {} table '{}' at {}",
        store.name(),
        config.table,
        config.supabase_url
    );

    let state = AppState {
        store: Arc::new(store),
        model: Arc::new(model),
        default_simulations: config.default_simulations,
    };

    let app = server::router(state);
    let addr: SocketAddr = config.listen_addr.parse().context("Invalid listen address")?;
    info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
