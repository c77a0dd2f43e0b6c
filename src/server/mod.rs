use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::error::ApiError;
use crate::predict::{feature_vector, simulate, GbtModel};
use crate::store::TeamStore;

/// How many raw rows `/preview` returns at most.
const PREVIEW_LIMIT: usize = 5;

/// Shared read-only state: the store client and the loaded model. Nothing
/// here is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TeamStore>,
    pub model: Arc<GbtModel>,
    pub default_simulations: u32,
}

/// Build the Axum router for the service.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/simulate", get(simulate_handler))
        .route("/preview", get(preview_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

#[derive(Debug, Deserialize)]
pub struct SimulateParams {
    pub team1: String,
    pub team2: String,
    pub team1_year: i32,
    pub team2_year: i32,
    pub num_simulations: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SimulateResponse {
    pub team1: String,
    pub team1_year: i32,
    pub team2: String,
    pub team2_year: i32,
    pub team1_win_prob: f64,
    pub team2_win_prob: f64,
}

/// GET /simulate?team1=..&team1_year=..&team2=..&team2_year=..&num_simulations=..
///
/// Looks up both teams' season rows, differences their statistics into the
/// model's feature vector, predicts team1's win probability, then resamples
/// it into empirical win counts over `num_simulations` simulated games.
async fn simulate_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SimulateParams>,
) -> Result<Json<SimulateResponse>, ApiError> {
    let runs = params.num_simulations.unwrap_or(state.default_simulations);
    if runs == 0 {
        return Err(ApiError::InvalidSimulations);
    }

    // Both lookups are independent; issue them concurrently.
    let (row1, row2) = tokio::try_join!(
        state.store.fetch_team_season(&params.team1, params.team1_year),
        state.store.fetch_team_season(&params.team2, params.team2_year),
    )?;
    let (Some(team1), Some(team2)) = (row1, row2) else {
        return Err(ApiError::TeamNotFound);
    };

    let features = feature_vector(&team1, &team2)?;
    let p = state.model.predict(&features)?;
    let outcome = simulate(p, runs, &mut rand::thread_rng())?;

    info!(
        "Simulated {} ({}) vs {} ({}): p={:.4}, {}/{} wins over {} runs",
        team1.team,
        team1.year,
        team2.team,
        team2.year,
        p,
        outcome.team1_wins,
        outcome.runs - outcome.team1_wins,
        outcome.runs
    );

    Ok(Json(SimulateResponse {
        team1: params.team1,
        team1_year: params.team1_year,
        team2: params.team2,
        team2_year: params.team2_year,
        team1_win_prob: outcome.team1_win_prob,
        team2_win_prob: outcome.team2_win_prob,
    }))
}

/// GET /preview returns a handful of raw store rows, for connectivity smoke tests.
async fn preview_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.store.preview(PREVIEW_LIMIT).await?;
    Ok(Json(rows))
}
