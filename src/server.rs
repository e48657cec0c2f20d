use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::tracker::engine::TrackerEngine;
use crate::tracker::{compact_line, TrackedSet};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<TrackerEngine>,
    pub update_interval_mins: u64,
}

/// Build the Axum router for the widget API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz_handler))
        .route("/lol/matches", get(matches_handler))
        .route("/lol/matches/compact", get(matches_compact_handler))
        .route("/lol/matches/refresh", post(refresh_handler))
        .route("/lol/matches/update-scores", post(update_scores_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /healthz
async fn healthz_handler(State(state): State<AppState>) -> Json<Value> {
    let set = state.engine.snapshot();
    Json(json!({
        "status": "ok",
        "tracked_matches": set.matches.len(),
        "last_refresh": set.last_refresh,
    }))
}

/// GET /lol/matches — full detail for the widget.
async fn matches_handler(State(state): State<AppState>) -> Json<Value> {
    let set = state.engine.snapshot();
    Json(matches_payload(&set, state.update_interval_mins))
}

/// GET /lol/matches/compact — fixed five-slot form for single-line widgets.
async fn matches_compact_handler(State(state): State<AppState>) -> Json<Value> {
    let set = state.engine.snapshot();
    Json(compact_payload(&set))
}

/// POST /lol/matches/refresh — manual trigger, same path as the daily job.
async fn refresh_handler(State(state): State<AppState>) -> Json<Value> {
    let count = state.engine.refresh().await;
    Json(json!({
        "status": "ok",
        "message": "Liste rafraîchie",
        "matches_count": count,
    }))
}

/// POST /lol/matches/update-scores — manual trigger, same path as the
/// interval job.
async fn update_scores_handler(State(state): State<AppState>) -> Json<Value> {
    state.engine.update_scores().await;
    let set = state.engine.snapshot();
    Json(json!({
        "status": "ok",
        "message": "Scores mis à jour",
        "matches": set.matches,
    }))
}

fn matches_payload(set: &TrackedSet, update_interval_mins: u64) -> Value {
    if set.matches.is_empty() {
        return json!({
            "matches": [],
            "message": "Aucun match tracké. Attendez le prochain rafraîchissement.",
            "last_refresh": set.last_refresh,
        });
    }
    json!({
        "matches": set.matches,
        "last_refresh": set.last_refresh,
        "next_update": format!("Toutes les {} minutes", update_interval_mins),
    })
}

fn compact_payload(set: &TrackedSet) -> Value {
    let lines: Vec<String> = set.matches.iter().take(5).map(compact_line).collect();
    let slot = |i: usize| lines.get(i).cloned().unwrap_or_default();
    json!({
        "match1": slot(0),
        "match2": slot(1),
        "match3": slot(2),
        "match4": slot(3),
        "match5": slot(4),
        "last_update": set.last_refresh,
    })
}
