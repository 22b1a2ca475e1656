use axum::extract::{Query, State};
use axum::Json;
use relay_node::TrafficSummary;
use relay_types::User;
use serde::Deserialize;

use crate::state::AppState;

pub async fn overview(State(state): State<AppState>) -> Json<serde_json::Value> {
    let (users, nodes, inbounds) = state.store.counts();
    let (upload, download) = state.store.traffic_totals();
    let over_quota = state
        .store
        .list_users(None, None)
        .iter()
        .filter(|u| u.is_over_quota())
        .count();
    Json(serde_json::json!({
        "users": users,
        "nodes": nodes,
        "inbounds": inbounds,
        "over_quota": over_quota,
        "upload": upload,
        "download": download,
    }))
}

#[derive(Deserialize)]
pub struct TopQuery {
    pub limit: Option<usize>,
}

pub async fn top(
    State(state): State<AppState>,
    Query(query): Query<TopQuery>,
) -> Json<Vec<User>> {
    Json(state.store.top_users(query.limit.unwrap_or(10)))
}

/// One traffic collection pass across the fleet, on demand.
pub async fn collect(State(state): State<AppState>) -> Json<TrafficSummary> {
    Json(state.sync.collect_traffic().await)
}
