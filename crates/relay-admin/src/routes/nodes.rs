use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use relay_node::{FleetEntry, NodeStatus, SyncReport};
use relay_store::NewNode;
use relay_types::{Node, NodePatch};
use serde::Deserialize;

use crate::error::Result;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub enabled: Option<bool>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<Node>> {
    Json(state.store.list_nodes(query.enabled))
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<NewNode>,
) -> Result<(StatusCode, Json<Node>)> {
    let node = state.store.create_node(req)?;
    Ok((StatusCode::CREATED, Json(node)))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<u64>) -> Result<Json<Node>> {
    Ok(Json(state.store.get_node(id)?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(patch): Json<NodePatch>,
) -> Result<Json<Node>> {
    Ok(Json(state.store.update_node(id, patch)?))
}

pub async fn remove(State(state): State<AppState>, Path(id): Path<u64>) -> Result<StatusCode> {
    state.store.delete_node(id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<NodeStatus>> {
    let node = state.store.get_node(id)?;
    Ok(Json(state.sync.client().get_status(&node).await))
}

/// The config currently deployed on the node, as the agent reports it.
pub async fn config(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>> {
    let node = state.store.get_node(id)?;
    Ok(Json(state.sync.client().get_config(&node).await?))
}

pub async fn statuses(State(state): State<AppState>) -> Json<Vec<FleetEntry>> {
    Json(state.sync.fleet_statuses().await)
}

fn report_json(report: &SyncReport) -> serde_json::Value {
    serde_json::json!({
        "node_id": report.node_id,
        "node_name": report.node_name,
        "inbound_count": report.inbound_count,
        "restarting": true,
    })
}

/// Push a freshly generated config to one node. The restart happens on a
/// background task; the response does not wait for it.
pub async fn sync(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>> {
    let report = state.sync.sync_node(id).await?;
    Ok(Json(report_json(&report)))
}

pub async fn sync_all(State(state): State<AppState>) -> Json<Vec<serde_json::Value>> {
    let reports = state.sync.sync_all().await;
    Json(reports.iter().map(report_json).collect())
}
