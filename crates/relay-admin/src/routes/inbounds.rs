use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use relay_node::RealityKeys;
use relay_store::NewInbound;
use relay_types::{Inbound, InboundPatch};

use crate::error::Result;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Path(node_id): Path<u64>,
) -> Result<Json<Vec<Inbound>>> {
    state.store.get_node(node_id)?;
    Ok(Json(state.store.list_inbounds(Some(node_id))))
}

pub async fn create(
    State(state): State<AppState>,
    Path(node_id): Path<u64>,
    Json(req): Json<NewInbound>,
) -> Result<(StatusCode, Json<Inbound>)> {
    let inbound = state.store.create_inbound(node_id, req)?;
    Ok((StatusCode::CREATED, Json(inbound)))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<u64>) -> Result<Json<Inbound>> {
    Ok(Json(state.store.get_inbound(id)?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(patch): Json<InboundPatch>,
) -> Result<Json<Inbound>> {
    Ok(Json(state.store.update_inbound(id, patch)?))
}

pub async fn remove(State(state): State<AppState>, Path(id): Path<u64>) -> Result<StatusCode> {
    state.store.delete_inbound(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Ask the inbound's node to generate a fresh REALITY keypair. The keys are
/// returned to the caller, not applied; applying them is a separate update
/// so the operator can roll them out deliberately.
pub async fn generate_keys(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<RealityKeys>> {
    let inbound = state.store.get_inbound(id)?;
    let node = state.store.get_node(inbound.node_id)?;
    let keys = state.sync.client().generate_keys(&node).await?;
    Ok(Json(keys))
}
