use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use relay_profile::{
    display_label, generate_all_share_urls, generate_client_config, generate_qr_data_uri,
    generate_share_url, generate_subscription, serialize_config,
};
use relay_store::NewUser;
use relay_types::{User, UserPatch};
use serde::Deserialize;

use crate::error::{AdminError, Result};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub enabled: Option<bool>,
    pub search: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<User>> {
    Json(state.store.list_users(query.enabled, query.search.as_deref()))
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<NewUser>,
) -> Result<(StatusCode, Json<User>)> {
    let user = state.store.create_user(req)?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<u64>) -> Result<Json<User>> {
    Ok(Json(state.store.get_user(id)?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(patch): Json<UserPatch>,
) -> Result<Json<User>> {
    Ok(Json(state.store.update_user(id, patch)?))
}

pub async fn remove(State(state): State<AppState>, Path(id): Path<u64>) -> Result<StatusCode> {
    state.store.delete_user(id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reset_uuid(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>> {
    let uuid = state.store.reset_user_uuid(id)?;
    Ok(Json(serde_json::json!({ "uuid": uuid })))
}

pub async fn reset_traffic(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>> {
    let previous = state.store.reset_user_traffic(id)?;
    Ok(Json(serde_json::json!({ "previous_data_used": previous })))
}

#[derive(Deserialize)]
pub struct ConfigQuery {
    pub format: Option<String>,
}

/// Client-facing material for one user, in the requested format.
pub async fn config(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<ConfigQuery>,
) -> Result<Response> {
    let user = state.store.get_user(id)?;
    let inbounds = state.store.inbounds_for_user(id)?;

    match query.format.as_deref().unwrap_or("url") {
        "json" => {
            let config = generate_client_config(&user, &inbounds)?;
            let pretty = serialize_config(&config)?;
            Ok((
                [(axum::http::header::CONTENT_TYPE, "application/json")],
                pretty,
            )
                .into_response())
        }
        "url" => {
            let urls = generate_all_share_urls(&user, &inbounds);
            Ok(urls.join("\n").into_response())
        }
        "qr" => {
            // One inbound failing never aborts the others.
            let mut entries = Vec::new();
            for view in inbounds.iter().filter(|v| v.inbound.enabled) {
                let Ok(url) = generate_share_url(&user, view) else {
                    continue;
                };
                let Ok(qr) = generate_qr_data_uri(&url) else {
                    continue;
                };
                entries.push(serde_json::json!({
                    "name": display_label(view),
                    "url": url,
                    "qr": qr,
                }));
            }
            Ok(Json(entries).into_response())
        }
        "subscription" => Ok(generate_subscription(&user, &inbounds).into_response()),
        other => Err(AdminError::UnknownFormat(other.to_string())),
    }
}
