//! Public subscription endpoint. This is the only unauthenticated surface,
//! so every failure is a plain 404: callers learn nothing about which users
//! exist or why a fetch was refused.

use axum::extract::{Path, Query, State};
use axum::http::header::{self, HeaderName};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use relay_profile::generate_subscription;
use serde::Deserialize;
use uuid::Uuid;

use crate::state::AppState;

/// Clients refresh twice a day.
pub const PROFILE_UPDATE_INTERVAL_HOURS: &str = "12";

#[derive(Deserialize)]
pub struct SubQuery {
    pub key: Option<String>,
}

pub async fn subscription(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
    Query(query): Query<SubQuery>,
) -> Response {
    if let Some(password) = &state.config.sub_password {
        if query.key.as_deref() != Some(password.as_str()) {
            return StatusCode::NOT_FOUND.into_response();
        }
    }

    let Ok(user) = state.store.get_user_by_uuid(&uuid) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if !user.is_active() {
        return StatusCode::NOT_FOUND.into_response();
    }
    let Ok(inbounds) = state.store.inbounds_for_user(user.id) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let body = generate_subscription(&user, &inbounds);
    let userinfo = format!(
        "upload=0; download={}; total={}",
        user.data_used, user.data_limit
    );
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                HeaderName::from_static("profile-update-interval"),
                PROFILE_UPDATE_INTERVAL_HOURS.to_string(),
            ),
            (
                HeaderName::from_static("subscription-userinfo"),
                userinfo,
            ),
        ],
        body,
    )
        .into_response()
}
