//! HTTP surface of the control plane. The /api prefix is gated by a static
//! bearer token; /sub is public (optionally gated by a shared secret).

pub mod inbounds;
pub mod nodes;
pub mod stats;
pub mod sub;
pub mod users;

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/:id",
            get(users::get).put(users::update).delete(users::remove),
        )
        .route("/users/:id/config", get(users::config))
        .route("/users/:id/reset-uuid", post(users::reset_uuid))
        .route("/users/:id/reset-traffic", post(users::reset_traffic))
        .route("/nodes", get(nodes::list).post(nodes::create))
        .route("/nodes/statuses", get(nodes::statuses))
        .route("/nodes/sync", post(nodes::sync_all))
        .route(
            "/nodes/:id",
            get(nodes::get).put(nodes::update).delete(nodes::remove),
        )
        .route("/nodes/:id/status", get(nodes::status))
        .route("/nodes/:id/config", get(nodes::config))
        .route("/nodes/:id/sync", post(nodes::sync))
        .route(
            "/nodes/:id/inbounds",
            get(inbounds::list).post(inbounds::create),
        )
        .route(
            "/inbounds/:id",
            get(inbounds::get)
                .put(inbounds::update)
                .delete(inbounds::remove),
        )
        .route("/inbounds/:id/generate-keys", post(inbounds::generate_keys))
        .route("/stats/overview", get(stats::overview))
        .route("/stats/top", get(stats::top))
        .route("/stats/collect", post(stats::collect))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .nest("/api", api)
        .route("/sub/:uuid", get(sub::subscription))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let expected = &state.config.admin_token;
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    if expected.is_empty() || presented != Some(expected.as_str()) {
        warn!("rejected api request with missing or wrong token");
        return (StatusCode::UNAUTHORIZED, "invalid token").into_response();
    }
    next.run(request).await
}
