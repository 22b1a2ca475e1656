//! HTTP surface of the node agent.
//!
//! Everything except `/health` requires the shared `X-API-Token` secret.
//! Pushing a config never restarts the engine; the control plane issues the
//! restart as a separate call.

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::process::Command;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::{AgentError, Result};
use crate::state::AppState;

pub const API_TOKEN_HEADER: &str = "x-api-token";

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/config", get(get_config).post(put_config))
        .route("/restart", post(restart))
        .route("/generate-keys", post(generate_keys))
        .route("/stats", get(stats))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let expected = &state.config.api_token;
    let presented = request
        .headers()
        .get(API_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());
    if expected.is_empty() || presented != Some(expected.as_str()) {
        warn!("rejected request with missing or wrong token");
        return (StatusCode::UNAUTHORIZED, "invalid token").into_response();
    }
    next.run(request).await
}

#[derive(Serialize)]
struct Health {
    online: bool,
    singbox_up: bool,
    version: String,
    uptime: i64,
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        online: true,
        singbox_up: state.config.config_path.exists(),
        version: state.engine_version.clone(),
        uptime: state.started_at.elapsed().as_secs() as i64,
    })
}

async fn get_config(State(state): State<AppState>) -> Result<Response> {
    let _guard = state.config_lock.read().await;
    let bytes = match tokio::fs::read(&state.config.config_path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(AgentError::ConfigMissing)
        }
        Err(err) => return Err(err.into()),
    };
    Ok(([(header::CONTENT_TYPE, "application/json")], bytes).into_response())
}

async fn put_config(
    State(state): State<AppState>,
    Json(config): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>> {
    let pretty = serde_json::to_string_pretty(&config)?;
    let _guard = state.config_lock.write().await;
    tokio::fs::write(&state.config.config_path, pretty).await?;
    info!(path = %state.config.config_path.display(), "config written");
    Ok(Json(serde_json::json!({ "status": "ok" })))
}

async fn restart(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let output = Command::new("docker")
        .args(["restart", &state.config.container])
        .output()
        .await
        .map_err(|err| AgentError::Command {
            command: "docker restart",
            detail: err.to_string(),
        })?;
    if !output.status.success() {
        return Err(AgentError::Command {
            command: "docker restart",
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    info!(container = %state.config.container, "engine restarted");
    Ok(Json(serde_json::json!({ "status": "ok" })))
}

#[derive(Serialize)]
struct KeyMaterial {
    private_key: String,
    public_key: String,
    short_id: String,
}

/// Output lines look like `PrivateKey: ...` and `PublicKey: ...`.
async fn generate_keys(State(_state): State<AppState>) -> Result<Json<KeyMaterial>> {
    let output = Command::new("sing-box")
        .args(["generate", "reality-keypair"])
        .output()
        .await
        .map_err(|err| AgentError::Command {
            command: "sing-box generate",
            detail: err.to_string(),
        })?;
    if !output.status.success() {
        return Err(AgentError::Command {
            command: "sing-box generate",
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut private_key = String::new();
    let mut public_key = String::new();
    for line in stdout.lines() {
        if let Some(value) = line.strip_prefix("PrivateKey:") {
            private_key = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix("PublicKey:") {
            public_key = value.trim().to_string();
        }
    }
    if private_key.is_empty() || public_key.is_empty() {
        return Err(AgentError::Command {
            command: "sing-box generate",
            detail: "keypair missing from output".to_string(),
        });
    }

    Ok(Json(KeyMaterial {
        private_key,
        public_key,
        short_id: generate_short_id().await,
    }))
}

/// REALITY short ids are 8 hex characters. Prefer the engine's own
/// generator; fall back to local randomness when it is unavailable.
async fn generate_short_id() -> String {
    if let Ok(output) = Command::new("sing-box")
        .args(["generate", "rand", "--hex", "8"])
        .output()
        .await
    {
        if output.status.success() {
            let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !id.is_empty() {
                return id;
            }
        }
    }
    random_short_id()
}

pub fn random_short_id() -> String {
    hex::encode(rand::random::<[u8; 4]>())
}

#[derive(Deserialize)]
struct EngineStats {
    #[serde(default)]
    stat: Vec<EngineStat>,
}

#[derive(Deserialize)]
struct EngineStat {
    name: String,
    #[serde(default)]
    value: i64,
}

#[derive(Serialize)]
struct StatsResponse {
    users: Vec<UserCounter>,
}

#[derive(Serialize)]
struct UserCounter {
    name: String,
    upload: i64,
    download: i64,
}

#[cfg(test)]
mod tests {
    use super::random_short_id;

    #[test]
    fn short_id_is_eight_hex_chars() {
        let id = random_short_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

/// Counter names follow the `user>>>NAME>>>traffic>>>uplink` convention.
async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let engine: EngineStats = state
        .http
        .get(format!("{}/stats", state.config.engine_api))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let mut counters: BTreeMap<String, (i64, i64)> = BTreeMap::new();
    for stat in engine.stat {
        let mut parts = stat.name.split(">>>");
        let (Some("user"), Some(name), Some("traffic"), Some(direction)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            continue;
        };
        let entry = counters.entry(name.to_string()).or_default();
        match direction {
            "uplink" => entry.0 += stat.value,
            "downlink" => entry.1 += stat.value,
            _ => {}
        }
    }

    let users = counters
        .into_iter()
        .map(|(name, (upload, download))| UserCounter {
            name,
            upload,
            download,
        })
        .collect();
    Ok(Json(StatsResponse { users }))
}
