mod auth_handlers;
mod contacts;
mod projects;

use axum::extract::State;
use axum::routing::{get, post, put};
use axum::Json;
use axum::Router;
use serde_json::{json, Value};

use crate::dto::rfc3339;
use crate::state::AppState;

/// All routes. Which gate a route passes through is decided by the
/// extractors its handler takes: `LoginQuota`/`ContactQuota` for the rate
/// limiters, `AuthUser` for a bearer token.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_v1())
}

fn api_v1() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth_handlers::login))
        .route("/contacts", post(contacts::create).get(contacts::list))
        .route("/contacts/{id}", get(contacts::get).delete(contacts::delete))
        .route("/contacts/{id}/read", put(contacts::mark_read))
        .route("/projects", get(projects::list).post(projects::create))
        .route("/projects/featured", get(projects::featured))
        .route(
            "/projects/{id}",
            get(projects::get).put(projects::update).delete(projects::delete),
        )
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Portfolio backend is running",
        "time": rfc3339(state.now()),
    }))
}
