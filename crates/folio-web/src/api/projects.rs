use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::middleware::AuthUser;
use crate::dto::ProjectInput;
use crate::error::AppError;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let projects = state.store.list_projects(false).await?;
    Ok(Json(json!({ "projects": projects })))
}

pub async fn featured(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let projects = state.store.list_projects(true).await?;
    Ok(Json(json!({ "projects": projects })))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let project = state
        .store
        .get_project(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;
    Ok(Json(json!({ "project": project })))
}

pub async fn create(
    _user: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<ProjectInput>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    body.validate().map_err(AppError::BadRequest)?;
    let project = state
        .store
        .create_project(body, state.now())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Project created successfully",
            "project": project,
        })),
    ))
}

pub async fn update(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ProjectInput>,
) -> Result<Json<Value>, AppError> {
    body.validate().map_err(AppError::BadRequest)?;
    let project = state
        .store
        .update_project(&id, body, state.now())
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;
    Ok(Json(json!({
        "message": "Project updated successfully",
        "project": project,
    })))
}

pub async fn delete(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if !state.store.delete_project(&id).await? {
        return Err(AppError::NotFound("Project not found".to_string()));
    }
    Ok(Json(json!({ "message": "Project deleted successfully" })))
}
