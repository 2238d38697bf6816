use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::middleware::AuthUser;
use crate::auth::rate_limit::ContactQuota;
use crate::dto::NewContact;
use crate::error::AppError;
use crate::state::AppState;

/// Public intake for the contact form. Throttled per client.
pub async fn create(
    _quota: ContactQuota,
    State(state): State<AppState>,
    Json(body): Json<NewContact>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    body.validate().map_err(AppError::BadRequest)?;

    let contact = state
        .store
        .create_contact(body, state.now())
        .await?;
    tracing::info!("Contact message received: id={}", contact.id);

    let notifier = state.notifier.clone();
    let notice = contact.clone();
    tokio::spawn(async move {
        if let Err(e) = notifier.contact_received(&notice).await {
            tracing::warn!("Failed to send contact notification for {}: {e:#}", notice.id);
        }
    });

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Contact message sent successfully",
            "contact": contact,
        })),
    ))
}

pub async fn list(
    _user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let contacts = state.store.list_contacts().await?;
    Ok(Json(json!({ "contacts": contacts })))
}

pub async fn get(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let contact = state
        .store
        .get_contact(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Contact not found".to_string()))?;
    Ok(Json(json!({ "contact": contact })))
}

pub async fn mark_read(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if !state.store.mark_contact_read(&id).await? {
        return Err(AppError::NotFound("Contact not found".to_string()));
    }
    Ok(Json(json!({ "message": "Contact marked as read" })))
}

pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if !state.store.delete_contact(&id).await? {
        return Err(AppError::NotFound("Contact not found".to_string()));
    }
    tracing::info!("Contact {id} deleted by {}", user.sub);
    Ok(Json(json!({ "message": "Contact deleted successfully" })))
}
