use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::models::term::TrackedResource;
use crate::state::AppState;
use crate::terms::service::CheckOutcome;

/// `url` stays untyped so a non-string value reads as a bad URL, not a bad body.
#[derive(Deserialize)]
pub struct AddTermRequest {
    pub url: Option<Value>,
}

#[derive(Serialize)]
pub struct TermListResponse {
    pub terms: Vec<TrackedResource>,
}

#[derive(Serialize)]
pub struct TermResponse {
    pub term: TrackedResource,
}

#[derive(Serialize)]
pub struct CheckAllResponse {
    pub results: Vec<CheckOutcome>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// GET /api/terms
pub async fn handle_list_terms(
    State(state): State<AppState>,
) -> Result<Json<TermListResponse>, AppError> {
    let terms = state.service.list().await?;
    Ok(Json(TermListResponse { terms }))
}

/// POST /api/terms
pub async fn handle_add_term(
    State(state): State<AppState>,
    body: Result<Json<AddTermRequest>, JsonRejection>,
) -> Result<Json<TermResponse>, AppError> {
    let url = match body {
        Ok(Json(AddTermRequest {
            url: Some(Value::String(url)),
        })) => url,
        Ok(Json(AddTermRequest {
            url: None | Some(Value::Null),
        })) => String::new(),
        Ok(Json(AddTermRequest { url: Some(_) })) => {
            return Err(AppError::Validation("Invalid URL format".to_string()))
        }
        Err(rejection) => {
            tracing::debug!("Rejected add-term body: {rejection}");
            String::new()
        }
    };
    let term = state.service.add(&url).await?;
    Ok(Json(TermResponse { term }))
}

/// GET /api/terms/:id
pub async fn handle_get_term(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TermResponse>, AppError> {
    let term = state.service.get(&id).await?;
    Ok(Json(TermResponse { term }))
}

/// DELETE /api/terms/:id
pub async fn handle_delete_term(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.service.remove(&id).await? {
        return Err(AppError::NotFound("Term not found".to_string()));
    }
    Ok(Json(MessageResponse {
        message: "Term deleted successfully".to_string(),
    }))
}

/// POST /api/check/:id
pub async fn handle_check_term(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TermResponse>, AppError> {
    let term = state.service.recheck(&id).await?;
    Ok(Json(TermResponse { term }))
}

/// POST /api/check-all
pub async fn handle_check_all(
    State(state): State<AppState>,
) -> Result<Json<CheckAllResponse>, AppError> {
    let results = state.service.recheck_all().await?;
    Ok(Json(CheckAllResponse { results }))
}
