use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::{Value, json};

use clinic_api::{ApiError, ApiResponse};
use clinic_core::RecordKind;
use clinic_repo::RecordRepository;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse<'a> {
    status: &'a str,
}

pub async fn root() -> impl IntoResponse {
    let body = json!({
        "service": "Clinic Server",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

pub async fn readyz() -> impl IntoResponse {
    // The memory store is always ready; the mirror is best-effort.
    (StatusCode::OK, Json(HealthResponse { status: "ready" }))
}

fn repo_for<'a>(state: &'a AppState, collection: &str) -> Result<&'a RecordRepository, ApiError> {
    let kind = RecordKind::from_collection(collection)
        .ok_or_else(|| ApiError::not_found(format!("Unknown collection '{collection}'")))?;
    Ok(state.repos.for_kind(kind))
}

// ---- Generic record CRUD ----

pub async fn list_records(
    State(state): State<AppState>,
    Path(collection): Path<String>,
) -> Result<ApiResponse<Vec<Value>>, ApiError> {
    let repo = repo_for(&state, &collection)?;
    let records = repo.list().await?;
    Ok(ApiResponse::ok(
        records.iter().map(|r| r.to_api_value()).collect(),
    ))
}

pub async fn create_record(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Json(payload): Json<Value>,
) -> Result<ApiResponse<Value>, ApiError> {
    let repo = repo_for(&state, &collection)?;
    let record = repo.create(&payload).await?;
    Ok(ApiResponse::created(
        json!({"success": true, "id": record.id}),
    ))
}

pub async fn get_record(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<ApiResponse<Value>, ApiError> {
    let repo = repo_for(&state, &collection)?;
    match repo.get(&id).await? {
        Some(record) => Ok(ApiResponse::ok(record.to_api_value())),
        None => Err(ApiError::not_found(format!(
            "{} '{id}' not found",
            repo.kind()
        ))),
    }
}

pub async fn update_record(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    Json(payload): Json<Value>,
) -> Result<ApiResponse<Value>, ApiError> {
    let repo = repo_for(&state, &collection)?;
    let record = repo.update(&id, &payload).await?;
    Ok(ApiResponse::ok(json!({"success": true, "id": record.id})))
}

pub async fn delete_record(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<ApiResponse<Value>, ApiError> {
    let repo = repo_for(&state, &collection)?;
    repo.delete(&id).await?;
    Ok(ApiResponse::ok(json!({"success": true, "id": id})))
}

// ---- Payments ----

pub async fn pay_bill(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Value>, ApiError> {
    let receipt = state.payments.process_payment(&id).await?;
    let mut body = serde_json::to_value(&receipt)
        .map_err(|e| ApiError::internal(format!("cannot encode receipt: {e}")))?;
    body["success"] = Value::Bool(true);
    Ok(ApiResponse::ok(body))
}
