//! HTTP-facing error and response types.
//!
//! Every error response carries the wire shape
//! `{"success": false, "error": "..."}`; successful writes answer
//! `{"success": true, ...}`. Domain rejections (validation, unknown ids,
//! payment failures) map to 400; storage unavailability and exhausted
//! transaction retries map to 500.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use clinic_billing::PaymentError;
use clinic_repo::RepoError;
use clinic_storage::StorageError;

/// High-level API errors mapped to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) | ApiError::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({"success": false, "error": self.message()});
        let bytes = serde_json::to_vec(&body).unwrap_or_else(|_| b"{\"success\":false}".to_vec());

        axum::http::Response::builder()
            .status(self.status_code())
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            )
            .body(axum::body::Body::from(bytes))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
    }
}

/// Repository failures: bad payloads and unknown ids are the client's
/// fault; everything else is ours.
impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Validation(msg) => ApiError::BadRequest(msg),
            RepoError::Storage(e) if e.is_not_found() => ApiError::BadRequest(e.to_string()),
            RepoError::Storage(e) => ApiError::Internal(e.to_string()),
        }
    }
}

/// Payment failures: domain rejections are 400; storage trouble
/// (including a transaction that kept conflicting) is 500.
impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        if err.is_domain_error() {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// A JSON response with an explicit status code.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub value: T,
    pub status: StatusCode,
}

impl<T> ApiResponse<T> {
    pub fn new(value: T, status: StatusCode) -> Self {
        Self { value, status }
    }

    pub fn ok(value: T) -> Self {
        Self::new(value, StatusCode::OK)
    }

    /// 201 for successful creates.
    pub fn created(value: T) -> Self {
        Self::new(value, StatusCode::CREATED)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let bytes = match serde_json::to_vec(&self.value) {
            Ok(b) => b,
            Err(_) => {
                return ApiError::internal("response serialization failure").into_response();
            }
        };

        axum::http::Response::builder()
            .status(self.status)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            )
            .body(axum::body::Body::from(bytes))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
    }
}
