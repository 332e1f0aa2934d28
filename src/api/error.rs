//! HTTP error responses.

use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::error::StoreError;

/// Error body for failed data fetches.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Stable error label.
    pub error: &'static str,
    /// Human-readable cause.
    pub detail: String,
}

/// Failures surfaced by API handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request used a method other than GET.
    #[error("Method {0} not allowed")]
    MethodNotAllowed(Method),

    /// The backing store could not serve the request.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Store(e) if e.is_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Store(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        match self {
            ApiError::MethodNotAllowed(_) => {
                (status, [(header::ALLOW, "GET")], message).into_response()
            }
            ApiError::Store(e) => (
                status,
                Json(ErrorResponse {
                    error: "data unavailable",
                    detail: e.to_string(),
                }),
            )
                .into_response(),
        }
    }
}
