//! Response bodies for the HTTP API.
//!
//! Errors are always `{ "error": "<message>" }` with the matching status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{NaiveDate, SecondsFormat, Utc};
use serde::Serialize;

use crate::types::AnalysisResult;

/// Successful `POST /analyze` body.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    /// ISO-8601 UTC timestamp of the response.
    pub timestamp: String,
    pub benchmark_date: NaiveDate,
    pub results: Vec<AnalysisResult>,
}

impl AnalyzeResponse {
    pub fn new(benchmark_date: NaiveDate, results: Vec<AnalysisResult>) -> Self {
        Self {
            success: true,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            benchmark_date,
            results,
        }
    }
}

impl IntoResponse for AnalyzeResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, axum::Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// An error response: status plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn build(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::build(StatusCode::BAD_REQUEST, msg)
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::build(StatusCode::SERVICE_UNAVAILABLE, msg)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            axum::Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}
