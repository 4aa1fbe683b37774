//! HTTP handlers: liveness and the on-demand batch analysis.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use tracing::info;

use super::envelope::{AnalyzeResponse, ApiError};
use crate::market::{load_benchmark, MarketContextProvider};
use crate::workflow::BatchProcessor;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub market: Arc<dyn MarketContextProvider>,
    /// Processor paced with the on-demand delay.
    pub processor: BatchProcessor,
}

impl ApiState {
    pub fn new(market: Arc<dyn MarketContextProvider>, processor: BatchProcessor) -> Self {
        Self { market, processor }
    }
}

/// Liveness text for `GET /`.
pub const LIVENESS_TEXT: &str = "AiStock advisor API is running!";

const INVALID_CODES: &str = "Request body must contain a non-empty `codes` array of instrument code strings";

/// GET /
pub async fn health() -> &'static str {
    LIVENESS_TEXT
}

/// Extract the `codes` array from a raw request body.
///
/// Rejects unparsable JSON, a missing or non-array `codes`, an empty array,
/// and any non-string element.
pub fn parse_codes(body: &[u8]) -> Result<Vec<String>, ApiError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|_| ApiError::bad_request(INVALID_CODES))?;

    let codes = value
        .get("codes")
        .and_then(Value::as_array)
        .filter(|codes| !codes.is_empty())
        .ok_or_else(|| ApiError::bad_request(INVALID_CODES))?;

    codes
        .iter()
        .map(|c| c.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| ApiError::bad_request(INVALID_CODES))
}

/// POST /analyze
///
/// Body: `{ "codes": ["600519", "000858"] }`
///
/// Validates before touching any collaborator, then loads the benchmark
/// (503 if unavailable) and analyzes the codes in order.
pub async fn analyze(State(state): State<ApiState>, body: Bytes) -> Response {
    let codes = match parse_codes(&body) {
        Ok(codes) => codes,
        Err(e) => return e.into_response(),
    };

    info!(codes = %codes.join(", "), "Received analysis request");

    let Ok(series) = load_benchmark(state.market.as_ref()).await else {
        return ApiError::service_unavailable(
            "Market benchmark data is unavailable, the service is temporarily unavailable",
        )
        .into_response();
    };

    let results = state.processor.process(&codes, &series).await;
    AnalyzeResponse::new(series.trading_date(), results).into_response()
}
