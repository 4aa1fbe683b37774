//! REST API module using Axum
//!
//! Exposes the on-demand entry point of the advisory workflow:
//! - `GET /` liveness text
//! - `POST /analyze` batch analysis of caller-supplied codes, returned as JSON

pub mod envelope;
pub mod handlers;
mod routes;

pub use handlers::ApiState;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the CORS layer.
///
/// An empty `origins` list allows any origin. Otherwise only the listed
/// origins are allowed; entries that are not valid header values are skipped.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| o.trim().parse().ok())
        .collect();
    tracing::info!(origins = %origins.join(","), "CORS: allowing configured origins");
    cors.allow_origin(allowed)
}

/// Create the complete application router.
pub fn create_app(state: ApiState, cors_origins: &[String]) -> Router {
    routes::api_routes(state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(cors_origins))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{AnalysisError, InstrumentAnalyzer, MarketContextProvider, MarketError};
    use crate::types::{BenchmarkPoint, BenchmarkSeries};
    use crate::workflow::BatchProcessor;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    struct NoHistory;

    #[async_trait]
    impl MarketContextProvider for NoHistory {
        async fn fetch_history(&self) -> Result<Vec<BenchmarkPoint>, MarketError> {
            Ok(Vec::new())
        }
    }

    struct Never;

    #[async_trait]
    impl InstrumentAnalyzer for Never {
        async fn analyze(&self, _code: &str, _s: &BenchmarkSeries) -> Result<String, AnalysisError> {
            Err(AnalysisError::Rejected("unreachable".to_string()))
        }
    }

    fn create_test_state() -> ApiState {
        ApiState::new(
            Arc::new(NoHistory),
            BatchProcessor::new(Arc::new(Never), Duration::ZERO),
        )
    }

    #[tokio::test]
    async fn test_health_route() {
        let app = create_app(create_test_state(), &[]);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], handlers::LIVENESS_TEXT.as_bytes());
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin_by_default() {
        let app = create_app(create_test_state(), &[]);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(header::ORIGIN, "http://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_cors_restricts_to_configured_origins() {
        let app = create_app(create_test_state(), &["http://allowed.test".to_string()]);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(header::ORIGIN, "http://other.test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = create_app(create_test_state(), &[]);

        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
