//! HTTP surface of the relay.

use std::{sync::Arc, time::Instant};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json,
};
use serde::Serialize;

use crate::{
    cache::{RefreshError, StockCache},
    metrics,
    stock::StockReport,
    upstream::Fetch,
};

pub struct AppState<F> {
    cache: Arc<StockCache<F>>,
    registry: prometheus::Registry,
}

impl<F> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            registry: self.registry.clone(),
        }
    }
}

pub fn router<F>(cache: Arc<StockCache<F>>, registry: prometheus::Registry) -> axum::Router
where
    F: Fetch,
{
    axum::Router::new()
        .route("/", get(home))
        .route("/api/stock/GetStock", get(get_stock::<F>))
        .route("/metrics", get(metrics_text::<F>))
        .with_state(AppState { cache, registry })
}

/// Error body handed to clients, the HTTP status mirrors `code`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub code: u16,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorEnvelope<'e> {
    success: bool,
    error: ErrorBody<'e>,
}

#[derive(Serialize)]
struct ErrorBody<'e> {
    code: u16,
    message: &'e str,
}

impl From<RefreshError> for ApiError {
    fn from(value: RefreshError) -> Self {
        Self {
            code: value.code(),
            message: value.message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorEnvelope {
            success: false,
            error: ErrorBody {
                code: self.code,
                message: &self.message,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub struct StockResponse(Arc<StockReport>);

impl IntoResponse for StockResponse {
    fn into_response(self) -> Response {
        Json(self.0.as_ref()).into_response()
    }
}

async fn home() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "GAG Stocks API" }))
}

#[tracing::instrument(skip(state))]
async fn get_stock<F>(State(state): State<AppState<F>>) -> Result<StockResponse, ApiError>
where
    F: Fetch,
{
    let report = state.cache.get_or_refresh(Instant::now()).await?;
    Ok(StockResponse(report))
}

async fn metrics_text<F>(State(state): State<AppState<F>>) -> String {
    metrics::encode(&state.registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{stock::FormatError, upstream::FetchError};

    #[test]
    fn error_codes_follow_cause() {
        let timeout: ApiError = RefreshError::Fetch(FetchError::Timeout).into();
        assert_eq!(timeout.code, 504);

        let format: ApiError = RefreshError::Format(FormatError::MissingPayload).into();
        assert_eq!(format.code, 500);
        assert_eq!(format.message, "Unexpected data structure: missing result payload");

        let status: ApiError = RefreshError::Fetch(FetchError::Status {
            code: 503,
            message: "maintenance".to_string(),
        })
        .into();
        assert_eq!(status.code, 503);
        assert_eq!(status.message, "maintenance");
    }

    #[test]
    fn error_status_mirrors_code() {
        let response = ApiError {
            code: 503,
            message: "down".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = ApiError {
            code: 42,
            message: "odd".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
