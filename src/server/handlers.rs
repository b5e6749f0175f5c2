use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::analyst::StartupAnalyst;
use crate::artifacts::ExportFormat;
use crate::error::Error;
use crate::models::{
    AnalysisReport, BusinessModelDescription, PitchDeck, ReportSummary, ValidationResult,
};
use crate::storage::UsageStats;

use super::dto::{
    AnalyzeRequest, ErrorResponse, ExportRequest, ExportResponse, HealthResponse,
    PitchDeckRequest, ServiceInfo, MIN_IDEA_LENGTH,
};

#[derive(Clone)]
pub struct AppState {
    pub analyst: Arc<StartupAnalyst>,
}

impl AppState {
    pub fn new(analyst: Arc<StartupAnalyst>) -> Self {
        Self { analyst }
    }
}

/// Maps crate errors onto HTTP status codes.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match &self.0 {
            Error::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Error::DuplicateReport(_) => (StatusCode::CONFLICT, "duplicate_report"),
            Error::ReportUnusable { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "report_unusable"),
            Error::TotalFailure { .. } => (StatusCode::BAD_GATEWAY, "total_failure"),
            Error::Provider(_) => (StatusCode::BAD_GATEWAY, "provider_error"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        if self.0.is_client_error() {
            tracing::debug!("Rejected request: {}", self.0);
        } else {
            tracing::error!("Request failed: {}", self.0);
        }

        (status, Json(ErrorResponse::new(error, self.0.to_string()))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// GET /
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: "StartupAI".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
    })
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// POST /analyze
pub async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> ApiResult<AnalysisReport> {
    if req.idea.trim().chars().count() < MIN_IDEA_LENGTH {
        return Err(Error::InvalidRequest(format!(
            "Idea must be at least {} characters",
            MIN_IDEA_LENGTH
        ))
        .into());
    }

    let report = state.analyst.submit_analysis(&req.idea, &req.dimensions).await?;
    Ok(Json(report))
}

/// GET /analyses
pub async fn list_analyses(State(state): State<AppState>) -> ApiResult<Vec<ReportSummary>> {
    Ok(Json(state.analyst.list_history()?))
}

/// GET /analyses/{id}
pub async fn get_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<AnalysisReport> {
    Ok(Json(state.analyst.get_analysis(id)?))
}

/// POST /pitch-deck
pub async fn pitch_deck(
    State(state): State<AppState>,
    Json(req): Json<PitchDeckRequest>,
) -> ApiResult<PitchDeck> {
    Ok(Json(state.analyst.generate_pitch_deck(req.analysis_id)?))
}

/// POST /validate-business-model
pub async fn validate_business_model(
    State(state): State<AppState>,
    Json(description): Json<BusinessModelDescription>,
) -> ApiResult<ValidationResult> {
    Ok(Json(state.analyst.validate_business_model(&description).await?))
}

/// POST /export
pub async fn export(
    State(state): State<AppState>,
    Json(req): Json<ExportRequest>,
) -> ApiResult<ExportResponse> {
    let format: ExportFormat = req.format.parse()?;
    let content = state.analyst.export_analysis(req.analysis_id, format)?;
    Ok(Json(ExportResponse {
        analysis_id: req.analysis_id,
        format: format.to_string(),
        content,
    }))
}

/// GET /metrics
pub async fn metrics(State(state): State<AppState>) -> ApiResult<UsageStats> {
    Ok(Json(state.analyst.usage_stats()?))
}
