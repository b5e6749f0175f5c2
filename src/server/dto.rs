//! Request and response bodies for the REST API.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::AnalysisDimension;

pub const MIN_IDEA_LENGTH: usize = 10;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub idea: String,
    /// All seven when omitted or empty.
    #[serde(default)]
    pub dimensions: Vec<AnalysisDimension>,
}

#[derive(Debug, Deserialize)]
pub struct PitchDeckRequest {
    pub analysis_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub analysis_id: Uuid,
    #[serde(default = "default_export_format")]
    pub format: String,
}

fn default_export_format() -> String {
    "json".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExportResponse {
    pub analysis_id: Uuid,
    pub format: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: detail.into(),
        }
    }
}
