use chrono::Utc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::analysis::{AnalysisOrchestrator, ProviderRouting, RetryPolicy};
use crate::artifacts::{BusinessModelValidator, ExportFormat, Exporter, PitchDeckGenerator};
use crate::config::{Config, OrchestratorConfig};
use crate::error::Result;
use crate::models::{
    AnalysisDimension, AnalysisReport, AnalysisRequest, BusinessModelDescription, PitchDeck,
    ReportSummary, ValidationResult,
};
use crate::storage::{HistoryStore, UsageStats};

/// Entry point shared by the CLI and the REST server.
pub struct StartupAnalyst {
    orchestrator: AnalysisOrchestrator,
    routing: ProviderRouting,
    validator: BusinessModelValidator,
    pitch_decks: PitchDeckGenerator,
    exporter: Exporter,
}

impl StartupAnalyst {
    pub fn new(
        history: Arc<HistoryStore>,
        routing: ProviderRouting,
        config: OrchestratorConfig,
    ) -> Self {
        let retry = RetryPolicy {
            max_retries: config.max_retries,
            base_delay: config.retry_base_delay,
            ..RetryPolicy::default()
        };
        let validator =
            BusinessModelValidator::new(routing.default_provider(), retry, config.request_timeout);

        Self {
            orchestrator: AnalysisOrchestrator::new(history, config),
            routing,
            validator,
            pitch_decks: PitchDeckGenerator::new(),
            exporter: Exporter::new(),
        }
    }

    /// Opens the history database and builds provider clients from `config`.
    pub fn from_config(config: &Config, show_progress: bool) -> Result<Self> {
        let history = Arc::new(HistoryStore::new(&config.database_path)?);
        let routing = ProviderRouting::from_config(config)?;
        let orchestrator_config = OrchestratorConfig {
            show_progress,
            ..OrchestratorConfig::from(config)
        };
        Ok(Self::new(history, routing, orchestrator_config))
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        self.orchestrator.history()
    }

    /// Analyzes `idea` across `dimensions`, or all seven when the slice is empty.
    pub async fn submit_analysis(
        &self,
        idea: &str,
        dimensions: &[AnalysisDimension],
    ) -> Result<AnalysisReport> {
        let request = build_request(idea, dimensions)?;
        self.submit_request(&request).await
    }

    pub async fn submit_request(&self, request: &AnalysisRequest) -> Result<AnalysisReport> {
        self.orchestrator.run(request, &self.routing).await
    }

    pub async fn submit_cancellable(
        &self,
        request: &AnalysisRequest,
        token: &CancellationToken,
    ) -> Result<AnalysisReport> {
        self.orchestrator
            .run_cancellable(request, &self.routing, token)
            .await
    }

    pub fn generate_pitch_deck(&self, request_id: Uuid) -> Result<PitchDeck> {
        let report = self.history().get(request_id)?;
        self.pitch_decks.generate(&report)
    }

    pub async fn validate_business_model(
        &self,
        description: &BusinessModelDescription,
    ) -> Result<ValidationResult> {
        self.validator.validate(description).await
    }

    pub fn export_analysis(&self, request_id: Uuid, format: ExportFormat) -> Result<String> {
        let report = self.history().get(request_id)?;
        self.exporter.export(&report, format)
    }

    pub fn get_analysis(&self, request_id: Uuid) -> Result<AnalysisReport> {
        self.history().get(request_id)
    }

    /// Newest first.
    pub fn list_history(&self) -> Result<Vec<ReportSummary>> {
        self.history().summaries()
    }

    pub fn latest_report_id(&self) -> Result<Option<Uuid>> {
        self.history().latest_id()
    }

    pub fn usage_stats(&self) -> Result<UsageStats> {
        self.history().stats(Utc::now())
    }
}

fn build_request(idea: &str, dimensions: &[AnalysisDimension]) -> Result<AnalysisRequest> {
    if dimensions.is_empty() {
        AnalysisRequest::full(idea)
    } else {
        AnalysisRequest::new(idea, dimensions)
    }
}
