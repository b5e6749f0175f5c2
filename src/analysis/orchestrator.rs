use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::analysis::routing::ProviderRouting;
use crate::analysis::section::SectionAnalyzer;
use crate::config::{OrchestratorConfig, TotalFailurePolicy};
use crate::error::{Error, Result};
use crate::models::{AnalysisReport, AnalysisRequest, ReportOutcome, SectionResult};
use crate::storage::HistoryStore;

pub struct AnalysisOrchestrator {
    analyzer: SectionAnalyzer,
    history: Arc<HistoryStore>,
    config: OrchestratorConfig,
}

impl AnalysisOrchestrator {
    pub fn new(history: Arc<HistoryStore>, config: OrchestratorConfig) -> Self {
        Self {
            analyzer: SectionAnalyzer::from(&config),
            history,
            config,
        }
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    /// Analyzes every requested dimension concurrently and records the report.
    ///
    /// Dropping the returned future cancels outstanding provider calls and
    /// records nothing.
    pub async fn run(
        &self,
        request: &AnalysisRequest,
        routing: &ProviderRouting,
    ) -> Result<AnalysisReport> {
        let dimensions = request.dimensions();
        tracing::info!(
            "Starting analysis {} across {} dimension(s)",
            request.request_id(),
            dimensions.len()
        );

        let sections = self.analyze_sections(request, routing).await;
        let recommendations = derive_recommendations(&sections, self.config.highlights_per_section);
        let report = AnalysisReport::assemble(request, sections, recommendations);

        self.history.append(&report)?;

        match report.outcome() {
            ReportOutcome::Complete => {
                tracing::info!("Analysis {} completed", report.request_id());
            }
            ReportOutcome::PartialFailure { failed } => {
                tracing::warn!(
                    "Analysis {} completed with {} failed dimension(s)",
                    report.request_id(),
                    failed.len()
                );
            }
            ReportOutcome::TotalFailure => {
                tracing::warn!("Every dimension failed for analysis {}", report.request_id());
                if self.config.total_failure_policy == TotalFailurePolicy::Reject {
                    return Err(Error::TotalFailure {
                        request_id: report.request_id(),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Like `run`, but gives up with `Error::Cancelled` once `token` fires.
    pub async fn run_cancellable(
        &self,
        request: &AnalysisRequest,
        routing: &ProviderRouting,
        token: &CancellationToken,
    ) -> Result<AnalysisReport> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::info!("Analysis {} cancelled", request.request_id());
                Err(Error::Cancelled(request.request_id()))
            }
            result = self.run(request, routing) => result,
        }
    }

    async fn analyze_sections(
        &self,
        request: &AnalysisRequest,
        routing: &ProviderRouting,
    ) -> Vec<SectionResult> {
        let dimensions = request.dimensions();
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency_limit.max(1)));
        let pb = self.progress_bar(dimensions.len());

        let mut pending = FuturesUnordered::new();
        for (index, dimension) in dimensions.iter().copied().enumerate() {
            let provider = routing.provider_for(dimension);
            let sem = semaphore.clone();
            let analyzer = &self.analyzer;
            let idea = request.idea();

            pending.push(async move {
                let _permit = sem.acquire().await.ok();
                let section = analyzer.analyze(dimension, idea, provider.as_ref()).await;
                (index, section)
            });
        }

        // Completion order is arbitrary; slots restore declaration order.
        let mut slots: Vec<Option<SectionResult>> = vec![None; dimensions.len()];
        while let Some((index, section)) = pending.next().await {
            pb.set_message(section.dimension.title());
            pb.inc(1);
            slots[index] = Some(section);
        }
        pb.finish_with_message("Analysis complete");

        slots.into_iter().flatten().collect()
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} sections {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}

/// The first `per_section` highlights of every successful section, in section order.
pub fn derive_recommendations(sections: &[SectionResult], per_section: usize) -> Vec<String> {
    sections
        .iter()
        .filter(|s| s.succeeded())
        .flat_map(|s| s.highlights().iter().take(per_section).cloned())
        .collect()
}
