mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use common::{analyst, analyst_with, test_config, Canned, Failing, Flaky};
use startupai::config::{OrchestratorConfig, TotalFailurePolicy};
use startupai::models::{AnalysisDimension, AnalysisReport, AnalysisRequest, ReportOutcome};
use startupai::{Error, ExportFormat, HistoryStore, ProviderRouting, StartupAnalyst};

use AnalysisDimension::*;

#[tokio::test]
async fn test_one_section_per_requested_dimension() {
    let analyst = analyst(ProviderRouting::new(Canned::new("Canned")));

    for dims in [
        vec![MarketResearch],
        vec![RiskAssessment, BusinessModel, GoToMarket],
        AnalysisDimension::ALL.to_vec(),
    ] {
        let report = analyst
            .submit_analysis("Electric cargo bikes for couriers", &dims)
            .await
            .unwrap();
        assert_eq!(report.sections().len(), dims.len());
        assert!(report.is_complete());
        assert_eq!(report.outcome(), ReportOutcome::Complete);
    }
}

#[tokio::test]
async fn test_sections_keep_declaration_order_under_skewed_latency() {
    // Earlier dimensions answer last.
    let mut routing = ProviderRouting::new(Canned::new("Canned"));
    for (i, dim) in AnalysisDimension::ALL.iter().enumerate() {
        let delay = Duration::from_millis(15 * (AnalysisDimension::ALL.len() - i) as u64);
        routing = routing.with_override(*dim, Canned::delayed(dim.key(), delay));
    }
    let analyst = analyst(routing);

    let requested = vec![GoToMarket, MarketResearch, RiskAssessment, CustomerAnalysis];
    let report = analyst
        .submit_analysis("Electric cargo bikes for couriers", &requested)
        .await
        .unwrap();

    let order: Vec<_> = report.sections().iter().map(|s| s.dimension).collect();
    assert_eq!(order, requested);
    for section in report.sections() {
        assert_eq!(section.provider, section.dimension.key());
    }
}

#[tokio::test]
async fn test_json_export_round_trip() {
    let analyst = analyst(
        ProviderRouting::new(Canned::new("Canned")).with_override(BusinessModel, Failing::permanent()),
    );
    let report = analyst
        .submit_analysis("Electric cargo bikes for couriers", &[MarketResearch, BusinessModel])
        .await
        .unwrap();

    let json = analyst
        .export_analysis(report.request_id(), ExportFormat::Json)
        .unwrap();
    let parsed: AnalysisReport = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, report);
    assert_eq!(parsed.sections(), report.sections());
    assert_eq!(parsed.recommendations(), report.recommendations());
}

#[tokio::test]
async fn test_partial_failure_keeps_other_sections() {
    let requested = vec![MarketResearch, CustomerAnalysis, BusinessModel];
    let analyst = analyst(
        ProviderRouting::new(Canned::new("Canned"))
            .with_override(CustomerAnalysis, Failing::permanent()),
    );

    let report = analyst
        .submit_analysis("Electric cargo bikes for couriers", &requested)
        .await
        .unwrap();

    assert_eq!(
        report.outcome(),
        ReportOutcome::PartialFailure {
            failed: vec![CustomerAnalysis]
        }
    );
    let failed = report.section(CustomerAnalysis).unwrap();
    assert!(!failed.succeeded());
    assert_eq!(failed.attempts, 1);
    assert!(failed.error().unwrap().contains("model not found"));

    assert!(report.section(MarketResearch).unwrap().succeeded());
    assert!(report.section(BusinessModel).unwrap().succeeded());
    // Two highlights from each of the two successful sections.
    assert_eq!(report.recommendations().len(), 4);
}

#[tokio::test]
async fn test_total_failure_produces_report_without_recommendations() {
    let analyst = analyst(ProviderRouting::new(Failing::permanent()));

    let report = analyst
        .submit_analysis("Electric cargo bikes for couriers", &[MarketResearch, RiskAssessment])
        .await
        .unwrap();

    assert_eq!(report.outcome(), ReportOutcome::TotalFailure);
    assert_eq!(report.sections().len(), 2);
    assert!(report.recommendations().is_empty());

    let err = analyst.generate_pitch_deck(report.request_id()).unwrap_err();
    assert!(matches!(err, Error::ReportUnusable { .. }));
}

#[tokio::test]
async fn test_reject_policy_records_then_fails() {
    let config = OrchestratorConfig {
        total_failure_policy: TotalFailurePolicy::Reject,
        ..test_config()
    };
    let analyst = analyst_with(ProviderRouting::new(Failing::permanent()), config);

    let err = analyst
        .submit_analysis("Electric cargo bikes for couriers", &[MarketResearch])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::TotalFailure { .. }));
    assert_eq!(analyst.list_history().unwrap().len(), 1);
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let flaky = Flaky::new(2);
    let analyst = analyst(ProviderRouting::new(flaky.clone()));

    let report = analyst
        .submit_analysis("Electric cargo bikes for couriers", &[MarketResearch])
        .await
        .unwrap();

    let section = report.section(MarketResearch).unwrap();
    assert!(section.succeeded());
    assert_eq!(section.attempts, 3);
    assert_eq!(flaky.calls(), 3);
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let analyst = analyst(ProviderRouting::new(Failing::rate_limited()));

    let report = analyst
        .submit_analysis("Electric cargo bikes for couriers", &[MarketResearch])
        .await
        .unwrap();

    let section = report.section(MarketResearch).unwrap();
    assert!(!section.succeeded());
    assert_eq!(section.attempts, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submissions_each_recorded_once() {
    let dir = tempfile::tempdir().unwrap();
    let history = Arc::new(HistoryStore::new(dir.path().join("history.db")).unwrap());
    let analyst = Arc::new(StartupAnalyst::new(
        history.clone(),
        ProviderRouting::new(Canned::delayed("Canned", Duration::from_millis(5))),
        test_config(),
    ));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let analyst = analyst.clone();
            tokio::spawn(async move {
                analyst
                    .submit_analysis(&format!("Idea number {} for testing", i), &[MarketResearch, GoToMarket])
                    .await
            })
        })
        .collect();

    let mut submitted = HashSet::new();
    for handle in handles {
        submitted.insert(handle.await.unwrap().unwrap().request_id());
    }

    let recorded = history.list().unwrap();
    assert_eq!(recorded.len(), 8);
    let recorded: HashSet<_> = recorded.iter().map(|r| r.request_id()).collect();
    assert_eq!(recorded, submitted);
}

#[tokio::test]
async fn test_cancelled_run_records_nothing() {
    let analyst = analyst(ProviderRouting::new(Canned::delayed(
        "Slow",
        Duration::from_secs(30),
    )));
    let request = AnalysisRequest::new("Electric cargo bikes for couriers", &[MarketResearch]).unwrap();
    let token = CancellationToken::new();

    let cancel = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
    });

    let err = analyst.submit_cancellable(&request, &token).await.unwrap_err();
    assert!(matches!(err, Error::Cancelled(id) if id == request.request_id()));
    assert!(analyst.list_history().unwrap().is_empty());
}

#[tokio::test]
async fn test_export_survives_oversized_figures() {
    let provider = Arc::new(Canned {
        name: "Canned".to_string(),
        text: "- Expect 400000000 years to market".to_string(),
        delay: Duration::ZERO,
    });
    let analyst = analyst(ProviderRouting::new(provider));

    let report = analyst
        .submit_analysis("Electric cargo bikes for couriers", &[GoToMarket])
        .await
        .unwrap();

    let markdown = analyst
        .export_analysis(report.request_id(), ExportFormat::Markdown)
        .unwrap();
    assert!(markdown.contains("400000000 years to market"));
    assert!(!markdown.contains("Time to Market"));
    analyst
        .export_analysis(report.request_id(), ExportFormat::Text)
        .unwrap();
}

#[tokio::test]
async fn test_invalid_requests_rejected() {
    let analyst = analyst(ProviderRouting::new(Canned::new("Canned")));
    let err = analyst.submit_analysis("   ", &[MarketResearch]).await.unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(_)));
    assert!(analyst.list_history().unwrap().is_empty());
}
