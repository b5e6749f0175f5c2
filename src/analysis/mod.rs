pub mod section;
pub mod routing;
pub mod orchestrator;
pub mod metrics;

pub use section::{RetryPolicy, SectionAnalyzer};
pub use routing::ProviderRouting;
pub use orchestrator::{derive_recommendations, AnalysisOrchestrator};
pub use metrics::{KeyMetrics, Level};
