pub mod config;
pub mod error;
pub mod models;
pub mod llm;
pub mod analysis;
pub mod artifacts;
pub mod storage;
pub mod analyst;
pub mod server;

pub use config::{Config, OrchestratorConfig, TotalFailurePolicy};
pub use error::{Error, Result};
pub use llm::{GeminiProvider, LLMProvider, OpenAIProvider, ProviderError};
pub use analysis::{AnalysisOrchestrator, ProviderRouting};
pub use artifacts::ExportFormat;
pub use analyst::StartupAnalyst;
pub use storage::HistoryStore;
