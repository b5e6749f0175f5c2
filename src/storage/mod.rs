pub mod sqlite;

pub use sqlite::{HistoryStore, UsageStats};
