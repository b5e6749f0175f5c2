pub mod pitch_deck;
pub mod validator;
pub mod exporter;

pub use pitch_deck::PitchDeckGenerator;
pub use validator::BusinessModelValidator;
pub use exporter::{ExportFormat, Exporter};
