pub mod dimension;
pub mod report;
pub mod artifact;

pub use dimension::*;
pub use report::*;
pub use artifact::*;
