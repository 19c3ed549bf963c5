pub mod analyzer;
pub mod extract;
pub(crate) mod geometry;
pub mod types;

pub use analyzer::{analyze, PopupAnalyzer, CANDIDATE_CONTAINERS};
pub use types::{ActionDescriptor, AnalysisOutcome, ImageDescriptor, PopupDetails, PopupResult};
