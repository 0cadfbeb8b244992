pub mod analysis;
pub mod generation;

pub use analysis::GeminiAnalysisAdapter;
pub use generation::GeminiImageAdapter;
