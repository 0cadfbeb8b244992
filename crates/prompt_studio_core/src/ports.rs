//! crates/prompt_studio_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like remote AI APIs.

use crate::domain::{DocumentFile, GeneratedImage, GenerationSettings};
use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., network, API).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("The remote call did not complete within {0} seconds")]
    Timeout(u64),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DocumentAnalysisService: Send + Sync {
    /// Turns an uploaded document into a single image-generation prompt.
    ///
    /// `style_preset` biases the prompt toward a catalog style; `template` asks
    /// the service to fill a `{{Placeholder}}` template instead of free-form
    /// prompting. Implementations must fail rather than return empty text.
    async fn analyze_document(
        &self,
        file: &DocumentFile,
        style_preset: Option<&str>,
        template: Option<&str>,
    ) -> PortResult<String>;
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Renders a confirmed prompt into an image, folding the generation
    /// settings into the prompt text as trailing directives.
    ///
    /// Implementations must fail if the response carries no image payload.
    async fn generate_image(
        &self,
        prompt: &str,
        settings: &GenerationSettings,
    ) -> PortResult<GeneratedImage>;
}
