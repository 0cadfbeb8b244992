//! services/api/src/adapters/generation.rs
//!
//! This module contains the adapter for the image-generation model.
//! It implements the `ImageGenerationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    types::images::{CreateImageRequestArgs, Image, ImageModel, ImageResponseFormat},
    Client, error::OpenAIError,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use bytes::Bytes;
use prompt_studio_core::{
    catalog::find_style_preset,
    domain::{GeneratedImage, GenerationSettings},
    ports::{ImageGenerationService, PortError, PortResult},
};

/// Fixed quality keywords appended to every generation prompt.
pub const QUALITY_KEYWORDS: &str = "high quality, highly detailed, sharp focus, professional grade";

/// Folds the generation settings into the confirmed prompt as trailing
/// free-text directives, in a fixed order: base prompt, quality keywords,
/// style modifier, aspect ratio, negative prompt, guidance scale. The remote
/// model accepts only free text, so nothing travels as a structured parameter.
pub fn compose_prompt(prompt: &str, settings: &GenerationSettings) -> String {
    let mut parts: Vec<String> = vec![prompt.to_string(), QUALITY_KEYWORDS.to_string()];

    if settings.style_preset != "none" {
        if let Some(preset) = find_style_preset(&settings.style_preset) {
            if !preset.modifier.is_empty() {
                parts.push(preset.modifier.to_string());
            }
        }
    }

    parts.push(format!("aspect ratio {}", settings.aspect_ratio.as_str()));
    if !settings.negative_prompt.is_empty() {
        parts.push(format!("avoid: {}", settings.negative_prompt));
    }
    parts.push(format!("guidance scale {}", settings.guidance_scale));

    parts.join(", ")
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ImageGenerationService` using an
/// OpenAI-compatible image-generation API.
#[derive(Clone)]
pub struct GeminiImageAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl GeminiImageAdapter {
    /// Creates a new `GeminiImageAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `ImageGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ImageGenerationService for GeminiImageAdapter {
    /// Renders the confirmed prompt into an image.
    async fn generate_image(
        &self,
        prompt: &str,
        settings: &GenerationSettings,
    ) -> PortResult<GeneratedImage> {
        let full_prompt = compose_prompt(prompt, settings);

        // The model name is free-form for OpenAI-compatible endpoints, so it
        // travels as `ImageModel::Other` rather than one of the known variants.
        let request = CreateImageRequestArgs::default()
            .model(ImageModel::Other(self.model.clone()))
            .prompt(full_prompt)
            .n(1)
            .response_format(ImageResponseFormat::B64Json)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error, which respects the orphan rule.
        let response = self
            .client
            .images()
            .generate(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        // The contract requires a decodable image payload; anything else is a
        // failed generation.
        let image = response.data.into_iter().next().ok_or_else(|| {
            PortError::Unexpected("Image model returned no image payload.".to_string())
        })?;

        match image.as_ref() {
            Image::B64Json { b64_json, .. } => {
                let data = BASE64.decode(b64_json.as_bytes()).map_err(|e| {
                    PortError::Unexpected(format!("Image payload was not valid base64: {e}"))
                })?;
                Ok(GeneratedImage {
                    data: Bytes::from(data),
                    media_type: "image/png".to_string(),
                })
            }
            Image::Url { .. } => Err(PortError::Unexpected(
                "Image model returned a URL instead of inline image data.".to_string(),
            )),
        }
    }
}
