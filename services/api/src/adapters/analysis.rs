//! services/api/src/adapters/analysis.rs
//!
//! This module contains the adapter for the document-analysis model.
//! It implements the `DocumentAnalysisService` port from the `core` crate.

const SYSTEM_INSTRUCTIONS: &str = "You are an expert prompt engineer for an image-generation model. \
You are given a document and must produce exactly one image-generation prompt describing a visual \
that captures the document's content. Respond with the prompt text only: no preamble, no markdown, \
no quotes, no alternatives.";

/// The default prompt-structure instruction, used when the caller supplies
/// neither a template nor a style preset.
const STRUCTURE_INSTRUCTIONS: &str = "Structure the prompt in five parts, in this order: \
the subject, the setting, the action, the visual style, and the technical specifications \
(resolution, lens, lighting).";

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequestArgs, ImageUrlArgs,
    },
    Client, error::OpenAIError,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use prompt_studio_core::{
    catalog::find_style_preset,
    domain::DocumentFile,
    ports::{DocumentAnalysisService, PortError, PortResult},
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `DocumentAnalysisService` using an
/// OpenAI-compatible multimodal chat model.
#[derive(Clone)]
pub struct GeminiAnalysisAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl GeminiAnalysisAdapter {
    /// Creates a new `GeminiAnalysisAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// Picks the task instruction for this analysis request. A template wins
    /// over a style preset; with neither, the default five-part structure
    /// instruction applies.
    fn task_instructions(style_preset: Option<&str>, template: Option<&str>) -> String {
        if let Some(template) = template {
            return format!(
                "Fill in every {{{{placeholder}}}} in the following template using the document's \
content, and return the completed prompt text only:\n\n{template}"
            );
        }
        if let Some(preset) = style_preset
            .filter(|id| *id != "none")
            .and_then(find_style_preset)
        {
            return format!(
                "Describe the image in the '{}' style. Weave these style cues into the prompt: {}. {}",
                preset.label, preset.modifier, STRUCTURE_INSTRUCTIONS
            );
        }
        STRUCTURE_INSTRUCTIONS.to_string()
    }
}

//=========================================================================================
// `DocumentAnalysisService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentAnalysisService for GeminiAnalysisAdapter {
    /// Turns an uploaded document into a single image-generation prompt.
    async fn analyze_document(
        &self,
        file: &DocumentFile,
        style_preset: Option<&str>,
        template: Option<&str>,
    ) -> PortResult<String> {
        let data_uri = format!(
            "data:{};base64,{}",
            file.media_type,
            BASE64.encode(&file.data)
        );
        let instructions = format!(
            "Analyze the attached document ({}). {}",
            file.file_name,
            Self::task_instructions(style_preset, template)
        );

        let parts: Vec<ChatCompletionRequestUserMessageContentPart> = vec![
            ChatCompletionRequestMessageContentPartTextArgs::default()
                .text(instructions)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestMessageContentPartImageArgs::default()
                .image_url(
                    ImageUrlArgs::default()
                        .url(data_uri)
                        .build()
                        .map_err(|e| PortError::Unexpected(e.to_string()))?,
                )
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(parts)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let prompt = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        // The contract forbids returning empty text: the caller treats an
        // unusable response as a failed analysis, not an empty candidate.
        if prompt.is_empty() {
            return Err(PortError::Unexpected(
                "Analysis model returned no usable prompt text.".to_string(),
            ));
        }
        Ok(prompt)
    }
}
