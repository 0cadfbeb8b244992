//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use axum::{http::StatusCode, response::{IntoResponse, Json}};
use prompt_studio_core::catalog::{QUICK_PROMPTS, STYLE_PRESETS};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_style_presets_handler,
        list_quick_prompts_handler,
        health_handler,
    ),
    components(
        schemas(StylePresetResponse, QuickPromptResponse)
    ),
    tags(
        (name = "Prompt Studio API", description = "API endpoints for the document-to-image prompt studio.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// One entry of the style catalog as served to clients.
#[derive(Serialize, ToSchema)]
pub struct StylePresetResponse {
    id: &'static str,
    label: &'static str,
    modifier: &'static str,
}

/// One entry of the quick-prompt library as served to clients.
#[derive(Serialize, ToSchema)]
pub struct QuickPromptResponse {
    label: &'static str,
    prompt: &'static str,
    template: Option<&'static str>,
    style_preset: Option<&'static str>,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List the style presets available for generation settings.
#[utoipa::path(
    get,
    path = "/presets",
    responses(
        (status = 200, description = "The full style catalog", body = [StylePresetResponse])
    )
)]
pub async fn list_style_presets_handler() -> impl IntoResponse {
    let presets: Vec<StylePresetResponse> = STYLE_PRESETS
        .iter()
        .map(|preset| StylePresetResponse {
            id: preset.id,
            label: preset.label,
            modifier: preset.modifier,
        })
        .collect();
    Json(presets)
}

/// List the ready-made quick prompts and their templates.
#[utoipa::path(
    get,
    path = "/quick-prompts",
    responses(
        (status = 200, description = "The quick-prompt library", body = [QuickPromptResponse])
    )
)]
pub async fn list_quick_prompts_handler() -> impl IntoResponse {
    let prompts: Vec<QuickPromptResponse> = QUICK_PROMPTS
        .iter()
        .map(|quick| QuickPromptResponse {
            label: quick.label,
            prompt: quick.prompt,
            template: quick.template,
            style_preset: quick.style_preset,
        })
        .collect();
    Json(prompts)
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service is up")
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    StatusCode::OK
}
