//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{GeminiAnalysisAdapter, GeminiImageAdapter},
    config::Config,
    error::ApiError,
    web::{
        auth::{login_handler, logout_handler},
        health_handler, list_quick_prompts_handler, list_style_presets_handler,
        middleware::require_auth,
        rest::ApiDoc,
        state::AppState,
        ws_handler,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    // Config::from_env fails fast when GEMINI_API_KEY is absent: the remote
    // calls cannot be authorized without it, so the process refuses to start.
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Service Adapters ---
    let mut openai_config = OpenAIConfig::new().with_api_key(&config.gemini_api_key);
    if let Some(api_base) = &config.api_base {
        openai_config = openai_config.with_api_base(api_base);
    }
    let openai_client = Client::with_config(openai_config);

    let analysis_adapter = Arc::new(GeminiAnalysisAdapter::new(
        openai_client.clone(),
        config.analysis_model.clone(),
    ));
    let image_adapter = Arc::new(GeminiImageAdapter::new(
        openai_client.clone(),
        config.image_model.clone(),
    ));

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        analysis_adapter,
        image_adapter,
        access_tokens: Arc::new(Mutex::new(HashSet::new())),
    });
    if config.access_gate_enabled() {
        info!("Access gate is enabled.");
    }

    let cors_layer = tower_http::cors::CorsLayer::new()
        .allow_origin(HeaderValue::from_static("http://localhost:5173"))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    // Public routes (no gate required)
    let public_routes = Router::new()
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/healthz", get(health_handler));

    // Protected routes (gate required, when configured)
    let protected_routes = Router::new()
        .route("/presets", get(list_style_presets_handler))
        .route("/quick-prompts", get(list_quick_prompts_handler))
        .route("/ws", get(ws_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors_layer)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
