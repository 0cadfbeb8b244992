pub mod analysis_task;
pub mod auth;
pub mod generation_task;
pub mod middleware;
pub mod protocol;
pub mod publisher;
pub mod rest;
pub mod state;
pub mod ws_handler;

// Re-export the main WebSocket handler to make it easily accessible
// to the binary that will build the web server router.
pub use middleware::require_auth;
pub use rest::{health_handler, list_quick_prompts_handler, list_style_presets_handler};
pub use ws_handler::ws_handler;
