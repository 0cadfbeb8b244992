//! services/api/src/web/state.rs
//!
//! Defines the application's shared and session-specific states.

use crate::config::Config;
use prompt_studio_core::{
    conversation::Conversation,
    domain::{DocumentFile, GenerationSettings},
    ports::{DocumentAnalysisService, ImageGenerationService},
    settings::SettingsStore,
};
use bytes::Bytes;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub analysis_adapter: Arc<dyn DocumentAnalysisService>,
    pub image_adapter: Arc<dyn ImageGenerationService>,
    /// Session tokens issued by the access gate. In-memory only: a restart
    /// logs everyone out, which is fine for a gate that is not a real
    /// authentication system.
    pub access_tokens: Arc<Mutex<HashSet<String>>>,
}

//=========================================================================================
// SessionState (Specific to One WebSocket Connection)
//=========================================================================================

/// A document upload in progress: announced by `UploadStarted`, fed by
/// Binary frames, consumed by `UploadEnded`.
#[derive(Debug)]
pub struct PendingUpload {
    pub file_name: String,
    pub media_type: String,
    pub template: Option<String>,
    pub buffer: Vec<u8>,
}

impl PendingUpload {
    /// Seals the buffered bytes into a `DocumentFile` for analysis.
    pub fn into_document(self) -> DocumentFile {
        DocumentFile {
            file_name: self.file_name,
            media_type: self.media_type,
            data: Bytes::from(self.buffer),
        }
    }
}

/// The state for a single, active WebSocket connection.
///
/// Everything here lives exactly as long as the connection: there is no
/// persistence, and a reload starts from scratch.
pub struct SessionState {
    pub conversation: Conversation,
    pub settings: SettingsStore,
    pub pending_upload: Option<PendingUpload>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            conversation: Conversation::new(),
            settings: SettingsStore::new(GenerationSettings::default()),
            pending_upload: None,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
