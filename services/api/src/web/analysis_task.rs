//! services/api/src/web/analysis_task.rs
//!
//! This module contains the asynchronous "worker" function responsible for
//! one document-analysis cycle: upload buffer in, candidate prompt out.

use crate::web::{
    protocol::ServerMessage,
    publisher::EventPublisher,
    state::{AppState, SessionState},
};
use prompt_studio_core::ports::{PortError, PortResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Runs one analysis cycle for the buffered upload.
///
/// The conversation is parked in `AwaitingAnalysis` before the remote call
/// and settled afterward; triggers that arrive in the wrong state are
/// dropped as no-ops. The remote call is bounded by the configured timeout,
/// and expiry is treated exactly like a remote failure.
pub async fn analysis_process(
    app_state: Arc<AppState>,
    session_state_lock: Arc<Mutex<SessionState>>,
    publisher: &dyn EventPublisher,
) -> PortResult<()> {
    let start_time = Instant::now();

    let (file, style_preset, template) = {
        let mut session = session_state_lock.lock().await;
        let Some(upload) = session.pending_upload.take() else {
            warn!("UploadEnded received without a pending upload; ignoring.");
            return Ok(());
        };
        if !session.conversation.begin_analysis() {
            warn!("Document submitted while a call is in flight; ignoring.");
            return Ok(());
        }
        let template = upload.template.clone();
        let style_preset = match session.settings.snapshot().style_preset.as_str() {
            "none" => None,
            id => Some(id.to_string()),
        };
        (upload.into_document(), style_preset, template)
    };
    info!("Analysis started for '{}'.", file.file_name);

    publisher
        .publish(ServerMessage::StateChanged {
            state: prompt_studio_core::conversation::ConversationState::AwaitingAnalysis,
        })
        .await?;

    let timeout = Duration::from_secs(app_state.config.request_timeout_secs);
    let result = match tokio::time::timeout(
        timeout,
        app_state
            .analysis_adapter
            .analyze_document(&file, style_preset.as_deref(), template.as_deref()),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => Err(PortError::Timeout(app_state.config.request_timeout_secs)),
    };
    if let Err(error) = &result {
        warn!("Analysis failed for '{}': {}", file.file_name, error);
    }

    let (turn, state) = {
        let mut session = session_state_lock.lock().await;
        let turn = session
            .conversation
            .finish_analysis(&file.file_name, style_preset, template, result)
            .cloned();
        (turn, session.conversation.state())
    };

    if let Some(turn) = turn {
        publisher.publish(ServerMessage::TurnAppended { turn }).await?;
    }
    publisher.publish(ServerMessage::StateChanged { state }).await?;

    info!("Analysis cycle took: {:?}", start_time.elapsed());
    Ok(())
}
