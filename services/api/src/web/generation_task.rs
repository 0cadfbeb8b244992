//! services/api/src/web/generation_task.rs
//!
//! This module contains the asynchronous "worker" function responsible for
//! one image-generation cycle: confirmed candidate in, image out.

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

/// Runs one generation cycle for the live candidate prompt.
///
/// A confirm from any state other than `CandidateReady` is a no-op. On
/// success the image bytes follow the `ImageGenerated` marker as one binary
/// frame; on failure (including timeout) the conversation lands in
/// `GenerationFailed` with a turn carrying the reason.
pub async fn generation_process(
    app_state: Arc<AppState>,
    session_state_lock: Arc<Mutex<SessionState>>,
    publisher: &dyn EventPublisher,
) -> PortResult<()> {
    let start_time = Instant::now();

    let (prompt, settings) = {
        let mut session = session_state_lock.lock().await;
        let Some(prompt) = session.conversation.begin_generation() else {
            warn!("Confirm received without a ready candidate; ignoring.");
            return Ok(());
        };
        (prompt, session.settings.snapshot().clone())
    };
    info!("Generation started for prompt of {} chars.", prompt.len());

    publisher
        .publish(ServerMessage::StateChanged {
            state: prompt_studio_core::conversation::ConversationState::AwaitingGeneration,
        })
        .await?;

    let timeout = Duration::from_secs(app_state.config.request_timeout_secs);
    let result = match tokio::time::timeout(
        timeout,
        app_state.image_adapter.generate_image(&prompt, &settings),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => Err(PortError::Timeout(app_state.config.request_timeout_secs)),
    };
    if let Err(error) = &result {
        warn!("Generation failed: {}", error);
    }

    let (turn, state, image) = {
        let mut session = session_state_lock.lock().await;
        let turn = session.conversation.finish_generation(result).cloned();
        let state = session.conversation.state();
        let image = session.conversation.image().cloned();
        (turn, state, image)
    };

    if let Some(turn) = turn {
        publisher.publish(ServerMessage::TurnAppended { turn }).await?;
    }
    publisher.publish(ServerMessage::StateChanged { state }).await?;

    if state == prompt_studio_core::conversation::ConversationState::GenerationComplete {
        if let Some(image) = image {
            publisher
                .publish(ServerMessage::ImageGenerated {
                    media_type: image.media_type.clone(),
                })
                .await?;
            publisher.publish_binary(image.data).await?;
        }
    }

    info!("Generation cycle took: {:?}", start_time.elapsed());
    Ok(())
}
