//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a WebSocket connection.
//! It forwards user intents into the conversation state machine and delegates
//! the remote-call cycles to the worker tasks.
//!
//! Intents are processed strictly in arrival order, one at a time, so at most
//! one remote call is ever in flight per session; the state machine's
//! source-state guards turn anything the UI failed to disable into a no-op.

use crate::web::{
    analysis_task::analysis_process,
    generation_task::generation_process,
    protocol::{ClientMessage, ServerMessage},
    publisher::{EventPublisher, WsPublisher},
    state::{AppState, PendingUpload, SessionState},
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::StreamExt;
use prompt_studio_core::ports::PortResult;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Pacing delay before the assistant echoes a typed prompt back as a candidate.
const ECHO_DELAY: Duration = Duration::from_millis(500);
/// Pacing delay before a regenerated candidate appears.
const REFINE_DELAY: Duration = Duration::from_millis(1000);

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    info!("New WebSocket connection established.");

    // The sender is wrapped in an Arc<Mutex<>> so the worker tasks can share it.
    let (sender, mut receiver) = socket.split();
    let ws_sender = Arc::new(Mutex::new(sender));
    let publisher = WsPublisher::new(ws_sender.clone());

    let session_state_lock = Arc::new(Mutex::new(SessionState::new()));

    // --- 1. Initialization Phase ---
    let initial_settings = {
        let session = session_state_lock.lock().await;
        session.settings.snapshot().clone()
    };
    if publisher
        .publish(ServerMessage::SessionReady {
            settings: initial_settings,
        })
        .await
        .is_err()
    {
        warn!("Failed to send SessionReady; closing connection.");
        return;
    }

    // --- 2. Main Message Loop ---
    loop {
        if let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    if let Err(e) =
                        handle_text_frame(&text, &app_state, &session_state_lock, &publisher).await
                    {
                        warn!("Failed to handle client message: {:?}", e);
                    }
                }
                Message::Binary(data) => {
                    let mut session = session_state_lock.lock().await;
                    match session.pending_upload.as_mut() {
                        Some(upload) => upload.buffer.extend_from_slice(&data),
                        None => warn!("Binary frame received without a pending upload; dropping."),
                    }
                }
                Message::Close(_) => {
                    info!("Client sent close message.");
                    break;
                }
                _ => {}
            }
        } else {
            info!("Client disconnected.");
            break;
        }
    }

    info!("WebSocket connection closed.");
}

/// Parses one text frame and dispatches it. A frame that does not deserialize
/// into a `ClientMessage` is reported back to the client rather than dropped
/// silently.
pub async fn handle_text_frame(
    text: &str,
    app_state: &Arc<AppState>,
    session_state_lock: &Arc<Mutex<SessionState>>,
    publisher: &dyn EventPublisher,
) -> PortResult<()> {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => {
            handle_client_message(message, app_state, session_state_lock, publisher).await
        }
        Err(e) => {
            warn!("Failed to deserialize client message: {}", e);
            publisher
                .publish(ServerMessage::Error {
                    message: "Unrecognized client message.".to_string(),
                })
                .await
        }
    }
}

/// Helper function to handle the logic for different `ClientMessage` variants.
pub async fn handle_client_message(
    message: ClientMessage,
    app_state: &Arc<AppState>,
    session_state_lock: &Arc<Mutex<SessionState>>,
    publisher: &dyn EventPublisher,
) -> PortResult<()> {
    match message {
        ClientMessage::SubmitText { message } => {
            let turn = {
                let mut session = session_state_lock.lock().await;
                session.conversation.submit_text(&message).cloned()
            };
            let Some(turn) = turn else {
                warn!("Text submitted while a call is in flight; ignoring.");
                return Ok(());
            };
            publisher.publish(ServerMessage::TurnAppended { turn }).await?;

            // The echo delay paces the conversational UI; it is not a computation.
            tokio::time::sleep(ECHO_DELAY).await;

            let (turn, state) = {
                let mut session = session_state_lock.lock().await;
                let turn = session.conversation.propose_candidate(&message).cloned();
                (turn, session.conversation.state())
            };
            if let Some(turn) = turn {
                publisher.publish(ServerMessage::TurnAppended { turn }).await?;
                publisher.publish(ServerMessage::StateChanged { state }).await?;
            }
        }

        ClientMessage::UploadStarted {
            file_name,
            media_type,
            template,
        } => {
            let mut session = session_state_lock.lock().await;
            if session.conversation.state().is_transient() {
                warn!("Upload announced while a call is in flight; ignoring.");
                return Ok(());
            }
            info!("Upload started: '{}' ({})", file_name, media_type);
            session.pending_upload = Some(PendingUpload {
                file_name,
                media_type,
                template,
                buffer: Vec::new(),
            });
        }

        ClientMessage::UploadEnded => {
            analysis_process(app_state.clone(), session_state_lock.clone(), publisher).await?;
        }

        ClientMessage::EditCandidate { text } => {
            let mut session = session_state_lock.lock().await;
            if !session.conversation.edit_candidate(&text) {
                warn!("Candidate edit received without a ready candidate; ignoring.");
            }
        }

        ClientMessage::ConfirmPrompt => {
            generation_process(app_state.clone(), session_state_lock.clone(), publisher).await?;
        }

        ClientMessage::RegeneratePrompt => {
            let turn = {
                let mut session = session_state_lock.lock().await;
                session.conversation.begin_refinement().cloned()
            };
            let Some(turn) = turn else {
                warn!("Regenerate received without a ready candidate; ignoring.");
                return Ok(());
            };
            publisher.publish(ServerMessage::TurnAppended { turn }).await?;
            publisher
                .publish(ServerMessage::StateChanged {
                    state: prompt_studio_core::conversation::ConversationState::Refining,
                })
                .await?;

            tokio::time::sleep(REFINE_DELAY).await;

            let (turn, state) = {
                let mut session = session_state_lock.lock().await;
                let turn = session.conversation.finish_refinement().cloned();
                (turn, session.conversation.state())
            };
            if let Some(turn) = turn {
                publisher.publish(ServerMessage::TurnAppended { turn }).await?;
                publisher.publish(ServerMessage::StateChanged { state }).await?;
            }
        }

        ClientMessage::UpdateSetting { update } => {
            let settings = {
                let mut session = session_state_lock.lock().await;
                session.settings.update(update).clone()
            };
            publisher
                .publish(ServerMessage::SettingsUpdated { settings })
                .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::web::publisher::testing::{ChannelPublisher, Published};
    use async_trait::async_trait;
    use bytes::Bytes;
    use prompt_studio_core::{
        conversation::ConversationState,
        domain::{DocumentFile, GeneratedImage, GenerationSettings},
        ports::{DocumentAnalysisService, ImageGenerationService, PortError},
        settings::SettingsUpdate,
    };
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
    use tracing::Level;

    struct StubAnalysis {
        prompt: Result<String, String>,
    }

    #[async_trait]
    impl DocumentAnalysisService for StubAnalysis {
        async fn analyze_document(
            &self,
            _file: &DocumentFile,
            _style_preset: Option<&str>,
            _template: Option<&str>,
        ) -> prompt_studio_core::ports::PortResult<String> {
            self.prompt
                .clone()
                .map_err(PortError::Unexpected)
        }
    }

    /// An analysis call that never settles, for exercising the timeout path.
    struct HungAnalysis;

    #[async_trait]
    impl DocumentAnalysisService for HungAnalysis {
        async fn analyze_document(
            &self,
            _file: &DocumentFile,
            _style_preset: Option<&str>,
            _template: Option<&str>,
        ) -> prompt_studio_core::ports::PortResult<String> {
            futures::future::pending().await
        }
    }

    struct StubGeneration {
        image: Result<&'static [u8], String>,
    }

    #[async_trait]
    impl ImageGenerationService for StubGeneration {
        async fn generate_image(
            &self,
            _prompt: &str,
            _settings: &GenerationSettings,
        ) -> prompt_studio_core::ports::PortResult<GeneratedImage> {
            match &self.image {
                Ok(bytes) => Ok(GeneratedImage {
                    data: Bytes::from_static(bytes),
                    media_type: "image/png".to_string(),
                }),
                Err(message) => Err(PortError::Unexpected(message.clone())),
            }
        }
    }

    fn test_config() -> Config {
        Config {
            bind_address: "127.0.0.1:0".parse().unwrap(),
            log_level: Level::INFO,
            gemini_api_key: "test-key".to_string(),
            api_base: None,
            analysis_model: "test-analysis".to_string(),
            image_model: "test-image".to_string(),
            request_timeout_secs: 5,
            access_username: None,
            access_password: None,
        }
    }

    fn test_app(
        analysis: Arc<dyn DocumentAnalysisService>,
        image: Arc<dyn ImageGenerationService>,
    ) -> Arc<AppState> {
        Arc::new(AppState {
            config: Arc::new(test_config()),
            analysis_adapter: analysis,
            image_adapter: image,
            access_tokens: Arc::new(Mutex::new(Default::default())),
        })
    }

    fn harness(
        analysis: Arc<dyn DocumentAnalysisService>,
        image: Arc<dyn ImageGenerationService>,
    ) -> (
        Arc<AppState>,
        Arc<Mutex<SessionState>>,
        ChannelPublisher,
        UnboundedReceiver<Published>,
    ) {
        let (tx, rx) = unbounded_channel();
        (
            test_app(analysis, image),
            Arc::new(Mutex::new(SessionState::new())),
            ChannelPublisher::new(tx),
            rx,
        )
    }

    fn drain(rx: &mut UnboundedReceiver<Published>) -> Vec<Published> {
        let mut out = Vec::new();
        while let Ok(published) = rx.try_recv() {
            out.push(published);
        }
        out
    }

    async fn upload_document(
        app: &Arc<AppState>,
        session: &Arc<Mutex<SessionState>>,
        publisher: &dyn EventPublisher,
        file_name: &str,
        bytes: &[u8],
    ) {
        handle_client_message(
            ClientMessage::UploadStarted {
                file_name: file_name.to_string(),
                media_type: "application/pdf".to_string(),
                template: None,
            },
            app,
            session,
            publisher,
        )
        .await
        .unwrap();
        session
            .lock()
            .await
            .pending_upload
            .as_mut()
            .unwrap()
            .buffer
            .extend_from_slice(bytes);
        handle_client_message(ClientMessage::UploadEnded, app, session, publisher)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn happy_path_document_flow_publishes_full_cycle() {
        let (app, session, publisher, mut rx) = harness(
            Arc::new(StubAnalysis {
                prompt: Ok("X".to_string()),
            }),
            Arc::new(StubGeneration { image: Ok(b"IMG") }),
        );

        upload_document(&app, &session, &publisher, "report.pdf", b"%PDF-1.4").await;

        let events = drain(&mut rx);
        assert!(matches!(
            &events[0],
            Published::Message(ServerMessage::StateChanged {
                state: ConversationState::AwaitingAnalysis
            })
        ));
        match &events[1] {
            Published::Message(ServerMessage::TurnAppended { turn }) => {
                assert_eq!(turn.candidate.as_deref(), Some("X"));
                assert!(turn.text.contains("report.pdf"));
            }
            other => panic!("expected candidate turn, got {other:?}"),
        }
        assert!(matches!(
            &events[2],
            Published::Message(ServerMessage::StateChanged {
                state: ConversationState::CandidateReady
            })
        ));

        handle_client_message(ClientMessage::ConfirmPrompt, &app, &session, &publisher)
            .await
            .unwrap();

        let events = drain(&mut rx);
        assert!(matches!(
            &events[0],
            Published::Message(ServerMessage::StateChanged {
                state: ConversationState::AwaitingGeneration
            })
        ));
        assert!(matches!(
            &events[2],
            Published::Message(ServerMessage::StateChanged {
                state: ConversationState::GenerationComplete
            })
        ));
        assert!(matches!(
            &events[3],
            Published::Message(ServerMessage::ImageGenerated { .. })
        ));
        match &events[4] {
            Published::Binary(data) => assert_eq!(data.as_ref(), b"IMG"),
            other => panic!("expected image bytes, got {other:?}"),
        }

        let session = session.lock().await;
        assert_eq!(session.conversation.image().unwrap().data.as_ref(), b"IMG");
    }

    #[tokio::test]
    async fn analysis_failure_returns_to_idle() {
        let (app, session, publisher, mut rx) = harness(
            Arc::new(StubAnalysis {
                prompt: Err("service unavailable".to_string()),
            }),
            Arc::new(StubGeneration { image: Ok(b"IMG") }),
        );

        upload_document(&app, &session, &publisher, "report.pdf", b"%PDF-1.4").await;

        let events = drain(&mut rx);
        match &events[1] {
            Published::Message(ServerMessage::TurnAppended { turn }) => {
                assert!(turn.text.contains("error analyzing"));
                assert!(turn.candidate.is_none());
            }
            other => panic!("expected failure turn, got {other:?}"),
        }
        assert!(matches!(
            &events[2],
            Published::Message(ServerMessage::StateChanged {
                state: ConversationState::Idle
            })
        ));

        let session = session.lock().await;
        assert!(session.conversation.candidate().is_none());
        assert_eq!(session.conversation.turns().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_analysis_call_times_out_into_failure_turn() {
        let (app, session, publisher, mut rx) = harness(
            Arc::new(HungAnalysis),
            Arc::new(StubGeneration { image: Ok(b"IMG") }),
        );

        upload_document(&app, &session, &publisher, "report.pdf", b"%PDF-1.4").await;

        let events = drain(&mut rx);
        match &events[1] {
            Published::Message(ServerMessage::TurnAppended { turn }) => {
                assert!(turn.text.contains("error analyzing"));
            }
            other => panic!("expected failure turn, got {other:?}"),
        }
        assert_eq!(
            session.lock().await.conversation.state(),
            ConversationState::Idle
        );
    }

    #[tokio::test(start_paused = true)]
    async fn typed_prompt_is_echoed_as_candidate_after_pacing() {
        let (app, session, publisher, mut rx) = harness(
            Arc::new(StubAnalysis {
                prompt: Ok("unused".to_string()),
            }),
            Arc::new(StubGeneration { image: Ok(b"IMG") }),
        );

        handle_client_message(
            ClientMessage::SubmitText {
                message: "a city skyline".to_string(),
            },
            &app,
            &session,
            &publisher,
        )
        .await
        .unwrap();

        let events = drain(&mut rx);
        match (&events[0], &events[1]) {
            (
                Published::Message(ServerMessage::TurnAppended { turn: user_turn }),
                Published::Message(ServerMessage::TurnAppended { turn: echo_turn }),
            ) => {
                assert_eq!(user_turn.text, "a city skyline");
                assert!(user_turn.candidate.is_none());
                assert_eq!(echo_turn.candidate.as_deref(), Some("a city skyline"));
                assert!(user_turn.id < echo_turn.id);
            }
            other => panic!("expected user turn then echo turn, got {other:?}"),
        }
        assert_eq!(
            session.lock().await.conversation.state(),
            ConversationState::CandidateReady
        );
    }

    #[tokio::test(start_paused = true)]
    async fn regenerate_replaces_candidate_after_pacing() {
        let (app, session, publisher, mut rx) = harness(
            Arc::new(StubAnalysis {
                prompt: Ok("unused".to_string()),
            }),
            Arc::new(StubGeneration { image: Ok(b"IMG") }),
        );

        handle_client_message(
            ClientMessage::SubmitText {
                message: "A".to_string(),
            },
            &app,
            &session,
            &publisher,
        )
        .await
        .unwrap();
        drain(&mut rx);

        handle_client_message(ClientMessage::RegeneratePrompt, &app, &session, &publisher)
            .await
            .unwrap();

        let events = drain(&mut rx);
        match &events[0] {
            Published::Message(ServerMessage::TurnAppended { turn }) => {
                assert!(turn.text.contains("regenerating"));
            }
            other => panic!("expected refining turn, got {other:?}"),
        }
        match &events[2] {
            Published::Message(ServerMessage::TurnAppended { turn }) => {
                assert_eq!(turn.candidate.as_deref(), Some("A different perspective: A"));
            }
            other => panic!("expected refined candidate turn, got {other:?}"),
        }

        let session = session.lock().await;
        assert_eq!(
            session.conversation.candidate().unwrap().text,
            "A different perspective: A"
        );
    }

    #[tokio::test]
    async fn confirm_without_candidate_is_a_noop() {
        let (app, session, publisher, mut rx) = harness(
            Arc::new(StubAnalysis {
                prompt: Ok("unused".to_string()),
            }),
            Arc::new(StubGeneration { image: Ok(b"IMG") }),
        );

        handle_client_message(ClientMessage::ConfirmPrompt, &app, &session, &publisher)
            .await
            .unwrap();

        assert!(drain(&mut rx).is_empty());
        let session = session.lock().await;
        assert_eq!(session.conversation.state(), ConversationState::Idle);
        assert!(session.conversation.turns().is_empty());
    }

    #[tokio::test]
    async fn generation_failure_reports_reason_and_failed_state() {
        let (app, session, publisher, mut rx) = harness(
            Arc::new(StubAnalysis {
                prompt: Ok("X".to_string()),
            }),
            Arc::new(StubGeneration {
                image: Err("quota exceeded".to_string()),
            }),
        );

        upload_document(&app, &session, &publisher, "report.pdf", b"%PDF-1.4").await;
        drain(&mut rx);

        handle_client_message(ClientMessage::ConfirmPrompt, &app, &session, &publisher)
            .await
            .unwrap();

        let events = drain(&mut rx);
        match &events[1] {
            Published::Message(ServerMessage::TurnAppended { turn }) => {
                assert!(turn.text.contains("quota exceeded"));
            }
            other => panic!("expected failure turn, got {other:?}"),
        }
        assert!(matches!(
            &events[2],
            Published::Message(ServerMessage::StateChanged {
                state: ConversationState::GenerationFailed
            })
        ));
    }

    #[tokio::test]
    async fn malformed_frame_is_reported_and_leaves_conversation_untouched() {
        let (app, session, publisher, mut rx) = harness(
            Arc::new(StubAnalysis {
                prompt: Ok("unused".to_string()),
            }),
            Arc::new(StubGeneration { image: Ok(b"IMG") }),
        );

        handle_text_frame(r#"{"type":"bogus"}"#, &app, &session, &publisher)
            .await
            .unwrap();

        let events = drain(&mut rx);
        match &events[0] {
            Published::Message(ServerMessage::Error { message }) => {
                assert!(message.contains("Unrecognized"));
            }
            other => panic!("expected error message, got {other:?}"),
        }
        assert_eq!(events.len(), 1);

        let session = session.lock().await;
        assert!(session.conversation.turns().is_empty());
        assert_eq!(session.conversation.state(), ConversationState::Idle);
    }

    #[tokio::test]
    async fn settings_update_publishes_full_snapshot() {
        let (app, session, publisher, mut rx) = harness(
            Arc::new(StubAnalysis {
                prompt: Ok("unused".to_string()),
            }),
            Arc::new(StubGeneration { image: Ok(b"IMG") }),
        );

        handle_client_message(
            ClientMessage::UpdateSetting {
                update: SettingsUpdate::GuidanceScale(12.0),
            },
            &app,
            &session,
            &publisher,
        )
        .await
        .unwrap();

        let events = drain(&mut rx);
        match &events[0] {
            Published::Message(ServerMessage::SettingsUpdated { settings }) => {
                assert_eq!(settings.guidance_scale, 12.0);
                assert_eq!(settings.style_preset, "photographic");
            }
            other => panic!("expected settings snapshot, got {other:?}"),
        }
    }
}
