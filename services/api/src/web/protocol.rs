//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the
//! API server for the prompt studio. The server republishes conversation
//! state through these messages; the client renders it and forwards user
//! intents back up.

use prompt_studio_core::{
    conversation::ConversationState,
    domain::{ChatTurn, GenerationSettings},
    settings::SettingsUpdate,
};
use serde::{Deserialize, Serialize};

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================
// NOTE: Document bytes are sent as raw Binary frames between `UploadStarted`
// and `UploadEnded`, not as part of this enum.
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// The user typed a prompt into the chat input.
    SubmitText { message: String },

    /// Announces a document upload. Subsequent Binary frames carry the file
    /// bytes until `UploadEnded` arrives. `template` asks the analysis to
    /// fill a quick-prompt template instead of free-form prompting.
    UploadStarted {
        file_name: String,
        media_type: String,
        template: Option<String>,
    },

    /// The document transfer is complete; run the analysis.
    UploadEnded,

    /// The user edited the live candidate prompt inline.
    EditCandidate { text: String },

    /// The user confirmed the live candidate; generate the image.
    ConfirmPrompt,

    /// The user asked for a regenerated variant of the live candidate.
    RegeneratePrompt,

    /// The user changed one generation setting.
    UpdateSetting { update: SettingsUpdate },
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================
// NOTE: Generated image bytes are sent as one raw Binary frame immediately
// after `ImageGenerated`; these messages provide context for that frame.
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once on connect with the initial settings snapshot.
    SessionReady { settings: GenerationSettings },

    /// The conversation moved to a new lifecycle state.
    StateChanged { state: ConversationState },

    /// A turn was appended to the conversation history.
    TurnAppended { turn: ChatTurn },

    /// A generation succeeded; one Binary frame with the image bytes follows.
    ImageGenerated { media_type: String },

    /// A settings update was applied; carries the full new snapshot.
    SettingsUpdated { settings: GenerationSettings },

    /// Reports an error to the client, which should display an error message.
    Error { message: String },
}
