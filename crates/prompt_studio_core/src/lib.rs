pub mod catalog;
pub mod conversation;
pub mod domain;
pub mod ports;
pub mod settings;

pub use conversation::{Conversation, ConversationState};
pub use domain::{
    AspectRatio, CandidatePrompt, ChatTurn, DocumentFile, GeneratedImage, GenerationSettings,
    QuickPrompt, Speaker, StylePreset, TurnId,
};
pub use ports::{DocumentAnalysisService, ImageGenerationService, PortError, PortResult};
pub use settings::{SettingsStore, SettingsUpdate};
