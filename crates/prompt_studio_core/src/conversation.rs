//! crates/prompt_studio_core/src/conversation.rs
//!
//! The conversation state machine: owns the append-only chat history, the
//! live candidate prompt, and the most recent generated image, and defines
//! which user actions are legal in which lifecycle state.
//!
//! Remote calls and pacing delays live in the service layer; the machine
//! exposes begin/finish transition pairs so the transient states
//! (`AwaitingAnalysis`, `Refining`, `AwaitingGeneration`) are explicit
//! rather than scattered boolean flags. A trigger from the wrong source
//! state is a no-op, never an error: the presentation layer is expected to
//! disable the offending control, and the machine simply refuses to double
//! up on in-flight work.

use crate::domain::{
    CandidatePrompt, ChatTurn, GeneratedImage, Speaker, TurnId,
};
use crate::ports::PortResult;
use chrono::Utc;
use serde::Serialize;

/// The lifecycle state of the current generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    /// Nothing in progress; waiting for a document or a typed prompt.
    Idle,
    /// A document analysis call is in flight.
    AwaitingAnalysis,
    /// A candidate prompt is live and awaiting confirm/edit/regenerate.
    CandidateReady,
    /// A regenerate request is being paced before the refined candidate appears.
    Refining,
    /// An image generation call is in flight.
    AwaitingGeneration,
    /// The last generation succeeded; its image is on display.
    GenerationComplete,
    /// The last generation failed; the user must explicitly re-trigger.
    GenerationFailed,
}

impl ConversationState {
    /// True while a remote call or a pacing delay is pending.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ConversationState::AwaitingAnalysis
                | ConversationState::Refining
                | ConversationState::AwaitingGeneration
        )
    }
}

/// Canned assistant copy for the conversation surface.
mod copy {
    pub const ANALYSIS_FAILED: &str =
        "Sorry, I encountered an error analyzing the document. Please try again.";
    pub const GENERATION_SUCCEEDED: &str =
        "Image generated successfully! You can see it below.";
    pub const REFINING: &str = "I'm regenerating the prompt based on a different angle...";

    pub fn analyzed(file_name: &str, prompt: &str) -> String {
        format!(
            "I've analyzed {file_name}. Here is a suggested prompt for the image generation:\n\n\"{prompt}\"\n\nWould you like to generate this image or refine the prompt?"
        )
    }

    pub fn echoed(message: &str) -> String {
        format!("I've updated the prompt based on your input:\n\n\"{message}\"")
    }

    pub fn refined(prompt: &str) -> String {
        format!("Here is the refined prompt:\n\n\"{prompt}\"")
    }

    pub fn generation_failed(reason: &str) -> String {
        format!("Sorry, I couldn't generate the image: {reason}")
    }
}

/// The deterministic transformation applied to the live candidate when the
/// user asks for a regenerated variant.
pub fn refine_prompt(prompt: &str) -> String {
    format!("A different perspective: {prompt}")
}

/// One conversation: history, lifecycle state, live candidate, last image.
#[derive(Debug, Default)]
pub struct Conversation {
    turns: Vec<ChatTurn>,
    next_turn_id: u64,
    state: ConversationState,
    candidate: Option<CandidatePrompt>,
    image: Option<GeneratedImage>,
}

impl Default for ConversationState {
    fn default() -> Self {
        ConversationState::Idle
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    /// The full append-only history, oldest first.
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// The live candidate prompt, if one exists.
    pub fn candidate(&self) -> Option<&CandidatePrompt> {
        self.candidate.as_ref()
    }

    /// The most recent successfully generated image. Retained for display
    /// until superseded by the next successful generation.
    pub fn image(&self) -> Option<&GeneratedImage> {
        self.image.as_ref()
    }

    fn append_turn(&mut self, speaker: Speaker, text: String, candidate: Option<String>) -> &ChatTurn {
        let id = TurnId(self.next_turn_id);
        self.next_turn_id += 1;
        self.turns.push(ChatTurn {
            id,
            speaker,
            text,
            candidate,
            created_at: Utc::now(),
        });
        self.turns.last().unwrap()
    }

    //=====================================================================================
    // Document analysis
    //=====================================================================================

    /// Accepts a document submission and parks the conversation in
    /// `AwaitingAnalysis`. Returns false (and changes nothing) when triggered
    /// from a transient state.
    pub fn begin_analysis(&mut self) -> bool {
        if self.state.is_transient() {
            return false;
        }
        self.state = ConversationState::AwaitingAnalysis;
        true
    }

    /// Settles the analysis call. On success the returned prompt becomes the
    /// live candidate and the assistant proposes it in a new turn; on failure
    /// a single generic failure turn is appended and the conversation
    /// returns to `Idle` with no candidate set.
    pub fn finish_analysis(
        &mut self,
        file_name: &str,
        style_preset: Option<String>,
        template: Option<String>,
        result: PortResult<String>,
    ) -> Option<&ChatTurn> {
        if self.state != ConversationState::AwaitingAnalysis {
            return None;
        }
        match result {
            Ok(prompt) => {
                self.candidate = Some(CandidatePrompt {
                    text: prompt.clone(),
                    source_style_preset: style_preset,
                    derived_from_template: template,
                });
                self.state = ConversationState::CandidateReady;
                Some(self.append_turn(
                    Speaker::Assistant,
                    copy::analyzed(file_name, &prompt),
                    Some(prompt),
                ))
            }
            Err(_) => {
                self.state = ConversationState::Idle;
                Some(self.append_turn(Speaker::Assistant, copy::ANALYSIS_FAILED.to_string(), None))
            }
        }
    }

    //=====================================================================================
    // Typed prompts
    //=====================================================================================

    /// Records a typed message as a user turn. The assistant's echo is paced
    /// by the service layer, which follows up with [`Conversation::propose_candidate`].
    pub fn submit_text(&mut self, message: &str) -> Option<&ChatTurn> {
        if self.state.is_transient() {
            return None;
        }
        Some(self.append_turn(Speaker::User, message.to_string(), None))
    }

    /// Proposes `text` as the new live candidate in an assistant turn and
    /// moves to `CandidateReady`. The previous candidate, if any, is replaced.
    pub fn propose_candidate(&mut self, text: &str) -> Option<&ChatTurn> {
        if self.state.is_transient() {
            return None;
        }
        self.candidate = Some(CandidatePrompt::from_text(text));
        self.state = ConversationState::CandidateReady;
        Some(self.append_turn(
            Speaker::Assistant,
            copy::echoed(text),
            Some(text.to_string()),
        ))
    }

    /// Rewrites the live candidate's text in place. Pure local mutation: no
    /// turn is appended and no remote call is made. Only legal in
    /// `CandidateReady`.
    pub fn edit_candidate(&mut self, new_text: &str) -> bool {
        if self.state != ConversationState::CandidateReady {
            return false;
        }
        match self.candidate.as_mut() {
            Some(candidate) => {
                candidate.text = new_text.to_string();
                true
            }
            None => false,
        }
    }

    //=====================================================================================
    // Generation
    //=====================================================================================

    /// Confirms the live candidate and parks the conversation in
    /// `AwaitingGeneration`, returning the prompt text to send. Only legal in
    /// `CandidateReady` with a live candidate.
    pub fn begin_generation(&mut self) -> Option<String> {
        if self.state != ConversationState::CandidateReady {
            return None;
        }
        let prompt = self.candidate.as_ref()?.text.clone();
        self.state = ConversationState::AwaitingGeneration;
        Some(prompt)
    }

    /// Settles the generation call. On success the image supersedes the
    /// previous one; on failure the turn carries the failure reason and the
    /// conversation lands in `GenerationFailed`.
    pub fn finish_generation(&mut self, result: PortResult<GeneratedImage>) -> Option<&ChatTurn> {
        if self.state != ConversationState::AwaitingGeneration {
            return None;
        }
        match result {
            Ok(image) => {
                self.image = Some(image);
                self.state = ConversationState::GenerationComplete;
                Some(self.append_turn(
                    Speaker::Assistant,
                    copy::GENERATION_SUCCEEDED.to_string(),
                    None,
                ))
            }
            Err(error) => {
                self.state = ConversationState::GenerationFailed;
                let text = copy::generation_failed(&error.to_string());
                Some(self.append_turn(Speaker::Assistant, text, None))
            }
        }
    }

    //=====================================================================================
    // Regeneration
    //=====================================================================================

    /// Starts a regenerate cycle: appends the "refining" turn immediately and
    /// moves to the transient `Refining` state. Legal from `CandidateReady`,
    /// `GenerationComplete`, and `GenerationFailed` when a candidate is live.
    pub fn begin_refinement(&mut self) -> Option<&ChatTurn> {
        let allowed = matches!(
            self.state,
            ConversationState::CandidateReady
                | ConversationState::GenerationComplete
                | ConversationState::GenerationFailed
        );
        if !allowed || self.candidate.is_none() {
            return None;
        }
        self.state = ConversationState::Refining;
        Some(self.append_turn(Speaker::Assistant, copy::REFINING.to_string(), None))
    }

    /// Completes the paced regenerate cycle: the live candidate is replaced
    /// (never merged) with its deterministic refinement and proposed in a new
    /// candidate turn.
    pub fn finish_refinement(&mut self) -> Option<&ChatTurn> {
        if self.state != ConversationState::Refining {
            return None;
        }
        let refined = refine_prompt(&self.candidate.as_ref()?.text);
        self.candidate = Some(CandidatePrompt::from_text(refined.clone()));
        self.state = ConversationState::CandidateReady;
        Some(self.append_turn(
            Speaker::Assistant,
            copy::refined(&refined),
            Some(refined),
        ))
    }
}
