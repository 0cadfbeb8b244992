//! crates/prompt_studio_core/src/settings.rs
//!
//! The generation-settings store. Settings are mutated only by explicit user
//! edits, one field at a time, and the store always holds a fully populated
//! snapshot.

use crate::domain::{AspectRatio, GenerationSettings};
use serde::Deserialize;

/// A single-field edit to the generation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum SettingsUpdate {
    AspectRatio(AspectRatio),
    StylePreset(String),
    NegativePrompt(String),
    GuidanceScale(f32),
}

/// Holds the current settings snapshot.
///
/// `update` replaces exactly one field and leaves the others untouched, by
/// building a whole new record rather than mutating the old one in place.
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    current: GenerationSettings,
}

impl SettingsStore {
    pub fn new(initial: GenerationSettings) -> Self {
        Self { current: initial }
    }

    /// The current settings snapshot.
    pub fn snapshot(&self) -> &GenerationSettings {
        &self.current
    }

    /// Applies a single-field update and returns the new snapshot.
    pub fn update(&mut self, update: SettingsUpdate) -> &GenerationSettings {
        let previous = self.current.clone();
        self.current = match update {
            SettingsUpdate::AspectRatio(aspect_ratio) => GenerationSettings {
                aspect_ratio,
                ..previous
            },
            SettingsUpdate::StylePreset(style_preset) => GenerationSettings {
                style_preset,
                ..previous
            },
            SettingsUpdate::NegativePrompt(negative_prompt) => GenerationSettings {
                negative_prompt,
                ..previous
            },
            SettingsUpdate::GuidanceScale(guidance_scale) => GenerationSettings {
                guidance_scale,
                ..previous
            },
        };
        &self.current
    }
}
