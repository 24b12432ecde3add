//! Fixed catalog of synthesis models and voices exposed to the UI.
//!
//! The proxy treats model and voice identifiers as opaque pass-through
//! strings; the backend is the source of truth for valid values. This
//! catalog only drives the selection UI and the `/models` / `/voices`
//! listing endpoints.

use serde::{Deserialize, Serialize};

/// A selectable synthesis model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    /// Backend model identifier (e.g. `"KittenML/kitten-tts-mini-0.8"`).
    pub id: &'static str,
    /// Human-readable label for dropdowns.
    pub label: &'static str,
}

/// Models offered in the UI, largest first.
pub const MODELS: &[ModelEntry] = &[
    ModelEntry {
        id: "KittenML/kitten-tts-mini-0.8",
        label: "kitten-tts-mini (80M)",
    },
    ModelEntry {
        id: "KittenML/kitten-tts-micro-0.8",
        label: "kitten-tts-micro (40M)",
    },
    ModelEntry {
        id: "KittenML/kitten-tts-nano-0.8",
        label: "kitten-tts-nano (15M)",
    },
    ModelEntry {
        id: "KittenML/kitten-tts-nano-0.8-int8",
        label: "kitten-tts-nano-int8 (15M)",
    },
];

/// Voices offered in the UI.
pub const VOICES: &[&str] = &[
    "Bella", "Jasper", "Luna", "Bruno", "Rosie", "Hugo", "Kiki", "Leo",
];

/// Voice preselected in the UI.
pub const DEFAULT_VOICE: &str = "Jasper";

/// Demo sentence substituted when the text box is empty.
pub const DEFAULT_TEXT: &str = "The quick brown fox jumps over the lazy dog";

/// The model preselected in the UI (first catalog entry).
pub fn default_model() -> &'static ModelEntry {
    &MODELS[0]
}
