//! Surface Events
//!
//! Events sent from the render surface to the engine. The surface reports
//! what happened (a key, a click, a keystroke in a field) and the engine
//! decides what it means given the current dialogue state.

use serde::{Deserialize, Serialize};

use crate::model::CardId;

/// Events from the render surface to the engine
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiEvent {
    // ============================================
    // Dismissal
    // ============================================
    /// A key was pressed anywhere on the page
    KeyPressed {
        /// The key
        key: Key,
    },

    /// The dimmed area around an overlay was clicked
    BackdropClicked {
        /// Which overlay
        layer: Layer,
    },

    /// The close control of an overlay was clicked
    CloseClicked {
        /// Which overlay
        layer: Layer,
    },

    // ============================================
    // Profile controls
    // ============================================
    /// "Add card" button
    AddCardClicked,

    /// "Edit profile" button
    EditProfileClicked,

    /// Avatar overlay
    ChangeAvatarClicked,

    // ============================================
    // Card controls
    // ============================================
    /// A card image was clicked
    CardImageClicked {
        /// Which card
        card_id: CardId,
    },

    /// A card like control was clicked
    CardLikeClicked {
        /// Which card
        card_id: CardId,
    },

    /// A card remove control was clicked
    CardRemoveClicked {
        /// Which card
        card_id: CardId,
    },

    // ============================================
    // Dialogue controls
    // ============================================
    /// The confirmation control of the confirm dialogue
    ConfirmClicked,

    /// A form field changed
    FieldInput {
        /// Field name
        field: String,
        /// New value
        value: String,
    },

    /// The submit control of the open form
    SubmitClicked,
}

impl UiEvent {
    /// Convenience constructor for a field change
    pub fn field(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::FieldInput {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Convenience constructor for the escape key
    #[must_use]
    pub fn escape() -> Self {
        Self::KeyPressed { key: Key::Escape }
    }
}

/// Keyboard key, as reported by the surface
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    /// Escape
    Escape,
    /// Enter / Return
    Enter,
    /// Anything else, by its key name
    Other(String),
}

impl Key {
    /// Parse a DOM-style key name
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => Self::Escape,
            "Enter" => Self::Enter,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Overlay layer an event is aimed at
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layer {
    /// The exclusive modal dialogue
    Modal,
    /// The error toast
    Toast,
}
