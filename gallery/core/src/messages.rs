//! Render Directives
//!
//! Messages sent from the engine to the render surface. The surface is a
//! pure renderer: it clones templates, toggles classes and sets text as told,
//! and keeps no state of its own.
//!
//! # Delivery
//!
//! Directives travel over an unbounded channel so the engine can emit them
//! from synchronous code, including `Drop` implementations that release
//! dialogue listeners. A surface that has gone away simply stops
//! receiving; the engine keeps running.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::dialogue::{DialogueKind, Listener};
use crate::model::{CardId, CardSnapshot};

/// Messages from the engine to the render surface
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderDirective {
    // ============================================
    // Profile
    // ============================================
    /// Replace the profile header
    ProfileRendered {
        /// Name shown in the header
        display_name: String,
        /// Bio under the name
        bio: String,
        /// Picture location (absent while loading)
        avatar_url: Option<String>,
    },

    // ============================================
    // Card list
    // ============================================
    /// Replace the whole list, in order
    CardsRendered {
        /// Cards in display order
        cards: Vec<CardSnapshot>,
    },

    /// Insert one card at either end of the list
    CardInserted {
        /// The new card
        card: CardSnapshot,
        /// Where it goes
        position: InsertPosition,
    },

    /// Detach a card from the list
    CardRemoved {
        /// The card that went away
        card_id: CardId,
    },

    /// Refresh the like control of one card
    CardLikesUpdated {
        /// Card identifier
        card_id: CardId,
        /// Number of likes
        like_count: usize,
        /// Whether the viewer likes it
        liked: bool,
    },

    // ============================================
    // Dialogues
    // ============================================
    /// Show a modal dialogue
    DialogueOpened {
        /// Which dialogue
        kind: DialogueKind,
        /// What to put in it
        view: DialogueView,
    },

    /// Hide a modal dialogue and clear its content
    DialogueClosed {
        /// Which dialogue
        kind: DialogueKind,
    },

    /// Subscribe the listeners of an open dialogue
    ListenersAttached {
        /// Which dialogue
        kind: DialogueKind,
        /// What it listens for
        listeners: Vec<Listener>,
    },

    /// Unsubscribe every listener of a dialogue
    ListenersDetached {
        /// Which dialogue
        kind: DialogueKind,
    },

    /// Update the submit control of a dialogue
    SubmitState {
        /// Which dialogue
        kind: DialogueKind,
        /// Whether the control accepts clicks
        enabled: bool,
        /// Whether a request is in flight
        busy: bool,
        /// Control label
        label: String,
    },

    /// Show or clear the error message under a form field
    FieldValidity {
        /// Which dialogue
        kind: DialogueKind,
        /// Field name
        field: String,
        /// Message to show, `None` to clear
        error: Option<String>,
    },

    // ============================================
    // Error toast
    // ============================================
    /// Show the error toast
    ErrorShown {
        /// Message to display
        message: String,
        /// Seconds until it hides itself
        seconds_left: u64,
    },

    /// Update the toast countdown
    ErrorCountdown {
        /// Seconds until it hides itself
        seconds_left: u64,
    },

    /// Hide the error toast
    ErrorHidden,
}

impl RenderDirective {
    /// Short name for logging
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::ProfileRendered { .. } => "profile",
            Self::CardsRendered { .. } => "cards",
            Self::CardInserted { .. } => "card-inserted",
            Self::CardRemoved { .. } => "card-removed",
            Self::CardLikesUpdated { .. } => "card-likes",
            Self::DialogueOpened { .. } => "dialogue-opened",
            Self::DialogueClosed { .. } => "dialogue-closed",
            Self::ListenersAttached { .. } => "listeners-attached",
            Self::ListenersDetached { .. } => "listeners-detached",
            Self::SubmitState { .. } => "submit-state",
            Self::FieldValidity { .. } => "field-validity",
            Self::ErrorShown { .. } => "error-shown",
            Self::ErrorCountdown { .. } => "error-countdown",
            Self::ErrorHidden => "error-hidden",
        }
    }
}

/// Where a card is inserted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsertPosition {
    /// Beginning of the list
    First,
    /// End of the list
    Last,
}

/// Content of an opened dialogue
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogueView {
    /// A form with its current field values, in order
    Form {
        /// Field name and value pairs
        fields: Vec<(String, String)>,
    },
    /// A full-size image with caption
    Image {
        /// Caption and alt text
        title: String,
        /// Image location
        image_url: String,
    },
    /// A yes/no confirmation
    Confirm,
}

/// Sending half of the render channel
#[derive(Clone, Debug)]
pub struct Surface {
    tx: mpsc::UnboundedSender<RenderDirective>,
}

impl Surface {
    /// Wrap an existing sender
    #[must_use]
    pub fn new(tx: mpsc::UnboundedSender<RenderDirective>) -> Self {
        Self { tx }
    }

    /// Create a surface together with its receiving end
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<RenderDirective>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Send a directive, ignoring a detached surface
    pub fn emit(&self, directive: RenderDirective) {
        let label = directive.label();
        if self.tx.send(directive).is_err() {
            tracing::debug!(directive = label, "Render surface detached, directive dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_delivers_in_order() {
        let (surface, mut rx) = Surface::channel();
        surface.emit(RenderDirective::ErrorHidden);
        surface.emit(RenderDirective::ErrorCountdown { seconds_left: 3 });

        assert_eq!(rx.try_recv().unwrap(), RenderDirective::ErrorHidden);
        assert_eq!(
            rx.try_recv().unwrap(),
            RenderDirective::ErrorCountdown { seconds_left: 3 }
        );
    }

    #[test]
    fn test_detached_surface_does_not_panic() {
        let (surface, rx) = Surface::channel();
        drop(rx);
        surface.emit(RenderDirective::ErrorHidden);
    }

    #[test]
    fn test_directive_serializes() {
        let directive = RenderDirective::CardRemoved {
            card_id: CardId::new("c9"),
        };
        let json = serde_json::to_string(&directive).unwrap();
        assert!(json.contains("CardRemoved"));
        assert!(json.contains("c9"));
    }
}
