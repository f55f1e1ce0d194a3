//! Dialogue State Machine
//!
//! Modal dialogues move through `Closed -> Open -> Submitting -> Closed`
//! (or back to `Open` when the request fails). All modal dialogues share one
//! active slot owned by [`DialogueManager`], so at most one of them is ever
//! not `Closed`. The error toast is a separate, non-modal overlay.
//!
//! # Variants
//!
//! | Kind            | Content              | Submits to          |
//! |-----------------|----------------------|---------------------|
//! | `AddCard`       | form (name, link)    | create card         |
//! | `EditProfile`   | form (name, about)   | update user         |
//! | `ChangeAvatar`  | form (avatar)        | update avatar       |
//! | `ImagePreview`  | image + caption      | -                   |
//! | `ConfirmRemove` | one-shot action      | delete card         |

mod form;
mod manager;
mod toast;

pub use form::{FormBinding, FormState};
pub use manager::{
    ActiveDialogue, ConfirmAction, DialogueContent, DialogueContext, DialogueManager,
    ListenerScope, Submission,
};
pub use toast::{ErrorToast, TimerEvent};

use serde::{Deserialize, Serialize};

use crate::validation::FormSchema;

/// Modal dialogues known to the gallery
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DialogueKind {
    /// New card form
    AddCard,
    /// Profile text form
    EditProfile,
    /// Profile picture form
    ChangeAvatar,
    /// Full-size image viewer
    ImagePreview,
    /// "Are you sure?" before deleting a card
    ConfirmRemove,
}

impl DialogueKind {
    /// Stable name used in logs and by the surface
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddCard => "card-add",
            Self::EditProfile => "profile-edit",
            Self::ChangeAvatar => "profile-change-picture",
            Self::ImagePreview => "card-view",
            Self::ConfirmRemove => "card-remove",
        }
    }

    /// Whether the dialogue hosts a form
    #[must_use]
    pub fn is_form(&self) -> bool {
        matches!(self, Self::AddCard | Self::EditProfile | Self::ChangeAvatar)
    }

    /// Field rules for form dialogues
    #[must_use]
    pub fn schema(&self) -> Option<FormSchema> {
        match self {
            Self::AddCard => Some(FormSchema::add_card()),
            Self::EditProfile => Some(FormSchema::edit_profile()),
            Self::ChangeAvatar => Some(FormSchema::change_avatar()),
            Self::ImagePreview | Self::ConfirmRemove => None,
        }
    }

    /// Submit control label while idle
    #[must_use]
    pub fn idle_label(&self) -> &'static str {
        match self {
            Self::AddCard => "Create",
            Self::EditProfile | Self::ChangeAvatar => "Save",
            Self::ConfirmRemove => "Yes",
            Self::ImagePreview => "",
        }
    }

    /// Submit control label while the request is in flight
    #[must_use]
    pub fn busy_label(&self) -> &'static str {
        match self {
            Self::AddCard => "Creating...",
            Self::EditProfile | Self::ChangeAvatar => "Saving...",
            Self::ConfirmRemove => "Removing...",
            Self::ImagePreview => "",
        }
    }

    /// Listeners attached while the dialogue is open
    #[must_use]
    pub fn listeners(&self) -> Vec<Listener> {
        let mut listeners = vec![
            Listener::EscapeKey,
            Listener::BackdropClick,
            Listener::CloseButton,
        ];
        if self.is_form() {
            listeners.push(Listener::FormSubmit);
        }
        if *self == Self::ConfirmRemove {
            listeners.push(Listener::ConfirmButton);
        }
        listeners
    }
}

impl std::fmt::Display for DialogueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Observable state of one dialogue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogueState {
    /// Hidden, no content, no listeners
    Closed,
    /// Visible and interactive
    Open,
    /// Visible, waiting on the network; submit is disabled
    Submitting,
}

/// Event subscriptions held by an open dialogue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Listener {
    /// Escape key on the document
    EscapeKey,
    /// Click on the dimmed backdrop
    BackdropClick,
    /// Click on the close control
    CloseButton,
    /// Form submission
    FormSubmit,
    /// Confirmation control
    ConfirmButton,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_kinds_have_schema() {
        for kind in [
            DialogueKind::AddCard,
            DialogueKind::EditProfile,
            DialogueKind::ChangeAvatar,
        ] {
            assert!(kind.is_form());
            assert!(kind.schema().is_some());
            assert!(kind.listeners().contains(&Listener::FormSubmit));
        }
        assert!(DialogueKind::ImagePreview.schema().is_none());
    }

    #[test]
    fn test_confirm_listens_for_confirmation() {
        let listeners = DialogueKind::ConfirmRemove.listeners();
        assert!(listeners.contains(&Listener::ConfirmButton));
        assert!(!listeners.contains(&Listener::FormSubmit));
    }

    #[test]
    fn test_labels() {
        assert_eq!(DialogueKind::AddCard.busy_label(), "Creating...");
        assert_eq!(DialogueKind::EditProfile.idle_label(), "Save");
        assert_eq!(DialogueKind::ConfirmRemove.to_string(), "card-remove");
    }
}
