//! Dialogue Manager
//!
//! Owns the single active-dialogue slot. Exclusivity is structural: an
//! [`ActiveDialogue`] exists only while its dialogue is not `Closed`, and the
//! manager holds at most one.
//!
//! # Listener Lifetime
//!
//! Opening a dialogue acquires a [`ListenerScope`] that announces the
//! dialogue's listeners to the surface. The scope lives inside the
//! `ActiveDialogue` and detaches them when dropped, so every path out of the
//! slot (close, replacement, submit success) releases them exactly once.

use tracing::{debug, info};

use super::{DialogueKind, DialogueState, FormBinding, FormState};
use crate::error::DialogueError;
use crate::messages::{DialogueView, RenderDirective, Surface};
use crate::model::CardId;
use crate::ops::RequestToken;

/// Input needed to open a dialogue
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DialogueContext {
    /// Blank add-card form
    AddCard,
    /// Profile form pre-filled with the current values
    EditProfile {
        /// Field name and value pairs
        values: Vec<(String, String)>,
    },
    /// Blank avatar form
    ChangeAvatar,
    /// Full-size view of one card's image
    ImagePreview {
        /// Caption and alt text
        title: String,
        /// Image location
        image_url: String,
    },
    /// Confirmation before deleting a card
    ConfirmRemove {
        /// Card to delete on confirmation
        card_id: CardId,
    },
}

impl DialogueContext {
    /// Dialogue this context opens
    #[must_use]
    pub fn kind(&self) -> DialogueKind {
        match self {
            Self::AddCard => DialogueKind::AddCard,
            Self::EditProfile { .. } => DialogueKind::EditProfile,
            Self::ChangeAvatar => DialogueKind::ChangeAvatar,
            Self::ImagePreview { .. } => DialogueKind::ImagePreview,
            Self::ConfirmRemove { .. } => DialogueKind::ConfirmRemove,
        }
    }

    fn into_content(self) -> DialogueContent {
        let kind = self.kind();
        match self {
            Self::AddCard | Self::ChangeAvatar => {
                DialogueContent::Form(FormState::blank(kind.schema().unwrap_or_default()))
            }
            Self::EditProfile { values } => DialogueContent::Form(FormState::prefilled(
                kind.schema().unwrap_or_default(),
                values,
            )),
            Self::ImagePreview { title, image_url } => DialogueContent::Image { title, image_url },
            Self::ConfirmRemove { card_id } => DialogueContent::Confirm {
                action: Some(ConfirmAction::RemoveCard(card_id)),
            },
        }
    }
}

/// Deferred action bound to the confirm dialogue
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Delete a card
    RemoveCard(CardId),
}

/// Content of the active dialogue
#[derive(Clone, Debug)]
pub enum DialogueContent {
    /// Form values and validity
    Form(FormState),
    /// Image viewer content
    Image {
        /// Caption and alt text
        title: String,
        /// Image location
        image_url: String,
    },
    /// One-shot action, taken on confirmation
    Confirm {
        /// `None` once confirmed and not yet re-armed
        action: Option<ConfirmAction>,
    },
}

impl DialogueContent {
    fn view(&self) -> DialogueView {
        match self {
            Self::Form(form) => DialogueView::Form {
                fields: form.binding().pairs().to_vec(),
            },
            Self::Image { title, image_url } => DialogueView::Image {
                title: title.clone(),
                image_url: image_url.clone(),
            },
            Self::Confirm { .. } => DialogueView::Confirm,
        }
    }
}

/// What a started submission carries to the network
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submission {
    /// Values of a submitted form
    Form {
        /// The submitting dialogue
        kind: DialogueKind,
        /// Snapshot of the values at submit time
        values: FormBinding,
    },
    /// The confirmed action
    Confirm {
        /// What to do
        action: ConfirmAction,
    },
}

/// Listener subscription of an open dialogue, released on drop
#[derive(Debug)]
pub struct ListenerScope {
    kind: DialogueKind,
    surface: Surface,
}

impl ListenerScope {
    fn attach(kind: DialogueKind, surface: Surface) -> Self {
        surface.emit(RenderDirective::ListenersAttached {
            kind,
            listeners: kind.listeners(),
        });
        Self { kind, surface }
    }
}

impl Drop for ListenerScope {
    fn drop(&mut self) {
        self.surface
            .emit(RenderDirective::ListenersDetached { kind: self.kind });
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Open,
    Submitting(RequestToken),
}

/// The dialogue currently occupying the active slot
#[derive(Debug)]
pub struct ActiveDialogue {
    kind: DialogueKind,
    phase: Phase,
    content: DialogueContent,
    _listeners: ListenerScope,
}

impl ActiveDialogue {
    /// Which dialogue this is
    #[must_use]
    pub fn kind(&self) -> DialogueKind {
        self.kind
    }

    /// `Open` or `Submitting`
    #[must_use]
    pub fn state(&self) -> DialogueState {
        match self.phase {
            Phase::Open => DialogueState::Open,
            Phase::Submitting(_) => DialogueState::Submitting,
        }
    }

    /// Current content
    #[must_use]
    pub fn content(&self) -> &DialogueContent {
        &self.content
    }

    /// Token of the in-flight submission
    #[must_use]
    pub fn submitting_token(&self) -> Option<RequestToken> {
        match self.phase {
            Phase::Submitting(token) => Some(token),
            Phase::Open => None,
        }
    }

    fn submit_enabled(&self) -> bool {
        match (&self.phase, &self.content) {
            (Phase::Submitting(_), _) | (_, DialogueContent::Image { .. }) => false,
            (Phase::Open, DialogueContent::Form(form)) => form.submit_enabled(),
            (Phase::Open, DialogueContent::Confirm { action }) => action.is_some(),
        }
    }

    fn submit_state(&self) -> RenderDirective {
        let busy = matches!(self.phase, Phase::Submitting(_));
        let label = if busy {
            self.kind.busy_label()
        } else {
            self.kind.idle_label()
        };
        RenderDirective::SubmitState {
            kind: self.kind,
            enabled: self.submit_enabled(),
            busy,
            label: label.to_string(),
        }
    }
}

/// Owner of the single active-dialogue slot
#[derive(Debug)]
pub struct DialogueManager {
    active: Option<ActiveDialogue>,
    surface: Surface,
}

impl DialogueManager {
    /// Create a manager with every dialogue closed
    #[must_use]
    pub fn new(surface: Surface) -> Self {
        Self {
            active: None,
            surface,
        }
    }

    /// State of one dialogue
    #[must_use]
    pub fn state(&self, kind: DialogueKind) -> DialogueState {
        match &self.active {
            Some(active) if active.kind == kind => active.state(),
            _ => DialogueState::Closed,
        }
    }

    /// The dialogue in the active slot
    #[must_use]
    pub fn active(&self) -> Option<&ActiveDialogue> {
        self.active.as_ref()
    }

    /// Kind of the dialogue in the active slot
    #[must_use]
    pub fn active_kind(&self) -> Option<DialogueKind> {
        self.active.as_ref().map(ActiveDialogue::kind)
    }

    /// Whether any dialogue is waiting on the network
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| a.submitting_token().is_some())
    }

    /// Whether `token` belongs to the live submission
    #[must_use]
    pub fn is_live(&self, token: RequestToken) -> bool {
        self.active
            .as_ref()
            .and_then(ActiveDialogue::submitting_token)
            == Some(token)
    }

    /// Action waiting on the confirm dialogue, if it is open and armed
    #[must_use]
    pub fn pending_confirm(&self) -> Option<&ConfirmAction> {
        match &self.active {
            Some(ActiveDialogue {
                phase: Phase::Open,
                content: DialogueContent::Confirm { action },
                ..
            }) => action.as_ref(),
            _ => None,
        }
    }

    /// Open a dialogue, closing an idle occupant first
    ///
    /// # Errors
    ///
    /// - [`DialogueError::AlreadyOpen`] if the same dialogue is open
    /// - [`DialogueError::Busy`] if the occupant is submitting
    pub fn open(&mut self, context: DialogueContext) -> Result<(), DialogueError> {
        let kind = context.kind();
        if let Some(active) = &self.active {
            if active.kind == kind {
                return Err(DialogueError::AlreadyOpen(kind));
            }
            if active.submitting_token().is_some() {
                return Err(DialogueError::Busy {
                    active: active.kind,
                    requested: kind,
                });
            }
            debug!(closing = %active.kind, opening = %kind, "Replacing open dialogue");
            self.close();
        }

        let content = context.into_content();
        self.surface.emit(RenderDirective::DialogueOpened {
            kind,
            view: content.view(),
        });
        let listeners = ListenerScope::attach(kind, self.surface.clone());
        let active = ActiveDialogue {
            kind,
            phase: Phase::Open,
            content,
            _listeners: listeners,
        };
        if kind != DialogueKind::ImagePreview {
            self.surface.emit(active.submit_state());
        }
        self.active = Some(active);
        info!(dialogue = %kind, "Dialogue opened");
        Ok(())
    }

    /// Close whatever occupies the active slot
    ///
    /// Returns the closed kind, or `None` when nothing was open. A form is
    /// reset before it goes away, a pending confirmation is unbound.
    pub fn close(&mut self) -> Option<DialogueKind> {
        let mut active = self.active.take()?;
        let kind = active.kind;

        if let DialogueContent::Form(form) = &mut active.content {
            form.reset();
            active.phase = Phase::Open;
            self.surface.emit(active.submit_state());
        }
        self.surface.emit(RenderDirective::DialogueClosed { kind });
        drop(active);

        info!(dialogue = %kind, "Dialogue closed");
        Some(kind)
    }

    /// Apply an edit to the open form
    ///
    /// # Errors
    ///
    /// Returns [`DialogueError::NothingOpen`] without an open dialogue and
    /// [`DialogueError::NotSubmittable`] when it has no form.
    pub fn input(&mut self, field: &str, value: &str) -> Result<(), DialogueError> {
        let active = self.active.as_mut().ok_or(DialogueError::NothingOpen)?;
        let DialogueContent::Form(form) = &mut active.content else {
            return Err(DialogueError::NotSubmittable(active.kind));
        };

        let error = form.input(field, value);
        self.surface.emit(RenderDirective::FieldValidity {
            kind: active.kind,
            field: field.to_string(),
            error,
        });
        self.surface.emit(active.submit_state());
        Ok(())
    }

    /// Move the open dialogue to `Submitting`
    ///
    /// # Errors
    ///
    /// Refuses when nothing is open, a submission is already in flight, the
    /// dialogue cannot submit, its form is invalid, or its confirmation was
    /// already taken.
    pub fn begin_submit(&mut self, token: RequestToken) -> Result<Submission, DialogueError> {
        let active = self.active.as_mut().ok_or(DialogueError::NothingOpen)?;
        let kind = active.kind;
        if active.submitting_token().is_some() {
            return Err(DialogueError::AlreadySubmitting(kind));
        }

        let submission = match &mut active.content {
            DialogueContent::Form(form) => {
                if !form.submit_enabled() {
                    return Err(DialogueError::Invalid(kind));
                }
                Submission::Form {
                    kind,
                    values: form.binding().clone(),
                }
            }
            DialogueContent::Confirm { action } => Submission::Confirm {
                action: action.take().ok_or(DialogueError::NoPendingAction)?,
            },
            DialogueContent::Image { .. } => return Err(DialogueError::NotSubmittable(kind)),
        };

        active.phase = Phase::Submitting(token);
        self.surface.emit(active.submit_state());
        info!(dialogue = %kind, %token, "Dialogue submitting");
        Ok(submission)
    }

    /// Finish a successful submission by closing the dialogue
    ///
    /// Returns `false` (and changes nothing) when `token` is not the live
    /// submission.
    pub fn complete_submit(&mut self, token: RequestToken) -> bool {
        if !self.is_live(token) {
            return false;
        }
        self.close();
        true
    }

    /// Return a failed submission to `Open`
    ///
    /// A confirm dialogue gets `rearm` back as its pending action. Returns
    /// `false` (and changes nothing) when `token` is not the live submission.
    pub fn fail_submit(&mut self, token: RequestToken, rearm: Option<ConfirmAction>) -> bool {
        if !self.is_live(token) {
            return false;
        }
        let Some(active) = self.active.as_mut() else {
            return false;
        };

        active.phase = Phase::Open;
        if let DialogueContent::Confirm { action } = &mut active.content {
            *action = rearm;
        }
        self.surface.emit(active.submit_state());
        info!(dialogue = %active.kind, %token, "Submission failed, dialogue reopened");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::TokenCounter;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn manager() -> (DialogueManager, UnboundedReceiver<RenderDirective>) {
        let (surface, rx) = Surface::channel();
        (DialogueManager::new(surface), rx)
    }

    fn drain(rx: &mut UnboundedReceiver<RenderDirective>) -> Vec<RenderDirective> {
        let mut out = Vec::new();
        while let Ok(d) = rx.try_recv() {
            out.push(d);
        }
        out
    }

    fn fill_add_card(manager: &mut DialogueManager) {
        manager.input("name", "Lake Louise").unwrap();
        manager
            .input("link", "https://img.example.com/lake.jpg")
            .unwrap();
    }

    #[test]
    fn test_open_attaches_listeners() {
        let (mut manager, mut rx) = manager();
        manager.open(DialogueContext::AddCard).unwrap();

        let directives = drain(&mut rx);
        assert!(matches!(
            directives[0],
            RenderDirective::DialogueOpened {
                kind: DialogueKind::AddCard,
                ..
            }
        ));
        assert!(directives.iter().any(|d| matches!(
            d,
            RenderDirective::ListenersAttached {
                kind: DialogueKind::AddCard,
                ..
            }
        )));
        assert_eq!(manager.state(DialogueKind::AddCard), DialogueState::Open);
    }

    #[test]
    fn test_opening_another_closes_the_first() {
        let (mut manager, mut rx) = manager();
        manager.open(DialogueContext::AddCard).unwrap();
        manager.open(DialogueContext::ChangeAvatar).unwrap();

        assert_eq!(manager.state(DialogueKind::AddCard), DialogueState::Closed);
        assert_eq!(manager.state(DialogueKind::ChangeAvatar), DialogueState::Open);

        let directives = drain(&mut rx);
        let detached = directives
            .iter()
            .position(|d| {
                *d == RenderDirective::ListenersDetached {
                    kind: DialogueKind::AddCard,
                }
            })
            .unwrap();
        let opened = directives
            .iter()
            .position(|d| {
                matches!(
                    d,
                    RenderDirective::DialogueOpened {
                        kind: DialogueKind::ChangeAvatar,
                        ..
                    }
                )
            })
            .unwrap();
        assert!(detached < opened);
    }

    #[test]
    fn test_double_open_rejected() {
        let (mut manager, _rx) = manager();
        manager.open(DialogueContext::AddCard).unwrap();
        assert_eq!(
            manager.open(DialogueContext::AddCard),
            Err(DialogueError::AlreadyOpen(DialogueKind::AddCard))
        );
    }

    #[test]
    fn test_open_while_submitting_rejected() {
        let (mut manager, _rx) = manager();
        let mut tokens = TokenCounter::default();
        manager.open(DialogueContext::AddCard).unwrap();
        fill_add_card(&mut manager);
        manager.begin_submit(tokens.next_token()).unwrap();

        let err = manager.open(DialogueContext::ChangeAvatar).unwrap_err();
        assert_eq!(
            err,
            DialogueError::Busy {
                active: DialogueKind::AddCard,
                requested: DialogueKind::ChangeAvatar
            }
        );
        assert_eq!(manager.state(DialogueKind::AddCard), DialogueState::Submitting);
    }

    #[test]
    fn test_close_is_idempotent() {
        let (mut manager, mut rx) = manager();
        assert_eq!(manager.close(), None);
        assert!(drain(&mut rx).is_empty());

        manager.open(DialogueContext::ChangeAvatar).unwrap();
        assert_eq!(manager.close(), Some(DialogueKind::ChangeAvatar));
        assert_eq!(manager.close(), None);

        let detached = drain(&mut rx)
            .into_iter()
            .filter(|d| matches!(d, RenderDirective::ListenersDetached { .. }))
            .count();
        assert_eq!(detached, 1);
    }

    #[test]
    fn test_invalid_form_cannot_submit() {
        let (mut manager, _rx) = manager();
        let mut tokens = TokenCounter::default();
        manager.open(DialogueContext::AddCard).unwrap();
        manager.input("name", "Lake").unwrap();
        manager.input("link", "not-a-url").unwrap();

        assert_eq!(
            manager.begin_submit(tokens.next_token()),
            Err(DialogueError::Invalid(DialogueKind::AddCard))
        );
        assert_eq!(manager.state(DialogueKind::AddCard), DialogueState::Open);
    }

    #[test]
    fn test_double_submit_rejected() {
        let (mut manager, _rx) = manager();
        let mut tokens = TokenCounter::default();
        manager.open(DialogueContext::AddCard).unwrap();
        fill_add_card(&mut manager);

        let submission = manager.begin_submit(tokens.next_token()).unwrap();
        match submission {
            Submission::Form { kind, values } => {
                assert_eq!(kind, DialogueKind::AddCard);
                assert_eq!(values.get("name"), Some("Lake Louise"));
            }
            Submission::Confirm { .. } => panic!("expected a form submission"),
        }
        assert_eq!(
            manager.begin_submit(tokens.next_token()),
            Err(DialogueError::AlreadySubmitting(DialogueKind::AddCard))
        );
    }

    #[test]
    fn test_submit_labels() {
        let (mut manager, mut rx) = manager();
        let mut tokens = TokenCounter::default();
        manager.open(DialogueContext::AddCard).unwrap();
        fill_add_card(&mut manager);
        let token = tokens.next_token();
        manager.begin_submit(token).unwrap();
        let busy = drain(&mut rx).pop().unwrap();
        assert_eq!(
            busy,
            RenderDirective::SubmitState {
                kind: DialogueKind::AddCard,
                enabled: false,
                busy: true,
                label: "Creating...".to_string()
            }
        );

        assert!(manager.fail_submit(token, None));
        let idle = drain(&mut rx).pop().unwrap();
        assert_eq!(
            idle,
            RenderDirective::SubmitState {
                kind: DialogueKind::AddCard,
                enabled: true,
                busy: false,
                label: "Create".to_string()
            }
        );
    }

    #[test]
    fn test_complete_submit_closes_and_resets() {
        let (mut manager, mut rx) = manager();
        let mut tokens = TokenCounter::default();
        manager.open(DialogueContext::AddCard).unwrap();
        fill_add_card(&mut manager);
        let token = tokens.next_token();
        manager.begin_submit(token).unwrap();
        drain(&mut rx);

        assert!(manager.complete_submit(token));
        assert_eq!(manager.active_kind(), None);

        let directives = drain(&mut rx);
        assert!(directives.contains(&RenderDirective::SubmitState {
            kind: DialogueKind::AddCard,
            enabled: false,
            busy: false,
            label: "Create".to_string()
        }));
        assert!(directives.contains(&RenderDirective::DialogueClosed {
            kind: DialogueKind::AddCard
        }));
    }

    #[test]
    fn test_stale_token_ignored() {
        let (mut manager, _rx) = manager();
        let mut tokens = TokenCounter::default();
        manager.open(DialogueContext::AddCard).unwrap();
        fill_add_card(&mut manager);
        let token = tokens.next_token();
        manager.begin_submit(token).unwrap();
        manager.close();

        assert!(!manager.complete_submit(token));
        assert!(!manager.fail_submit(token, None));
    }

    #[test]
    fn test_confirm_is_one_shot_until_rearmed() {
        let (mut manager, _rx) = manager();
        let mut tokens = TokenCounter::default();
        let card_id = CardId::new("c1");
        manager
            .open(DialogueContext::ConfirmRemove {
                card_id: card_id.clone(),
            })
            .unwrap();
        assert_eq!(
            manager.pending_confirm(),
            Some(&ConfirmAction::RemoveCard(card_id.clone()))
        );

        let token = tokens.next_token();
        let submission = manager.begin_submit(token).unwrap();
        assert_eq!(
            submission,
            Submission::Confirm {
                action: ConfirmAction::RemoveCard(card_id.clone())
            }
        );
        assert_eq!(manager.pending_confirm(), None);

        assert!(manager.fail_submit(token, Some(ConfirmAction::RemoveCard(card_id.clone()))));
        assert_eq!(
            manager.pending_confirm(),
            Some(&ConfirmAction::RemoveCard(card_id))
        );
    }

    #[test]
    fn test_image_preview_cannot_submit() {
        let (mut manager, _rx) = manager();
        let mut tokens = TokenCounter::default();
        manager
            .open(DialogueContext::ImagePreview {
                title: "Lake".to_string(),
                image_url: "https://img.example.com/lake.jpg".to_string(),
            })
            .unwrap();
        assert_eq!(
            manager.begin_submit(tokens.next_token()),
            Err(DialogueError::NotSubmittable(DialogueKind::ImagePreview))
        );
        assert_eq!(
            manager.input("name", "x"),
            Err(DialogueError::NotSubmittable(DialogueKind::ImagePreview))
        );
    }

    #[test]
    fn test_edit_profile_prefilled_enabled() {
        let (mut manager, mut rx) = manager();
        manager
            .open(DialogueContext::EditProfile {
                values: vec![
                    ("name".to_string(), "Jacques Cousteau".to_string()),
                    ("about".to_string(), "Sailor, researcher".to_string()),
                ],
            })
            .unwrap();
        let directives = drain(&mut rx);
        assert!(directives.contains(&RenderDirective::SubmitState {
            kind: DialogueKind::EditProfile,
            enabled: true,
            busy: false,
            label: "Save".to_string()
        }));
    }
}
