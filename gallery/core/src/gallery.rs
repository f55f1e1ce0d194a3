//! Gallery Engine
//!
//! Wires the profile, the card list, the dialogue slot and the error toast
//! to a resource client.
//!
//! # Event Flow
//!
//! ```text
//! UiEvent ──► handle_event ──► state change + RenderDirective(s)
//!                  │
//!                  └─ spawn request ──► Completion ──► handle_completion
//! ```
//!
//! `handle_event` never awaits. Network calls run as tokio tasks and each
//! reports exactly one [`Completion`] on the engine's internal channel. The
//! caller drives completions with [`Gallery::process_next`], or selects on
//! [`Gallery::next_completion`] alongside its own input.

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::card::{CardView, LikeAction};
use crate::client::ResourceClient;
use crate::config::GalleryConfig;
use crate::dialogue::{
    ConfirmAction, DialogueContent, DialogueContext, DialogueKind, DialogueManager, ErrorToast,
    FormBinding, Submission,
};
use crate::error::{ApiError, CardError, DialogueError, GalleryError, Result};
use crate::events::{Key, Layer, UiEvent};
use crate::messages::{InsertPosition, RenderDirective, Surface};
use crate::model::{AvatarUpdate, Card, CardId, NewCard, ProfileUpdate, UserId};
use crate::ops::{Completion, Outcome, PendingOp, RequestToken, TokenCounter};
use crate::profile::UserInfo;
use crate::section::Section;

/// The gallery page engine
pub struct Gallery<C: ResourceClient> {
    client: Arc<C>,
    config: GalleryConfig,
    surface: Surface,
    profile: UserInfo,
    section: Section,
    dialogues: DialogueManager,
    toast: ErrorToast,
    tokens: TokenCounter,
    pending: HashMap<RequestToken, PendingOp>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl<C: ResourceClient> Gallery<C> {
    /// Create an engine drawing to `surface`
    pub fn new(client: Arc<C>, config: GalleryConfig, surface: Surface) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let toast = ErrorToast::new(
            config.error_dismiss,
            surface.clone(),
            completions_tx.clone(),
        );
        Self {
            client,
            dialogues: DialogueManager::new(surface.clone()),
            toast,
            config,
            surface,
            profile: UserInfo::new(),
            section: Section::new(),
            tokens: TokenCounter::default(),
            pending: HashMap::new(),
            completions_tx,
            completions_rx,
        }
    }

    // ============================================
    // Accessors
    // ============================================

    /// The signed-in user, once loaded
    #[must_use]
    pub fn profile(&self) -> &UserInfo {
        &self.profile
    }

    /// The card list
    #[must_use]
    pub fn section(&self) -> &Section {
        &self.section
    }

    /// The modal dialogue slot
    #[must_use]
    pub fn dialogues(&self) -> &DialogueManager {
        &self.dialogues
    }

    /// The error overlay
    #[must_use]
    pub fn toast(&self) -> &ErrorToast {
        &self.toast
    }

    /// Number of network calls still outstanding
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    /// The configuration in use
    #[must_use]
    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    // ============================================
    // Startup
    // ============================================

    /// Fetch the user and the cards, then draw both
    ///
    /// # Errors
    ///
    /// Returns the client's error after showing it in the error toast.
    pub async fn load(&mut self) -> Result<()> {
        self.surface.emit(self.profile.loading());
        info!(client = self.client.name(), "Loading gallery");

        let client = Arc::clone(&self.client);
        let loaded = futures::try_join!(client.current_user(), client.list_cards());
        let (user, cards) = match loaded {
            Ok(loaded) => loaded,
            Err(err) => {
                self.report(&err);
                return Err(err.into());
            }
        };

        let viewer = user.id.clone();
        self.surface.emit(self.profile.set(user));
        let snapshots = self
            .section
            .render_all(cards.into_iter().map(|c| CardView::new(c, viewer.clone())));
        info!(cards = snapshots.len(), "Gallery loaded");
        self.surface
            .emit(RenderDirective::CardsRendered { cards: snapshots });
        Ok(())
    }

    // ============================================
    // Surface events
    // ============================================

    /// Apply one event from the render surface
    ///
    /// # Errors
    ///
    /// Validation failures are always returned. Contract violations are
    /// returned only with `strict_contracts`; otherwise they are logged and
    /// dropped.
    pub fn handle_event(&mut self, event: UiEvent) -> Result<()> {
        match self.dispatch(event) {
            Err(err) if err.is_contract_violation() => {
                warn!(error = %err, strict = self.config.strict_contracts, "Rejected UI event");
                if self.config.strict_contracts {
                    Err(err)
                } else {
                    Ok(())
                }
            }
            other => other,
        }
    }

    fn dispatch(&mut self, event: UiEvent) -> Result<()> {
        match event {
            UiEvent::KeyPressed { key: Key::Escape } => {
                self.dismiss_topmost();
                Ok(())
            }
            UiEvent::KeyPressed { .. } => Ok(()),
            UiEvent::BackdropClicked { layer } | UiEvent::CloseClicked { layer } => {
                match layer {
                    Layer::Toast => {
                        self.toast.close();
                    }
                    Layer::Modal => {
                        self.dialogues.close();
                    }
                }
                Ok(())
            }
            UiEvent::AddCardClicked => Ok(self.dialogues.open(DialogueContext::AddCard)?),
            UiEvent::EditProfileClicked => {
                let values = self.profile.form_values().ok_or(GalleryError::NotLoaded)?;
                Ok(self.dialogues.open(DialogueContext::EditProfile { values })?)
            }
            UiEvent::ChangeAvatarClicked => Ok(self.dialogues.open(DialogueContext::ChangeAvatar)?),
            UiEvent::CardImageClicked { card_id } => {
                let card = self.card(&card_id)?.card();
                let context = DialogueContext::ImagePreview {
                    title: card.title.clone(),
                    image_url: card.image_url.clone(),
                };
                Ok(self.dialogues.open(context)?)
            }
            UiEvent::CardLikeClicked { card_id } => self.toggle_like(&card_id),
            UiEvent::CardRemoveClicked { card_id } => {
                if !self.card(&card_id)?.removable() {
                    return Err(CardError::NotOwner(card_id).into());
                }
                Ok(self.dialogues.open(DialogueContext::ConfirmRemove { card_id })?)
            }
            UiEvent::ConfirmClicked => {
                if self.dialogues.active_kind() != Some(DialogueKind::ConfirmRemove) {
                    return Err(DialogueError::NotOpen(DialogueKind::ConfirmRemove).into());
                }
                self.submit()
            }
            UiEvent::FieldInput { field, value } => Ok(self.dialogues.input(&field, &value)?),
            UiEvent::SubmitClicked => self.submit(),
        }
    }

    fn dismiss_topmost(&mut self) {
        if !self.toast.close() {
            self.dialogues.close();
        }
    }

    fn card(&self, id: &CardId) -> Result<&CardView> {
        self.section
            .get(id)
            .ok_or_else(|| GalleryError::UnknownCard(id.clone()))
    }

    fn toggle_like(&mut self, card_id: &CardId) -> Result<()> {
        if self.profile.user_id().is_none() {
            return Err(GalleryError::NotLoaded);
        }
        let token = self.tokens.next_token();
        let card = self
            .section
            .get_mut(card_id)
            .ok_or_else(|| GalleryError::UnknownCard(card_id.clone()))?;
        let action = card.begin_toggle(token)?;

        let client = Arc::clone(&self.client);
        let id = card_id.clone();
        let liking = action == LikeAction::Like;
        info!(card = %card_id, liking, %token, "Toggling like");
        self.spawn_request(
            token,
            PendingOp::Like {
                card_id: card_id.clone(),
                liking,
            },
            async move {
                let likes = if liking {
                    client.like_card(&id).await
                } else {
                    client.unlike_card(&id).await
                };
                Outcome::LikesChanged(likes)
            },
        );
        Ok(())
    }

    fn submit(&mut self) -> Result<()> {
        if let Some(ConfirmAction::RemoveCard(card_id)) = self.dialogues.pending_confirm() {
            let card_id = card_id.clone();
            if self.card(&card_id)?.is_busy() {
                return Err(CardError::Busy(card_id).into());
            }
        }

        let token = self.tokens.next_token();
        let submission = match self.dialogues.begin_submit(token) {
            Ok(submission) => submission,
            Err(DialogueError::Invalid(kind)) => return Err(self.invalid_form(kind)),
            Err(err) => return Err(err.into()),
        };

        match submission {
            Submission::Form { kind, values } => {
                let request = match self.form_request(kind, &values) {
                    Ok(request) => request,
                    Err(err) => {
                        self.dialogues.fail_submit(token, None);
                        return Err(err);
                    }
                };
                info!(dialogue = %kind, %token, "Submitting form");
                self.spawn_request(token, PendingOp::Form { kind }, request);
                Ok(())
            }
            Submission::Confirm {
                action: ConfirmAction::RemoveCard(card_id),
            } => {
                let locked = self
                    .section
                    .get_mut(&card_id)
                    .ok_or_else(|| GalleryError::UnknownCard(card_id.clone()))
                    .and_then(|card| card.begin_remove(token).map_err(GalleryError::from));
                if let Err(err) = locked {
                    self.dialogues
                        .fail_submit(token, Some(ConfirmAction::RemoveCard(card_id)));
                    return Err(err);
                }

                let client = Arc::clone(&self.client);
                let id = card_id.clone();
                info!(card = %card_id, %token, "Removing card");
                self.spawn_request(token, PendingOp::Remove { card_id }, async move {
                    Outcome::CardDeleted(client.delete_card(&id).await)
                });
                Ok(())
            }
        }
    }

    fn form_request(
        &self,
        kind: DialogueKind,
        values: &FormBinding,
    ) -> Result<BoxFuture<'static, Outcome>> {
        let client = Arc::clone(&self.client);
        let request = match kind {
            DialogueKind::AddCard => {
                let payload = NewCard::from_form(values)?;
                async move { Outcome::CardCreated(client.create_card(&payload).await) }.boxed()
            }
            DialogueKind::EditProfile => {
                let payload = ProfileUpdate::from_form(values)?;
                async move { Outcome::UserUpdated(client.update_user(&payload).await) }.boxed()
            }
            DialogueKind::ChangeAvatar => {
                let payload = AvatarUpdate::from_form(values)?;
                async move { Outcome::UserUpdated(client.update_avatar(&payload).await) }.boxed()
            }
            DialogueKind::ImagePreview | DialogueKind::ConfirmRemove => {
                return Err(DialogueError::NotSubmittable(kind).into());
            }
        };
        Ok(request)
    }

    fn invalid_form(&self, kind: DialogueKind) -> GalleryError {
        let first = self.dialogues.active().and_then(|active| match active.content() {
            DialogueContent::Form(form) => form.first_error(),
            _ => None,
        });
        match first {
            Some(err) => err.into(),
            None => DialogueError::Invalid(kind).into(),
        }
    }

    fn spawn_request<F>(&mut self, token: RequestToken, op: PendingOp, request: F)
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        let fallback = op.clone();
        self.pending.insert(token, op);
        let tx = self.completions_tx.clone();

        tokio::spawn(async move {
            let outcome = match tokio::spawn(request).await {
                Ok(outcome) => outcome,
                Err(join_err) => {
                    error!(%token, error = %join_err, "Request task did not finish");
                    fallback.failed(ApiError::transport(join_err))
                }
            };
            if tx.send(Completion::Request { token, outcome }).is_err() {
                warn!(%token, "Engine dropped before request completed");
            }
        });
    }

    // ============================================
    // Completions
    // ============================================

    /// Wait for the next completion without applying it
    ///
    /// Pair with [`Gallery::handle_completion`] in a `select!` loop.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.completions_rx.recv().await
    }

    /// Wait for one completion and apply it
    pub async fn process_next(&mut self) -> bool {
        match self.completions_rx.recv().await {
            Some(completion) => {
                self.handle_completion(completion);
                true
            }
            None => false,
        }
    }

    /// Apply completions until no request is outstanding
    ///
    /// Toast timer events that arrive meanwhile are applied too.
    pub async fn settle(&mut self) {
        while !self.pending.is_empty() {
            if !self.process_next().await {
                break;
            }
        }
    }

    /// Apply one completion
    pub fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Timer(event) => {
                self.toast.on_timer(event);
            }
            Completion::Request { token, outcome } => {
                let Some(op) = self.pending.remove(&token) else {
                    warn!(%token, "Completion for unknown request ignored");
                    return;
                };
                self.apply(token, op, outcome);
            }
        }
    }

    fn apply(&mut self, token: RequestToken, op: PendingOp, outcome: Outcome) {
        match (op, outcome) {
            (PendingOp::Form { kind }, Outcome::CardCreated(result)) => {
                if !self.form_is_live(kind, token) {
                    return;
                }
                match result {
                    Ok(card) => {
                        self.insert_created(card);
                        self.complete_form(kind, token);
                    }
                    Err(err) => self.fail_form(token, &err),
                }
            }
            (PendingOp::Form { kind }, Outcome::UserUpdated(result)) => {
                if !self.form_is_live(kind, token) {
                    return;
                }
                match result {
                    Ok(user) => {
                        let directive = self.profile.set(user);
                        self.surface.emit(directive);
                        self.complete_form(kind, token);
                    }
                    Err(err) => self.fail_form(token, &err),
                }
            }
            (PendingOp::Like { card_id, liking }, Outcome::LikesChanged(result)) => {
                self.finish_like(&card_id, liking, token, result);
            }
            (PendingOp::Remove { card_id }, Outcome::CardDeleted(result)) => {
                self.finish_remove(card_id, token, result);
            }
            (op, outcome) => {
                error!(%token, ?op, ?outcome, "Completion does not match its request");
            }
        }
    }

    fn form_is_live(&self, kind: DialogueKind, token: RequestToken) -> bool {
        let live = self.dialogues.is_live(token);
        if !live {
            warn!(dialogue = %kind, %token, "Stale response for closed dialogue discarded");
        }
        live
    }

    fn complete_form(&mut self, kind: DialogueKind, token: RequestToken) {
        self.dialogues.complete_submit(token);
        info!(dialogue = %kind, %token, "Submission succeeded");
    }

    fn fail_form(&mut self, token: RequestToken, err: &ApiError) {
        self.dialogues.fail_submit(token, None);
        self.report(err);
    }

    fn insert_created(&mut self, card: Card) {
        let Some(viewer) = self.profile.user_id().cloned() else {
            warn!(card = %card.id, "Created card arrived before the profile; not shown");
            return;
        };
        let snapshot = self.section.prepend(CardView::new(card, viewer));
        self.surface.emit(RenderDirective::CardInserted {
            card: snapshot,
            position: InsertPosition::First,
        });
    }

    fn finish_like(
        &mut self,
        card_id: &CardId,
        liking: bool,
        token: RequestToken,
        result: std::result::Result<BTreeSet<UserId>, ApiError>,
    ) {
        let Some(card) = self.section.get_mut(card_id) else {
            warn!(card = %card_id, %token, "Like response for a removed card ignored");
            return;
        };
        card.finish(token);

        match result {
            Ok(likes) => {
                card.reconcile_likes(likes);
                let directive = RenderDirective::CardLikesUpdated {
                    card_id: card_id.clone(),
                    like_count: card.like_count(),
                    liked: card.liked(),
                };
                info!(card = %card_id, liking, "Likes reconciled");
                self.surface.emit(directive);
            }
            Err(err) => self.report(&err),
        }
    }

    fn finish_remove(
        &mut self,
        card_id: CardId,
        token: RequestToken,
        result: std::result::Result<(), ApiError>,
    ) {
        if let Some(card) = self.section.get_mut(&card_id) {
            card.finish(token);
        }

        let result = match result {
            Err(err) if err.is_not_found() => {
                warn!(card = %card_id, %token, "Card already gone on the server; detaching");
                Ok(())
            }
            other => other,
        };

        match result {
            Ok(()) => {
                if self.section.remove(&card_id).is_some() {
                    self.surface
                        .emit(RenderDirective::CardRemoved { card_id: card_id.clone() });
                }
                self.dialogues.complete_submit(token);
                info!(card = %card_id, "Card removed");
            }
            Err(err) => {
                self.dialogues
                    .fail_submit(token, Some(ConfirmAction::RemoveCard(card_id)));
                self.report(&err);
            }
        }
    }

    fn report(&mut self, err: &ApiError) {
        error!(status = ?err.status, "{err}");
        self.toast.show(err.to_string());
    }
}
