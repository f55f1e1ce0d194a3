//! Shared fixtures for the gallery integration tests.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Notify;

use gallery_core::{
    ApiError, AvatarUpdate, Card, CardId, Gallery, GalleryConfig, InMemoryClient, NewCard,
    ProfileUpdate, RenderDirective, ResourceClient, Surface, User, UserId,
};

// =============================================================================
// Scripted client
// =============================================================================

/// In-memory client whose calls can be held back until released
pub struct ScriptedClient {
    inner: InMemoryClient,
    held: Mutex<HashSet<&'static str>>,
    released: Notify,
    calls: Mutex<Vec<&'static str>>,
}

impl ScriptedClient {
    pub fn new(user: User, cards: Vec<Card>) -> Self {
        Self {
            inner: InMemoryClient::new(user, cards),
            held: Mutex::new(HashSet::new()),
            released: Notify::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Calls to `op` wait until `release(op)`
    pub fn hold(&self, op: &'static str) {
        self.held.lock().insert(op);
    }

    pub fn release(&self, op: &'static str) {
        self.held.lock().remove(op);
        self.released.notify_waiters();
    }

    /// Make the next call fail
    pub fn fail_next(&self, error: ApiError) {
        self.inner.fail_next(error);
    }

    /// Operations called so far, in order
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.calls.lock().iter().filter(|c| **c == op).count()
    }

    pub fn stored_cards(&self) -> Vec<Card> {
        self.inner.cards()
    }

    async fn gate(&self, op: &'static str) {
        self.calls.lock().push(op);
        loop {
            let released = self.released.notified();
            let is_held = self.held.lock().contains(op);
            if !is_held {
                return;
            }
            released.await;
        }
    }
}

#[async_trait]
impl ResourceClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn list_cards(&self) -> Result<Vec<Card>, ApiError> {
        self.gate("list_cards").await;
        self.inner.list_cards().await
    }

    async fn create_card(&self, card: &NewCard) -> Result<Card, ApiError> {
        self.gate("create_card").await;
        self.inner.create_card(card).await
    }

    async fn delete_card(&self, id: &CardId) -> Result<(), ApiError> {
        self.gate("delete_card").await;
        self.inner.delete_card(id).await
    }

    async fn like_card(&self, id: &CardId) -> Result<BTreeSet<UserId>, ApiError> {
        self.gate("like_card").await;
        self.inner.like_card(id).await
    }

    async fn unlike_card(&self, id: &CardId) -> Result<BTreeSet<UserId>, ApiError> {
        self.gate("unlike_card").await;
        self.inner.unlike_card(id).await
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.gate("current_user").await;
        self.inner.current_user().await
    }

    async fn update_user(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        self.gate("update_user").await;
        self.inner.update_user(update).await
    }

    async fn update_avatar(&self, update: &AvatarUpdate) -> Result<User, ApiError> {
        self.gate("update_avatar").await;
        self.inner.update_avatar(update).await
    }
}

// =============================================================================
// Fixture data
// =============================================================================

pub fn me() -> UserId {
    UserId::new("me")
}

pub fn someone_else() -> UserId {
    UserId::new("u2")
}

pub fn user() -> User {
    User {
        id: me(),
        display_name: "Jacques Cousteau".to_string(),
        bio: "Sailor, researcher".to_string(),
        avatar_url: "https://img.example.com/me.jpg".to_string(),
    }
}

/// `mine` (liked by u2), `theirs` (owned by u2), `lake` (mine, no likes)
pub fn cards() -> Vec<Card> {
    vec![
        Card::new("mine", "Broadway Street", "https://img.example.com/broadway.jpg", me())
            .with_likes([someone_else()]),
        Card::new("theirs", "Hollywood", "https://img.example.com/hollywood.jpg", someone_else()),
        Card::new("lake", "Lake Louise", "https://img.example.com/lake.jpg", me()),
    ]
}

pub fn error_500() -> ApiError {
    ApiError::status(500, "Internal Server Error")
}

// =============================================================================
// Harness
// =============================================================================

pub struct Harness {
    pub gallery: Gallery<ScriptedClient>,
    pub client: Arc<ScriptedClient>,
    pub rx: UnboundedReceiver<RenderDirective>,
}

impl Harness {
    /// Engine over the fixture data, strict contracts, 5 s toast
    pub fn new() -> Self {
        Self::with_config(
            GalleryConfig::default()
                .with_strict_contracts(true)
                .with_error_dismiss(Duration::from_secs(5)),
        )
    }

    pub fn with_config(config: GalleryConfig) -> Self {
        let client = Arc::new(ScriptedClient::new(user(), cards()));
        let (surface, rx) = Surface::channel();
        let gallery = Gallery::new(Arc::clone(&client), config, surface);
        Self {
            gallery,
            client,
            rx,
        }
    }

    /// Engine with the profile and cards already drawn
    pub async fn loaded() -> Self {
        let mut harness = Self::new();
        harness.gallery.load().await.unwrap();
        harness.drain();
        harness
    }

    /// Everything emitted since the last drain
    pub fn drain(&mut self) -> Vec<RenderDirective> {
        let mut out = Vec::new();
        while let Ok(directive) = self.rx.try_recv() {
            out.push(directive);
        }
        out
    }

    pub fn card_ids(&self) -> Vec<String> {
        self.gallery
            .section()
            .iter()
            .map(|c| c.id().to_string())
            .collect()
    }
}

pub fn count<F>(directives: &[RenderDirective], pred: F) -> usize
where
    F: Fn(&RenderDirective) -> bool,
{
    directives.iter().filter(|d| pred(d)).count()
}

pub fn errors_shown(directives: &[RenderDirective]) -> usize {
    count(directives, |d| matches!(d, RenderDirective::ErrorShown { .. }))
}
