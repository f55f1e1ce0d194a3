//! In-Memory Resource Client
//!
//! Process-local stand-in for the REST API. Seeded with the starter cards
//! and a single signed-in user; supports queued failure injection so the
//! error paths can be exercised without a server.

use std::collections::{BTreeSet, VecDeque};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::traits::ResourceClient;
use crate::error::ApiError;
use crate::model::{AvatarUpdate, Card, CardId, NewCard, ProfileUpdate, User, UserId};

const STARTER_CARDS: [(&str, &str); 6] = [
    ("Broadway Street, New York", "./images/photo-broadway-street.jpg"),
    ("Hollywood, Los Angeles", "./images/photo-hollywood.jpg"),
    ("Lombard Street, San Francisco", "./images/photo-lombard-street.jpg"),
    ("Space Needle, Seattle", "./images/photo-space-needle.jpg"),
    ("Las Vegas Strip", "./images/photo-vegas-strip.jpg"),
    ("Kennedy Space Center, Florida", "./images/photo-kennedy-space-center.jpg"),
];

#[derive(Debug)]
struct Store {
    user: User,
    cards: Vec<Card>,
    failures: VecDeque<ApiError>,
}

/// Resource client backed by a local store
#[derive(Debug)]
pub struct InMemoryClient {
    store: Mutex<Store>,
}

impl InMemoryClient {
    /// Create a store holding `user` and `cards` (in server order)
    #[must_use]
    pub fn new(user: User, cards: Vec<Card>) -> Self {
        Self {
            store: Mutex::new(Store {
                user,
                cards,
                failures: VecDeque::new(),
            }),
        }
    }

    /// Create a store with the starter cards, all owned by the signed-in user
    #[must_use]
    pub fn seeded() -> Self {
        let user = User {
            id: UserId::new(Uuid::new_v4().to_string()),
            display_name: "Jacques Cousteau".to_string(),
            bio: "Explorer".to_string(),
            avatar_url: "./images/avatar.jpg".to_string(),
        };
        let cards = STARTER_CARDS
            .iter()
            .map(|(title, image)| {
                let mut card = Card::new(
                    Uuid::new_v4().to_string(),
                    *title,
                    *image,
                    user.id.clone(),
                );
                card.created_at = Some(Utc::now());
                card
            })
            .collect();
        Self::new(user, cards)
    }

    /// Make the next call fail with `error`
    ///
    /// Queued failures are consumed one per call, in order.
    pub fn fail_next(&self, error: ApiError) {
        self.store.lock().failures.push_back(error);
    }

    /// Cards currently stored
    #[must_use]
    pub fn cards(&self) -> Vec<Card> {
        self.store.lock().cards.clone()
    }

    /// User currently stored
    #[must_use]
    pub fn user(&self) -> User {
        self.store.lock().user.clone()
    }

    fn with_store<T>(
        &self,
        op: &str,
        f: impl FnOnce(&mut Store) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let mut store = self.store.lock();
        if let Some(err) = store.failures.pop_front() {
            debug!(op, error = %err, "Injected failure");
            return Err(err);
        }
        f(&mut store)
    }
}

impl Default for InMemoryClient {
    fn default() -> Self {
        Self::seeded()
    }
}

fn not_found() -> ApiError {
    ApiError::status(404, "Not Found")
}

fn card_mut<'a>(store: &'a mut Store, id: &CardId) -> Result<&'a mut Card, ApiError> {
    store
        .cards
        .iter_mut()
        .find(|c| &c.id == id)
        .ok_or_else(not_found)
}

#[async_trait]
impl ResourceClient for InMemoryClient {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list_cards(&self) -> Result<Vec<Card>, ApiError> {
        self.with_store("list_cards", |store| Ok(store.cards.clone()))
    }

    async fn create_card(&self, card: &NewCard) -> Result<Card, ApiError> {
        self.with_store("create_card", |store| {
            let mut created = Card::new(
                Uuid::new_v4().to_string(),
                card.title.clone(),
                card.image_url.clone(),
                store.user.id.clone(),
            );
            created.created_at = Some(Utc::now());
            store.cards.insert(0, created.clone());
            Ok(created)
        })
    }

    async fn delete_card(&self, id: &CardId) -> Result<(), ApiError> {
        self.with_store("delete_card", |store| {
            let owner = card_mut(store, id)?.owner_id.clone();
            if owner != store.user.id {
                return Err(ApiError::status(403, "Forbidden"));
            }
            store.cards.retain(|c| &c.id != id);
            Ok(())
        })
    }

    async fn like_card(&self, id: &CardId) -> Result<BTreeSet<UserId>, ApiError> {
        self.with_store("like_card", |store| {
            let me = store.user.id.clone();
            let card = card_mut(store, id)?;
            card.liked_by.insert(me);
            Ok(card.liked_by.clone())
        })
    }

    async fn unlike_card(&self, id: &CardId) -> Result<BTreeSet<UserId>, ApiError> {
        self.with_store("unlike_card", |store| {
            let me = store.user.id.clone();
            let card = card_mut(store, id)?;
            card.liked_by.remove(&me);
            Ok(card.liked_by.clone())
        })
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.with_store("current_user", |store| Ok(store.user.clone()))
    }

    async fn update_user(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        self.with_store("update_user", |store| {
            store.user.display_name.clone_from(&update.display_name);
            store.user.bio.clone_from(&update.bio);
            Ok(store.user.clone())
        })
    }

    async fn update_avatar(&self, update: &AvatarUpdate) -> Result<User, ApiError> {
        self.with_store("update_avatar", |store| {
            store.user.avatar_url.clone_from(&update.avatar_url);
            Ok(store.user.clone())
        })
    }
}
