//! Resource Client Trait
//!
//! One method per REST operation the gallery uses. Every method resolves to
//! a value or an [`ApiError`]; a non-2xx response is an error value, never a
//! panic.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::model::{AvatarUpdate, Card, CardId, NewCard, ProfileUpdate, User, UserId};

/// Cards/users resource
#[async_trait]
pub trait ResourceClient: Send + Sync + 'static {
    /// Client name for logs (e.g., "http", "memory")
    fn name(&self) -> &str;

    /// All cards, in server order
    async fn list_cards(&self) -> Result<Vec<Card>, ApiError>;

    /// Create a card owned by the current user
    async fn create_card(&self, card: &NewCard) -> Result<Card, ApiError>;

    /// Delete one of the current user's cards
    async fn delete_card(&self, id: &CardId) -> Result<(), ApiError>;

    /// Add the current user to a card's likes; returns the new like set
    async fn like_card(&self, id: &CardId) -> Result<BTreeSet<UserId>, ApiError>;

    /// Remove the current user from a card's likes; returns the new like set
    async fn unlike_card(&self, id: &CardId) -> Result<BTreeSet<UserId>, ApiError>;

    /// The signed-in user
    async fn current_user(&self) -> Result<User, ApiError>;

    /// Change name and bio
    async fn update_user(&self, update: &ProfileUpdate) -> Result<User, ApiError>;

    /// Change the profile picture
    async fn update_avatar(&self, update: &AvatarUpdate) -> Result<User, ApiError>;
}
