//! Gallery Data Model
//!
//! Domain records shared by the engine, the resource clients and the render
//! surface. Wire formats live next to the clients that speak them; this
//! module only knows the shapes the engine reasons about.
//!
//! # Derived State
//!
//! A card never stores a "liked" flag. Whether the viewer likes a card is
//! always computed from `liked_by`, which mirrors the last server snapshot.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dialogue::FormBinding;
use crate::error::ValidationError;

/// Card identifier (opaque, assigned by the server)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub String);

impl CardId {
    /// Create a card ID from a string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User identifier (opaque, assigned by the server)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Create a user ID from a string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One photo record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Server-assigned identifier
    pub id: CardId,
    /// Caption shown under the image
    pub title: String,
    /// Image location
    pub image_url: String,
    /// Users who liked the card, as last reported by the server
    pub liked_by: BTreeSet<UserId>,
    /// Author of the card
    pub owner_id: UserId,
    /// Creation time, when the server reports one
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Card {
    /// Create a card with no likes
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        owner_id: UserId,
    ) -> Self {
        Self {
            id: CardId::new(id),
            title: title.into(),
            image_url: image_url.into(),
            liked_by: BTreeSet::new(),
            owner_id,
            created_at: None,
        }
    }

    /// Set the like snapshot
    #[must_use]
    pub fn with_likes<I>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = UserId>,
    {
        self.liked_by = users.into_iter().collect();
        self
    }
}

/// The signed-in user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned identifier
    pub id: UserId,
    /// Name shown in the profile header
    pub display_name: String,
    /// Short description under the name
    pub bio: String,
    /// Profile picture location
    pub avatar_url: String,
}

/// Payload for creating a card
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCard {
    /// Caption
    pub title: String,
    /// Image location
    pub image_url: String,
}

impl NewCard {
    /// Build the payload from the add-card form
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when a field is missing from the binding.
    pub fn from_form(form: &FormBinding) -> Result<Self, ValidationError> {
        Ok(Self {
            title: form.require(fields::TITLE)?.to_string(),
            image_url: form.require(fields::LINK)?.to_string(),
        })
    }
}

/// Payload for updating the profile text
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// New display name
    pub display_name: String,
    /// New bio
    pub bio: String,
}

impl ProfileUpdate {
    /// Build the payload from the profile form
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when a field is missing from the binding.
    pub fn from_form(form: &FormBinding) -> Result<Self, ValidationError> {
        Ok(Self {
            display_name: form.require(fields::NAME)?.to_string(),
            bio: form.require(fields::ABOUT)?.to_string(),
        })
    }
}

/// Payload for replacing the profile picture
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarUpdate {
    /// New picture location
    pub avatar_url: String,
}

impl AvatarUpdate {
    /// Build the payload from the avatar form
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the field is missing from the binding.
    pub fn from_form(form: &FormBinding) -> Result<Self, ValidationError> {
        Ok(Self {
            avatar_url: form.require(fields::AVATAR)?.to_string(),
        })
    }
}

/// Form field names used by the built-in dialogues
pub mod fields {
    /// Card caption
    pub const TITLE: &str = "name";
    /// Card image location
    pub const LINK: &str = "link";
    /// Profile display name
    pub const NAME: &str = "name";
    /// Profile bio
    pub const ABOUT: &str = "about";
    /// Profile picture location
    pub const AVATAR: &str = "avatar";
}

/// Render-ready view of one card
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSnapshot {
    /// Card identifier
    pub id: CardId,
    /// Caption (also used as the image alt text)
    pub title: String,
    /// Image location
    pub image_url: String,
    /// Number of likes
    pub like_count: usize,
    /// Whether the viewer likes this card
    pub liked: bool,
    /// Whether the remove control is shown and functional
    pub removable: bool,
}

impl CardSnapshot {
    /// Alt text for the image
    #[must_use]
    pub fn image_alt(&self) -> &str {
        &self.title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_with_likes_dedups() {
        let card = Card::new("c1", "Lake", "http://img/lake.jpg", UserId::new("u1")).with_likes([
            UserId::new("u2"),
            UserId::new("u2"),
            UserId::new("u3"),
        ]);
        assert_eq!(card.liked_by.len(), 2);
        assert_eq!(card.id.as_str(), "c1");
    }

    #[test]
    fn test_new_card_from_form() {
        let form = FormBinding::from_pairs([("name", "Lake"), ("link", "http://img/lake.jpg")]);
        let payload = NewCard::from_form(&form).unwrap();
        assert_eq!(payload.title, "Lake");
        assert_eq!(payload.image_url, "http://img/lake.jpg");
    }

    #[test]
    fn test_profile_update_missing_field() {
        let form = FormBinding::from_pairs([("name", "Jacques")]);
        let err = ProfileUpdate::from_form(&form).unwrap_err();
        assert_eq!(err.field, "about");
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let json = serde_json::to_string(&CardId::new("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
    }
}
