//! Card Entity
//!
//! A rendered card bound to the viewer. Whether the viewer likes the card and
//! whether it may remove it are derived from the last server snapshot on
//! every read; nothing is cached.
//!
//! # In-Flight Lock
//!
//! A card runs at most one like/unlike/remove request at a time. The lock is
//! keyed by the request token so only the matching completion releases it.

use std::collections::BTreeSet;

use crate::error::CardError;
use crate::model::{Card, CardId, CardSnapshot, UserId};
use crate::ops::RequestToken;

/// Direction of a like toggle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LikeAction {
    /// Add the viewer to the like set
    Like,
    /// Remove the viewer from the like set
    Unlike,
}

/// A card as seen by the signed-in user
#[derive(Clone, Debug)]
pub struct CardView {
    card: Card,
    viewer: UserId,
    in_flight: Option<RequestToken>,
}

impl CardView {
    /// Bind a card to the viewer
    #[must_use]
    pub fn new(card: Card, viewer: UserId) -> Self {
        Self {
            card,
            viewer,
            in_flight: None,
        }
    }

    /// Card identifier
    #[must_use]
    pub fn id(&self) -> &CardId {
        &self.card.id
    }

    /// Underlying record
    #[must_use]
    pub fn card(&self) -> &Card {
        &self.card
    }

    /// Whether the viewer is in the like set
    #[must_use]
    pub fn liked(&self) -> bool {
        self.card.liked_by.contains(&self.viewer)
    }

    /// Size of the like set
    #[must_use]
    pub fn like_count(&self) -> usize {
        self.card.liked_by.len()
    }

    /// Whether the viewer owns the card
    #[must_use]
    pub fn removable(&self) -> bool {
        self.card.owner_id == self.viewer
    }

    /// Whether a request is in flight
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Render-ready view
    #[must_use]
    pub fn snapshot(&self) -> CardSnapshot {
        CardSnapshot {
            id: self.card.id.clone(),
            title: self.card.title.clone(),
            image_url: self.card.image_url.clone(),
            like_count: self.like_count(),
            liked: self.liked(),
            removable: self.removable(),
        }
    }

    /// Replace the like set with the server's
    pub fn reconcile_likes(&mut self, liked_by: BTreeSet<UserId>) {
        self.card.liked_by = liked_by;
    }

    /// Lock the card for a like toggle
    ///
    /// # Errors
    ///
    /// Returns [`CardError::Busy`] while another request is in flight.
    pub fn begin_toggle(&mut self, token: RequestToken) -> Result<LikeAction, CardError> {
        self.lock(token)?;
        Ok(if self.liked() {
            LikeAction::Unlike
        } else {
            LikeAction::Like
        })
    }

    /// Lock the card for removal
    ///
    /// # Errors
    ///
    /// Returns [`CardError::NotOwner`] for someone else's card and
    /// [`CardError::Busy`] while another request is in flight.
    pub fn begin_remove(&mut self, token: RequestToken) -> Result<(), CardError> {
        if !self.removable() {
            return Err(CardError::NotOwner(self.card.id.clone()));
        }
        self.lock(token)
    }

    /// Release the lock taken for `token`; other tokens leave it held
    pub fn finish(&mut self, token: RequestToken) -> bool {
        if self.in_flight == Some(token) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    fn lock(&mut self, token: RequestToken) -> Result<(), CardError> {
        if self.is_busy() {
            return Err(CardError::Busy(self.card.id.clone()));
        }
        self.in_flight = Some(token);
        Ok(())
    }
}
