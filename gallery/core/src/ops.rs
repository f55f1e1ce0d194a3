//! Request Bookkeeping
//!
//! Every network call the engine starts is tagged with a [`RequestToken`] and
//! recorded as a [`PendingOp`]. The spawned task reports back exactly one
//! [`Completion`] carrying the same token. A completion whose token is no
//! longer pending, or whose dialogue has since closed, is dropped.

use std::collections::BTreeSet;

use crate::dialogue::{DialogueKind, TimerEvent};
use crate::error::ApiError;
use crate::model::{Card, CardId, User, UserId};

/// Identifies one in-flight request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    /// Raw token value
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic source of request tokens
#[derive(Debug, Default)]
pub struct TokenCounter {
    last: u64,
}

impl TokenCounter {
    /// Next unused token
    pub fn next_token(&mut self) -> RequestToken {
        self.last += 1;
        RequestToken(self.last)
    }
}

/// What an in-flight request was started for
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingOp {
    /// Submission of a form dialogue
    Form {
        /// The submitting dialogue
        kind: DialogueKind,
    },
    /// Like or unlike of one card
    Like {
        /// Target card
        card_id: CardId,
        /// `true` to like, `false` to unlike
        liking: bool,
    },
    /// Confirmed removal of one card
    Remove {
        /// Target card
        card_id: CardId,
    },
}

impl PendingOp {
    /// Failed outcome of the right shape, for a task that never reported
    #[must_use]
    pub fn failed(&self, error: ApiError) -> Outcome {
        match self {
            Self::Form {
                kind: DialogueKind::AddCard,
            } => Outcome::CardCreated(Err(error)),
            Self::Form { .. } => Outcome::UserUpdated(Err(error)),
            Self::Like { .. } => Outcome::LikesChanged(Err(error)),
            Self::Remove { .. } => Outcome::CardDeleted(Err(error)),
        }
    }
}

/// Result of one resource call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// `create_card` finished
    CardCreated(Result<Card, ApiError>),
    /// `delete_card` finished
    CardDeleted(Result<(), ApiError>),
    /// `like_card` or `unlike_card` finished, with the server's like set
    LikesChanged(Result<BTreeSet<UserId>, ApiError>),
    /// `update_user` or `update_avatar` finished
    UserUpdated(Result<User, ApiError>),
}

/// Message on the engine's internal completion channel
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    /// A resource call resolved
    Request {
        /// Token issued when the call started
        token: RequestToken,
        /// What came back
        outcome: Outcome,
    },
    /// The error toast timer fired
    Timer(TimerEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_monotonic() {
        let mut counter = TokenCounter::default();
        let a = counter.next_token();
        let b = counter.next_token();
        assert!(b > a);
        assert_eq!(a.value(), 1);
    }

    #[test]
    fn test_failed_outcome_matches_op() {
        let err = ApiError::transport("task aborted");
        let add = PendingOp::Form {
            kind: DialogueKind::AddCard,
        };
        assert!(matches!(add.failed(err.clone()), Outcome::CardCreated(Err(_))));

        let avatar = PendingOp::Form {
            kind: DialogueKind::ChangeAvatar,
        };
        assert!(matches!(avatar.failed(err.clone()), Outcome::UserUpdated(Err(_))));

        let remove = PendingOp::Remove {
            card_id: CardId::new("c1"),
        };
        assert_eq!(remove.failed(err.clone()), Outcome::CardDeleted(Err(err)));
    }
}
