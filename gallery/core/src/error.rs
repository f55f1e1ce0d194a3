//! Error Types
//!
//! Three families of failure reach the engine:
//!
//! - **Validation**: local and field-level, never reaches the network
//! - **Network**: anything the resource client reports, surfaced through the
//!   error toast
//! - **Contract**: a call the state machine refuses (double open, double
//!   submit, toggling a busy card). Strict builds report these as `Err`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;
use crate::dialogue::DialogueKind;
use crate::model::CardId;

/// Failure reported by a resource client
///
/// `status` is `None` when the request never produced an HTTP response.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ApiError {
    /// HTTP status code, when one was received
    pub status: Option<u16>,
    /// Human-readable description
    pub message: String,
}

impl ApiError {
    /// A non-2xx response
    pub fn status(code: u16, reason: impl AsRef<str>) -> Self {
        Self {
            status: Some(code),
            message: format!("An error occurred: {code} {}", reason.as_ref()),
        }
    }

    /// The request could not be completed at all
    pub fn transport(detail: impl std::fmt::Display) -> Self {
        Self {
            status: None,
            message: format!("Network request failed: {detail}"),
        }
    }

    /// The response arrived but could not be decoded
    pub fn decode(detail: impl std::fmt::Display) -> Self {
        Self {
            status: None,
            message: format!("Unexpected response from server: {detail}"),
        }
    }

    /// Whether the server answered with "not found"
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::decode(err);
        }
        match err.status() {
            Some(status) => Self::status(
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
            ),
            None => Self::transport(err),
        }
    }
}

/// A form field failed its constraint
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Invalid field '{field}': {message}")]
pub struct ValidationError {
    /// Field name
    pub field: String,
    /// What is wrong with it
    pub message: String,
}

impl ValidationError {
    /// Create a validation error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The field is absent from the form binding
    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, "Please fill out this field.")
    }
}

/// A dialogue transition the state machine refused
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DialogueError {
    /// The dialogue is already open
    #[error("Dialogue {0} is already open")]
    AlreadyOpen(DialogueKind),

    /// Another dialogue is waiting on the network
    #[error("Dialogue {active} is submitting; cannot open {requested}")]
    Busy {
        /// Occupant of the active slot
        active: DialogueKind,
        /// Dialogue that was asked to open
        requested: DialogueKind,
    },

    /// The operation needs an open dialogue and there is none of that kind
    #[error("Dialogue {0} is not open")]
    NotOpen(DialogueKind),

    /// The operation needs an open dialogue and none is open
    #[error("No dialogue is open")]
    NothingOpen,

    /// Submit was requested while a submission is in flight
    #[error("Dialogue {0} is already submitting")]
    AlreadySubmitting(DialogueKind),

    /// Submit was requested on a dialogue that has nothing to submit
    #[error("Dialogue {0} does not accept submissions")]
    NotSubmittable(DialogueKind),

    /// Submit was requested while the form is invalid
    #[error("Dialogue {0} has invalid fields")]
    Invalid(DialogueKind),

    /// The confirmation was already used
    #[error("Confirmation has no pending action")]
    NoPendingAction,
}

/// A card operation the entity refused
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CardError {
    /// An operation on the card is still in flight
    #[error("Card {0} has a request in flight")]
    Busy(CardId),

    /// The viewer does not own the card
    #[error("Card {0} is not owned by the current user")]
    NotOwner(CardId),
}

/// Top-level error for the gallery engine
#[derive(Debug, Error)]
pub enum GalleryError {
    /// Resource client failure
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Refused dialogue transition
    #[error(transparent)]
    Dialogue(#[from] DialogueError),

    /// Refused card operation
    #[error(transparent)]
    Card(#[from] CardError),

    /// Local field validation failure
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The event referenced a card the section does not hold
    #[error("Unknown card: {0}")]
    UnknownCard(CardId),

    /// The operation needs the signed-in user and it has not been loaded
    #[error("User profile is not loaded yet")]
    NotLoaded,
}

impl GalleryError {
    /// Whether this is a programming-contract violation rather than a
    /// runtime failure
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::Dialogue(_) | Self::Card(_) | Self::UnknownCard(_) | Self::NotLoaded
        )
    }

    /// Whether this failure came from the network
    #[must_use]
    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api(_))
    }
}

/// A type alias for `Result<T, GalleryError>`
pub type Result<T> = std::result::Result<T, GalleryError>;
