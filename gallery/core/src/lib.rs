//! Gallery Core - Dialogue and Form-State Engine for the photo gallery
//!
//! This crate holds the state behind the gallery page: the profile header,
//! the card list, the modal dialogues with their forms, and the error toast.
//! It knows nothing about how any of it is drawn. A render surface (browser
//! bridge, terminal, test harness) receives [`RenderDirective`]s and sends
//! back [`UiEvent`]s.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     Render Surface                        │
//! │        (DOM bridge, terminal shell, test harness)         │
//! └───────────────┬──────────────────────────▲───────────────┘
//!                 │ UiEvent (up)             │ RenderDirective (down)
//! ┌───────────────▼──────────────────────────┴───────────────┐
//! │                        Gallery                            │
//! │  ┌──────────┐ ┌─────────┐ ┌───────────────┐ ┌──────────┐ │
//! │  │ UserInfo │ │ Section │ │DialogueManager│ │ErrorToast│ │
//! │  └──────────┘ └─────────┘ └───────────────┘ └──────────┘ │
//! │                     │ spawned requests                    │
//! │              ┌──────▼─────────┐                           │
//! │              │ ResourceClient │  (HTTP or in-memory)      │
//! │              └────────────────┘                           │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Gallery`]: the engine; owns all page state
//! - [`DialogueManager`]: the single modal slot and its state machine
//! - [`ErrorToast`]: self-dismissing error overlay
//! - [`CardView`]: one card bound to the viewer, with its request lock
//! - [`ResourceClient`]: the cards/users REST resource
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use gallery_core::{client::InMemoryClient, Gallery, GalleryConfig, Surface, UiEvent};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (surface, mut directives) = Surface::channel();
//!     let client = Arc::new(InMemoryClient::seeded());
//!     let mut gallery = Gallery::new(client, GalleryConfig::default(), surface);
//!
//!     gallery.load().await.unwrap();
//!     gallery.handle_event(UiEvent::AddCardClicked).unwrap();
//!     gallery.handle_event(UiEvent::field("name", "Lake Louise")).unwrap();
//!     gallery.handle_event(UiEvent::field("link", "https://img.example.com/lake.jpg")).unwrap();
//!     gallery.handle_event(UiEvent::SubmitClicked).unwrap();
//!     gallery.settle().await;
//!
//!     while let Ok(directive) = directives.try_recv() {
//!         println!("{directive:?}");
//!     }
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`card`]: card entity, like reconciliation, ownership
//! - [`client`]: resource client trait plus HTTP and in-memory clients
//! - [`config`]: TOML/env configuration
//! - [`dialogue`]: dialogue state machine, forms, error toast
//! - [`events`]: events from the surface
//! - [`gallery`]: engine wiring
//! - [`messages`]: directives to the surface
//! - [`model`]: domain records and request payloads
//! - [`ops`]: request tokens and completions
//! - [`profile`]: profile header
//! - [`section`]: the card list
//! - [`validation`]: form field constraints

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod card;
pub mod client;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod events;
pub mod gallery;
pub mod messages;
pub mod model;
pub mod ops;
pub mod profile;
pub mod section;
pub mod validation;

// Re-exports for convenience
pub use card::{CardView, LikeAction};
pub use client::{HttpClient, InMemoryClient, ResourceClient};
pub use dialogue::{
    ConfirmAction, DialogueContext, DialogueKind, DialogueManager, DialogueState, ErrorToast,
    FormBinding, FormState, Listener,
};
pub use error::{ApiError, CardError, DialogueError, GalleryError, Result, ValidationError};
pub use events::{Key, Layer, UiEvent};
pub use gallery::Gallery;
pub use messages::{DialogueView, InsertPosition, RenderDirective, Surface};
pub use model::{AvatarUpdate, Card, CardId, CardSnapshot, NewCard, ProfileUpdate, User, UserId};
pub use ops::{Completion, Outcome, RequestToken};
pub use profile::UserInfo;
pub use section::Section;
pub use validation::{FieldConstraint, FormSchema, FormValidator};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, GalleryConfig, GalleryToml,
};
