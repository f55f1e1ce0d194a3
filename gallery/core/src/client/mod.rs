//! Resource Client
//!
//! Access to the cards/users REST resource behind one async trait, so the
//! engine works the same against the live API and a local store.
//!
//! # Available Clients
//!
//! - **HttpClient**: the REST API over `reqwest` (default)
//! - **InMemoryClient**: process-local store for offline runs and tests
//!
//! # Usage
//!
//! ```ignore
//! use gallery_core::client::{HttpClient, ResourceClient};
//!
//! let client = HttpClient::from_config(&config)?;
//! let cards = client.list_cards().await?;
//! ```

mod http;
mod memory;
mod traits;

pub use http::HttpClient;
pub use memory::InMemoryClient;
pub use traits::ResourceClient;
