//! HTTP Resource Client
//!
//! JSON over HTTPS against the cards/users API.
//!
//! # Endpoints
//!
//! - `GET /cards`, `POST /cards`, `DELETE /cards/{id}`
//! - `PUT /cards/likes/{id}`, `DELETE /cards/likes/{id}`
//! - `GET /users/me`, `PATCH /users/me`, `PATCH /users/me/avatar`
//!
//! Every request carries the raw auth token in `Authorization`.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::traits::ResourceClient;
use crate::config::GalleryConfig;
use crate::error::ApiError;
use crate::model::{AvatarUpdate, Card, CardId, NewCard, ProfileUpdate, User, UserId};

/// REST client for the live API
#[derive(Clone, Debug)]
pub struct HttpClient {
    base_url: String,
    auth_token: String,
    http_client: reqwest::Client,
}

impl HttpClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the HTTP client cannot be built.
    pub fn from_config(config: &GalleryConfig) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ApiError::transport)?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http_client
            .request(method, self.url(path))
            .header(AUTHORIZATION, &self.auth_token)
    }

    /// Send and reject any non-2xx status, leaving the body unread
    async fn send_checked(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|e| {
            error!(error = %e, "Request failed before a response arrived");
            ApiError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ApiError::status(status.as_u16(), status.canonical_reason().unwrap_or("Unknown"));
            error!(status = status.as_u16(), body = %body, "{err}");
            return Err(err);
        }
        Ok(response)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send_checked(request).await?;
        let status = response.status();
        let value = response.json::<T>().await.map_err(ApiError::decode)?;
        debug!(status = status.as_u16(), "Request succeeded");
        Ok(value)
    }

    /// Send a request whose success reply carries nothing the engine needs
    ///
    /// The body may be empty (`204`, or `200` without content) or a JSON
    /// acknowledgement; either way it is only logged.
    async fn send_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let response = self.send_checked(request).await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), body = %body, "Request succeeded");
        Ok(())
    }
}

#[async_trait]
impl ResourceClient for HttpClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn list_cards(&self) -> Result<Vec<Card>, ApiError> {
        let cards: Vec<WireCard> = self.send(self.request(Method::GET, "/cards")).await?;
        Ok(cards.into_iter().map(Card::from).collect())
    }

    async fn create_card(&self, card: &NewCard) -> Result<Card, ApiError> {
        let body = WireNewCard {
            name: &card.title,
            link: &card.image_url,
        };
        let created: WireCard = self
            .send(self.request(Method::POST, "/cards").json(&body))
            .await?;
        Ok(created.into())
    }

    async fn delete_card(&self, id: &CardId) -> Result<(), ApiError> {
        let path = format!("/cards/{id}");
        self.send_empty(self.request(Method::DELETE, &path)).await
    }

    async fn like_card(&self, id: &CardId) -> Result<BTreeSet<UserId>, ApiError> {
        let path = format!("/cards/likes/{id}");
        let card: WireCard = self.send(self.request(Method::PUT, &path)).await?;
        Ok(Card::from(card).liked_by)
    }

    async fn unlike_card(&self, id: &CardId) -> Result<BTreeSet<UserId>, ApiError> {
        let path = format!("/cards/likes/{id}");
        let card: WireCard = self.send(self.request(Method::DELETE, &path)).await?;
        Ok(Card::from(card).liked_by)
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        let user: WireUser = self.send(self.request(Method::GET, "/users/me")).await?;
        Ok(user.into())
    }

    async fn update_user(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let body = WireProfile {
            name: &update.display_name,
            about: &update.bio,
        };
        let user: WireUser = self
            .send(self.request(Method::PATCH, "/users/me").json(&body))
            .await?;
        Ok(user.into())
    }

    async fn update_avatar(&self, update: &AvatarUpdate) -> Result<User, ApiError> {
        let body = WireAvatar {
            avatar: &update.avatar_url,
        };
        let user: WireUser = self
            .send(self.request(Method::PATCH, "/users/me/avatar").json(&body))
            .await?;
        Ok(user.into())
    }
}

// ============================================
// Wire records
// ============================================

/// A user reference: either a bare id or an embedded user record
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireRef {
    Id(String),
    Record {
        #[serde(rename = "_id")]
        id: String,
    },
}

impl From<WireRef> for UserId {
    fn from(r: WireRef) -> Self {
        match r {
            WireRef::Id(id) | WireRef::Record { id } => UserId::new(id),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireCard {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    link: String,
    #[serde(default)]
    likes: Vec<WireRef>,
    owner: WireRef,
    #[serde(rename = "createdAt", default)]
    created_at: Option<DateTime<Utc>>,
}

impl From<WireCard> for Card {
    fn from(wire: WireCard) -> Self {
        Card {
            id: CardId::new(wire.id),
            title: wire.name,
            image_url: wire.link,
            liked_by: wire.likes.into_iter().map(UserId::from).collect(),
            owner_id: wire.owner.into(),
            created_at: wire.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireUser {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    about: String,
    avatar: String,
}

impl From<WireUser> for User {
    fn from(wire: WireUser) -> Self {
        User {
            id: UserId::new(wire.id),
            display_name: wire.name,
            bio: wire.about,
            avatar_url: wire.avatar,
        }
    }
}

#[derive(Debug, Serialize)]
struct WireNewCard<'a> {
    name: &'a str,
    link: &'a str,
}

#[derive(Debug, Serialize)]
struct WireProfile<'a> {
    name: &'a str,
    about: &'a str,
}

#[derive(Debug, Serialize)]
struct WireAvatar<'a> {
    avatar: &'a str,
}
