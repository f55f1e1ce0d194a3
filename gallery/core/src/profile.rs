//! Profile header state.

use crate::messages::RenderDirective;
use crate::model::{fields, User, UserId};

const LOADING: &str = "Loading...";

/// The signed-in user, once loaded
#[derive(Clone, Debug, Default)]
pub struct UserInfo {
    user: Option<User>,
}

impl UserInfo {
    /// Create an unloaded profile
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the server's user record and return the header to draw
    pub fn set(&mut self, user: User) -> RenderDirective {
        let directive = RenderDirective::ProfileRendered {
            display_name: user.display_name.clone(),
            bio: user.bio.clone(),
            avatar_url: Some(user.avatar_url.clone()),
        };
        self.user = Some(user);
        directive
    }

    /// Header shown while the profile request is outstanding
    #[must_use]
    pub fn loading(&self) -> RenderDirective {
        RenderDirective::ProfileRendered {
            display_name: LOADING.to_string(),
            bio: self
                .user
                .as_ref()
                .map(|u| u.bio.clone())
                .unwrap_or_default(),
            avatar_url: self.user.as_ref().map(|u| u.avatar_url.clone()),
        }
    }

    /// Current user record
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Current user identifier
    #[must_use]
    pub fn user_id(&self) -> Option<&UserId> {
        self.user.as_ref().map(|u| &u.id)
    }

    /// Values for pre-filling the profile form
    #[must_use]
    pub fn form_values(&self) -> Option<Vec<(String, String)>> {
        self.user.as_ref().map(|u| {
            vec![
                (fields::NAME.to_string(), u.display_name.clone()),
                (fields::ABOUT.to_string(), u.bio.clone()),
            ]
        })
    }
}
