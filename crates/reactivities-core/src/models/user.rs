//! Resolved user identity

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::session::SessionToken;

/// Profile returned by the identity loader for a valid token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub username: String,
    pub display_name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub token: SessionToken,
}

impl UserIdentity {
    /// Image to show for the user, falling back to the bundled placeholder.
    pub fn image_or_placeholder(&self) -> &str {
        self.image.as_deref().unwrap_or("/assets/user.png")
    }
}

impl fmt::Debug for UserIdentity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("UserIdentity")
            .field("username", &self.username)
            .field("display_name", &self.display_name)
            .field("image", &self.image)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
