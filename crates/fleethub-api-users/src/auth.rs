//! Request identity context.
//!
//! The deployment's authentication middleware validates the bearer token and
//! inserts an [`ActingUser`] extension before requests reach these routes.
//! The handlers only consume it; token validation itself lives upstream.

use uuid::Uuid;

/// The authenticated user a request is acting as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingUser(pub Uuid);

impl ActingUser {
    /// The acting user's ID.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.0
    }
}
