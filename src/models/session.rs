//! Session mirror of the external identity.

use serde::{Deserialize, Serialize};

/// In-memory mirror of the backend-owned session.
///
/// The remote auth service owns and invalidates the real session; this value
/// is only ever replaced wholesale by the auth subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
    /// When the access token expires (UTC)
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

/// Session state transitions delivered to auth subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}
