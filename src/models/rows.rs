// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Raw row types returned by the backend's query surface.
//!
//! Each query has an explicit result type; the service layer maps these into
//! the [`UserProfile`](crate::models::UserProfile) aggregate with a pure
//! function. Nothing here is stored locally.

use serde::{Deserialize, Serialize};

/// One row of the `profiles` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRow {
    pub id: String,
    pub email: String,
    pub full_name: String,
    /// Nullable in the backend; treated as empty when absent
    pub headline: Option<String>,
    /// Nullable in the backend; treated as empty when absent
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

/// Minimal profile reference embedded in an endorsement join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndorserRef {
    pub id: String,
    pub full_name: String,
}

/// One `endorsements` row joined with the endorsing user's profile.
///
/// `profile` is `None` when the foreign key no longer resolves (orphaned
/// endorsement); assembly filters those out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndorsementRow {
    pub endorser_id: String,
    #[serde(rename = "profiles")]
    pub profile: Option<EndorserRef>,
}

/// One `skills` row with its embedded endorsement join.
///
/// `endorsements` is `None` when the backend omits the collection entirely;
/// assembly treats that the same as an empty list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillRow {
    pub id: String,
    pub user_id: String,
    pub skill_name: String,
    pub endorsements: Option<Vec<EndorsementRow>>,
}

/// One directed `connections` row (owner → peer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionRow {
    pub user_id: String,
    pub peer_id: String,
}

/// Partial update applied to a profile row.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.headline.is_none() && self.bio.is_none()
    }
}
