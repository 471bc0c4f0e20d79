// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed backend trait over the managed service's data surface.

use crate::error::Result;
use crate::models::{ConnectionRow, ProfileRow, ProfileUpdate, SkillRow};

/// How write operations reach the backend.
///
/// The primary deployment inserts rows directly; a legacy deployment routes
/// skill/endorsement writes through the backend's `add_skill` and
/// `endorse_skill` remote procedures. Both implementations honor both styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MutationStyle {
    #[default]
    Rows,
    Rpc,
}

/// Operations the service layer needs from the backend collaborator.
///
/// Errors surface the backend's own taxonomy: `Conflict` for uniqueness
/// violations on insert, `NotFound`/`None` for absent rows, `BackendApi` for
/// transport failures. No method retries.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Fetch one profile row; `None` when absent.
    async fn fetch_profile(&self, id: &str) -> Result<Option<ProfileRow>>;

    /// Bulk-fetch profile rows for exactly the given identifier set.
    async fn fetch_profiles(&self, ids: &[String]) -> Result<Vec<ProfileRow>>;

    /// All profile identifiers.
    async fn list_profile_ids(&self) -> Result<Vec<String>>;

    /// Skill rows (with embedded endorsements and endorser refs) owned by any
    /// of the given users.
    async fn fetch_skills(&self, user_ids: &[String]) -> Result<Vec<SkillRow>>;

    /// Identifiers of users having any skill whose name contains `query`
    /// (case-insensitive substring), deduplicated.
    async fn search_skill_user_ids(&self, query: &str) -> Result<Vec<String>>;

    /// Outgoing connection rows owned by any of the given users.
    async fn fetch_connections(&self, user_ids: &[String]) -> Result<Vec<ConnectionRow>>;

    /// Apply a partial update to a profile row.
    async fn update_profile(&self, user_id: &str, updates: &ProfileUpdate) -> Result<()>;

    /// Insert a skill row. `Err(Conflict)` when the user already has it.
    async fn insert_skill(&self, user_id: &str, skill_name: &str) -> Result<()>;

    /// Resolve a skill row id by (owner, name); `None` when absent.
    async fn find_skill_id(&self, user_id: &str, skill_name: &str) -> Result<Option<String>>;

    /// Endorse a user's named skill. `Err(NotFound)` when the target has no
    /// such skill, `Err(Conflict)` on duplicate endorsement.
    ///
    /// Takes the skill by name: the legacy `endorse_skill` procedure resolves
    /// it server-side, and the row variant resolves it with [`find_skill_id`]
    /// before inserting.
    ///
    /// [`find_skill_id`]: Backend::find_skill_id
    async fn insert_endorsement(
        &self,
        target_user_id: &str,
        skill_name: &str,
        endorser_id: &str,
    ) -> Result<()>;

    /// Insert both directed rows of a connection (a→b and b→a) in one write.
    /// `Err(Conflict)` when the relation already exists.
    async fn insert_connection_pair(&self, a: &str, b: &str) -> Result<()>;
}
