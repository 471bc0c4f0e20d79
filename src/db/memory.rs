// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory backend double.
//!
//! Mirrors the managed backend's contract closely enough for tests and
//! offline development: the same uniqueness semantics on skills,
//! endorsements, and connections, the same embedded-join row shapes, and
//! both mutation styles (direct rows and the legacy `add_skill` /
//! `endorse_skill` procedures).
//!
//! Bulk-query invocations are counted so tests can assert the search
//! short-circuit property.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use dashmap::DashMap;

use crate::db::backend::{Backend, MutationStyle};
use crate::db::rpc;
use crate::error::{AppError, Result};
use crate::models::{ConnectionRow, EndorsementRow, EndorserRef, ProfileRow, ProfileUpdate, SkillRow};

#[derive(Debug, Clone)]
struct StoredSkill {
    id: String,
    user_id: String,
    skill_name: String,
}

/// In-memory backend with the managed service's semantics.
#[derive(Default)]
pub struct MemoryBackend {
    style: MutationStyle,
    /// profiles keyed by user id
    profiles: DashMap<String, ProfileRow>,
    /// skills keyed by "{user_id}\x1f{skill_name}"
    skills: DashMap<String, StoredSkill>,
    /// endorsements keyed by "{skill_id}\x1f{endorser_id}"
    endorsements: DashMap<String, (String, String)>,
    /// directed connections keyed by "{owner}\x1f{peer}"
    connections: DashMap<String, (String, String)>,
    next_skill_id: AtomicU64,
    /// Bulk fetches issued (profiles + skills + connections), for assertions
    pub bulk_queries: AtomicUsize,
}

impl MemoryBackend {
    pub fn new(style: MutationStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    fn key(a: &str, b: &str) -> String {
        format!("{}\x1f{}", a, b)
    }

    // ─── Seeding Helpers ─────────────────────────────────────────

    pub fn seed_profile(&self, row: ProfileRow) {
        self.profiles.insert(row.id.clone(), row);
    }

    /// Insert a skill row directly, returning its id.
    pub fn seed_skill(&self, user_id: &str, skill_name: &str) -> String {
        let id = format!("skill-{}", self.next_skill_id.fetch_add(1, Ordering::Relaxed));
        self.skills.insert(
            Self::key(user_id, skill_name),
            StoredSkill {
                id: id.clone(),
                user_id: user_id.to_string(),
                skill_name: skill_name.to_string(),
            },
        );
        id
    }

    /// Insert an endorsement row directly. The endorser need not have a
    /// profile row, which lets tests seed orphaned endorsements.
    pub fn seed_endorsement(&self, skill_id: &str, endorser_id: &str) {
        self.endorsements.insert(
            Self::key(skill_id, endorser_id),
            (skill_id.to_string(), endorser_id.to_string()),
        );
    }

    /// Count of bulk fetches issued so far.
    pub fn bulk_query_count(&self) -> usize {
        self.bulk_queries.load(Ordering::Relaxed)
    }

    // ─── Legacy RPC Dispatch ─────────────────────────────────────

    /// Emulate the backend's remote procedures for the legacy variant.
    ///
    /// Parameter names follow the deployed function signatures:
    /// `add_skill(user_id, skill_name)` and
    /// `endorse_skill(target_user_id, skill_name, endorser_id)`. A call with
    /// any other parameter set is rejected, like the real procedure gateway.
    fn call_rpc(&self, name: &str, params: serde_json::Value) -> Result<()> {
        match name {
            rpc::ADD_SKILL => {
                let user_id = rpc_param(&params, "user_id")?;
                let skill_name = rpc_param(&params, "skill_name")?;
                self.insert_skill_row(user_id, skill_name)
            }
            rpc::ENDORSE_SKILL => {
                let target_user_id = rpc_param(&params, "target_user_id")?;
                let skill_name = rpc_param(&params, "skill_name")?;
                let endorser_id = rpc_param(&params, "endorser_id")?;

                // The procedure resolves the skill row itself
                let skill_id = self
                    .skills
                    .get(&Self::key(target_user_id, skill_name))
                    .map(|s| s.id.clone())
                    .ok_or_else(|| {
                        AppError::NotFound(format!(
                            "skill {:?} for user {}",
                            skill_name, target_user_id
                        ))
                    })?;
                self.insert_endorsement_row(&skill_id, endorser_id)
            }
            other => Err(AppError::BackendApi(format!("unknown rpc: {}", other))),
        }
    }

    // ─── Row Mutations (shared by both styles) ───────────────────

    fn insert_skill_row(&self, user_id: &str, skill_name: &str) -> Result<()> {
        let key = Self::key(user_id, skill_name);
        if self.skills.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "duplicate skill {:?} for user {}",
                skill_name, user_id
            )));
        }
        self.seed_skill(user_id, skill_name);
        Ok(())
    }

    fn insert_endorsement_row(&self, skill_id: &str, endorser_id: &str) -> Result<()> {
        let key = Self::key(skill_id, endorser_id);
        if self.endorsements.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "duplicate endorsement of {} by {}",
                skill_id, endorser_id
            )));
        }
        self.seed_endorsement(skill_id, endorser_id);
        Ok(())
    }

    fn endorsements_for_skill(&self, skill_id: &str) -> Option<Vec<EndorsementRow>> {
        let rows: Vec<EndorsementRow> = self
            .endorsements
            .iter()
            .filter(|entry| entry.value().0 == skill_id)
            .map(|entry| {
                let endorser_id = entry.value().1.clone();
                // Join against profiles; a missing profile yields None,
                // like an orphaned foreign key in the real backend
                let profile = self.profiles.get(&endorser_id).map(|p| EndorserRef {
                    id: p.id.clone(),
                    full_name: p.full_name.clone(),
                });
                EndorsementRow {
                    endorser_id,
                    profile,
                }
            })
            .collect();

        // The real backend omits the collection when there are no rows
        if rows.is_empty() {
            None
        } else {
            Some(rows)
        }
    }
}

fn rpc_param<'a>(params: &'a serde_json::Value, name: &str) -> Result<&'a str> {
    params[name]
        .as_str()
        .ok_or_else(|| AppError::BackendApi(format!("rpc parameter {} missing", name)))
}

#[async_trait::async_trait]
impl Backend for MemoryBackend {
    async fn fetch_profile(&self, id: &str) -> Result<Option<ProfileRow>> {
        Ok(self.profiles.get(id).map(|p| p.value().clone()))
    }

    async fn fetch_profiles(&self, ids: &[String]) -> Result<Vec<ProfileRow>> {
        self.bulk_queries.fetch_add(1, Ordering::Relaxed);
        let wanted: HashSet<&String> = ids.iter().collect();
        Ok(self
            .profiles
            .iter()
            .filter(|entry| wanted.contains(entry.key()))
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn list_profile_ids(&self) -> Result<Vec<String>> {
        Ok(self.profiles.iter().map(|entry| entry.key().clone()).collect())
    }

    async fn fetch_skills(&self, user_ids: &[String]) -> Result<Vec<SkillRow>> {
        self.bulk_queries.fetch_add(1, Ordering::Relaxed);
        let wanted: HashSet<&str> = user_ids.iter().map(String::as_str).collect();
        let mut rows: Vec<SkillRow> = self
            .skills
            .iter()
            .filter(|entry| wanted.contains(entry.value().user_id.as_str()))
            .map(|entry| {
                let skill = entry.value();
                SkillRow {
                    id: skill.id.clone(),
                    user_id: skill.user_id.clone(),
                    skill_name: skill.skill_name.clone(),
                    endorsements: self.endorsements_for_skill(&skill.id),
                }
            })
            .collect();
        // DashMap iteration order is arbitrary; keep output stable
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(rows)
    }

    async fn search_skill_user_ids(&self, query: &str) -> Result<Vec<String>> {
        let needle = query.to_lowercase();
        let mut seen = HashSet::new();
        let mut ids: Vec<String> = self
            .skills
            .iter()
            .filter(|entry| entry.value().skill_name.to_lowercase().contains(&needle))
            .map(|entry| entry.value().user_id.clone())
            .filter(|id| seen.insert(id.clone()))
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn fetch_connections(&self, user_ids: &[String]) -> Result<Vec<ConnectionRow>> {
        self.bulk_queries.fetch_add(1, Ordering::Relaxed);
        let wanted: HashSet<&str> = user_ids.iter().map(String::as_str).collect();
        let mut rows: Vec<ConnectionRow> = self
            .connections
            .iter()
            .filter(|entry| wanted.contains(entry.value().0.as_str()))
            .map(|entry| ConnectionRow {
                user_id: entry.value().0.clone(),
                peer_id: entry.value().1.clone(),
            })
            .collect();
        rows.sort_by(|a, b| (&a.user_id, &a.peer_id).cmp(&(&b.user_id, &b.peer_id)));
        Ok(rows)
    }

    async fn update_profile(&self, user_id: &str, updates: &ProfileUpdate) -> Result<()> {
        let mut profile = self
            .profiles
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound(format!("profile {}", user_id)))?;
        if let Some(headline) = &updates.headline {
            profile.headline = Some(headline.clone());
        }
        if let Some(bio) = &updates.bio {
            profile.bio = Some(bio.clone());
        }
        Ok(())
    }

    async fn insert_skill(&self, user_id: &str, skill_name: &str) -> Result<()> {
        match self.style {
            MutationStyle::Rows => self.insert_skill_row(user_id, skill_name),
            MutationStyle::Rpc => self.call_rpc(
                rpc::ADD_SKILL,
                serde_json::json!({
                    "user_id": user_id,
                    "skill_name": skill_name,
                }),
            ),
        }
    }

    async fn find_skill_id(&self, user_id: &str, skill_name: &str) -> Result<Option<String>> {
        Ok(self
            .skills
            .get(&Self::key(user_id, skill_name))
            .map(|s| s.id.clone()))
    }

    async fn insert_endorsement(
        &self,
        target_user_id: &str,
        skill_name: &str,
        endorser_id: &str,
    ) -> Result<()> {
        match self.style {
            MutationStyle::Rows => {
                let skill_id = self
                    .skills
                    .get(&Self::key(target_user_id, skill_name))
                    .map(|s| s.id.clone())
                    .ok_or_else(|| {
                        AppError::NotFound(format!(
                            "skill {:?} for user {}",
                            skill_name, target_user_id
                        ))
                    })?;
                self.insert_endorsement_row(&skill_id, endorser_id)
            }
            MutationStyle::Rpc => self.call_rpc(
                rpc::ENDORSE_SKILL,
                serde_json::json!({
                    "target_user_id": target_user_id,
                    "skill_name": skill_name,
                    "endorser_id": endorser_id,
                }),
            ),
        }
    }

    async fn insert_connection_pair(&self, a: &str, b: &str) -> Result<()> {
        let forward = Self::key(a, b);
        let reverse = Self::key(b, a);
        if self.connections.contains_key(&forward) || self.connections.contains_key(&reverse) {
            return Err(AppError::Conflict(format!(
                "connection {} <-> {} already exists",
                a, b
            )));
        }
        self.connections
            .insert(forward, (a.to_string(), b.to_string()));
        self.connections
            .insert(reverse, (b.to_string(), a.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProfileRow;

    fn backend() -> MemoryBackend {
        let backend = MemoryBackend::new(MutationStyle::Rpc);
        backend.seed_profile(ProfileRow {
            id: "u1".to_string(),
            email: "u1@example.com".to_string(),
            full_name: "User One".to_string(),
            headline: None,
            bio: None,
            avatar_url: None,
        });
        backend
    }

    #[test]
    fn test_rpc_accepts_deployed_parameter_names() {
        let backend = backend();

        backend
            .call_rpc(
                rpc::ADD_SKILL,
                serde_json::json!({ "user_id": "u1", "skill_name": "Rust" }),
            )
            .expect("add_skill(user_id, skill_name) should succeed");

        backend
            .call_rpc(
                rpc::ENDORSE_SKILL,
                serde_json::json!({
                    "target_user_id": "u1",
                    "skill_name": "Rust",
                    "endorser_id": "u2",
                }),
            )
            .expect("endorse_skill(target_user_id, skill_name, endorser_id) should succeed");
    }

    #[test]
    fn test_rpc_rejects_unknown_parameter_names() {
        let backend = backend();

        let err = backend
            .call_rpc(
                rpc::ADD_SKILL,
                serde_json::json!({ "p_user_id": "u1", "p_skill_name": "Rust" }),
            )
            .unwrap_err();
        assert!(matches!(err, AppError::BackendApi(_)));
    }

    #[test]
    fn test_rpc_endorse_missing_skill_is_not_found() {
        let backend = backend();

        let err = backend
            .call_rpc(
                rpc::ENDORSE_SKILL,
                serde_json::json!({
                    "target_user_id": "u1",
                    "skill_name": "Juggling",
                    "endorser_id": "u2",
                }),
            )
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
