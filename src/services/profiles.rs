// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile assembler and skill/endorsement/connection mutations.
//!
//! The assembler fans out the profile, skills-with-endorsements, and
//! outgoing-connection queries, then joins them in memory into one
//! denormalized [`UserProfile`] per user. All-or-nothing: any query error
//! propagates, no partial result is returned.
//!
//! The bulk search path exists purely to avoid N+1 query fan-out when
//! rendering a result grid.

use std::collections::HashMap;
use std::sync::Arc;

use crate::db::Backend;
use crate::error::Result;
use crate::models::{
    ConnectionRow, Endorser, ProfileRow, ProfileUpdate, SkillEndorsement, SkillRow, UserProfile,
};

/// Profile assembly and mutation service.
#[derive(Clone)]
pub struct ProfileService {
    backend: Arc<dyn Backend>,
}

impl ProfileService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    // ─── Assembly ────────────────────────────────────────────────

    /// Fetch and assemble one user's profile; `None` when the profile row is
    /// absent.
    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<UserProfile>> {
        let ids = [id.to_string()];

        let (profile, skills, connections) = tokio::try_join!(
            self.backend.fetch_profile(id),
            self.backend.fetch_skills(&ids),
            self.backend.fetch_connections(&ids),
        )?;

        let Some(profile) = profile else {
            return Ok(None);
        };

        let connections = connections.into_iter().map(|c| c.peer_id).collect();
        Ok(Some(assemble_profile(profile, skills, connections)))
    }

    /// Search co-founder candidates by skill name.
    ///
    /// An empty query returns all profiles. When no skill matches, returns
    /// an empty list without issuing the bulk queries.
    pub async fn search_users_by_skill(&self, query: &str) -> Result<Vec<UserProfile>> {
        let user_ids = if query.is_empty() {
            self.backend.list_profile_ids().await?
        } else {
            self.backend.search_skill_user_ids(query).await?
        };

        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        let (profiles, skills, connections) = tokio::try_join!(
            self.backend.fetch_profiles(&user_ids),
            self.backend.fetch_skills(&user_ids),
            self.backend.fetch_connections(&user_ids),
        )?;

        Ok(assemble_profiles(profiles, skills, connections))
    }

    // ─── Mutations ───────────────────────────────────────────────

    /// Apply a partial profile update. Errors propagate unchanged.
    pub async fn update_profile(&self, user_id: &str, updates: ProfileUpdate) -> Result<()> {
        if updates.is_empty() {
            return Ok(());
        }
        self.backend.update_profile(user_id, &updates).await
    }

    /// Add a skill to a user. Adding a skill the user already has is a no-op.
    pub async fn add_skill(&self, user_id: &str, skill_name: &str) -> Result<()> {
        match self.backend.insert_skill(user_id, skill_name).await {
            Err(e) if e.is_conflict() => {
                tracing::warn!(user_id, skill_name, "User already has this skill");
                Ok(())
            }
            other => other,
        }
    }

    /// Endorse a user's named skill.
    ///
    /// Fails with `NotFound` when the target has no such skill. A duplicate
    /// endorsement is a no-op.
    pub async fn add_endorsement(
        &self,
        target_user_id: &str,
        skill_name: &str,
        endorser_id: &str,
    ) -> Result<()> {
        match self
            .backend
            .insert_endorsement(target_user_id, skill_name, endorser_id)
            .await
        {
            Err(e) if e.is_conflict() => {
                tracing::warn!(
                    target_user_id,
                    skill_name,
                    endorser_id,
                    "User has already endorsed this skill"
                );
                Ok(())
            }
            other => other,
        }
    }

    /// Send a connection request, inserting both directed rows so the
    /// relation is symmetric. An existing connection is a no-op.
    pub async fn send_connection_request(&self, sender_id: &str, receiver_id: &str) -> Result<()> {
        match self
            .backend
            .insert_connection_pair(sender_id, receiver_id)
            .await
        {
            Err(e) if e.is_conflict() => {
                tracing::warn!(sender_id, receiver_id, "Connection already exists");
                Ok(())
            }
            other => other,
        }
    }
}

// ─── Pure Mapping ────────────────────────────────────────────────

/// Join one profile row with its skill and connection rows.
pub fn assemble_profile(
    profile: ProfileRow,
    skills: Vec<SkillRow>,
    connections: Vec<String>,
) -> UserProfile {
    UserProfile {
        id: profile.id,
        email: profile.email,
        full_name: profile.full_name,
        headline: profile.headline.unwrap_or_default(),
        bio: profile.bio.unwrap_or_default(),
        avatar_url: profile.avatar_url.unwrap_or_default(),
        skills: format_skills(skills),
        connections,
    }
}

/// Group bulk rows by owning user id and assemble one profile per row.
pub fn assemble_profiles(
    profiles: Vec<ProfileRow>,
    skills: Vec<SkillRow>,
    connections: Vec<ConnectionRow>,
) -> Vec<UserProfile> {
    let mut skills_by_user: HashMap<String, Vec<SkillRow>> = HashMap::new();
    for skill in skills {
        skills_by_user
            .entry(skill.user_id.clone())
            .or_default()
            .push(skill);
    }

    let mut connections_by_user: HashMap<String, Vec<String>> = HashMap::new();
    for conn in connections {
        connections_by_user
            .entry(conn.user_id)
            .or_default()
            .push(conn.peer_id);
    }

    profiles
        .into_iter()
        .map(|profile| {
            let user_skills = skills_by_user.remove(&profile.id).unwrap_or_default();
            let user_connections = connections_by_user.remove(&profile.id).unwrap_or_default();
            assemble_profile(profile, user_skills, user_connections)
        })
        .collect()
}

/// Map skill rows to view skills.
///
/// A missing endorsements collection becomes an empty list, and endorsements
/// whose joined profile did not resolve (orphaned foreign key) are dropped.
fn format_skills(skills: Vec<SkillRow>) -> Vec<SkillEndorsement> {
    skills
        .into_iter()
        .map(|skill| SkillEndorsement {
            skill: skill.skill_name,
            endorsed_by: skill
                .endorsements
                .unwrap_or_default()
                .into_iter()
                .filter_map(|e| e.profile)
                .map(|p| Endorser {
                    id: p.id,
                    full_name: p.full_name,
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EndorsementRow, EndorserRef};

    fn profile_row(id: &str) -> ProfileRow {
        ProfileRow {
            id: id.to_string(),
            email: format!("{}@example.com", id),
            full_name: format!("User {}", id),
            headline: None,
            bio: None,
            avatar_url: None,
        }
    }

    fn skill_row(id: &str, user_id: &str, name: &str, endorsements: Option<Vec<EndorsementRow>>) -> SkillRow {
        SkillRow {
            id: id.to_string(),
            user_id: user_id.to_string(),
            skill_name: name.to_string(),
            endorsements,
        }
    }

    #[test]
    fn test_format_skills_null_endorsements_become_empty() {
        let skills = format_skills(vec![skill_row("s1", "u1", "Rust", None)]);
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].skill, "Rust");
        assert!(skills[0].endorsed_by.is_empty());
    }

    #[test]
    fn test_format_skills_drops_orphaned_endorsements() {
        let endorsements = vec![
            EndorsementRow {
                endorser_id: "gone".to_string(),
                profile: None,
            },
            EndorsementRow {
                endorser_id: "u2".to_string(),
                profile: Some(EndorserRef {
                    id: "u2".to_string(),
                    full_name: "User u2".to_string(),
                }),
            },
        ];
        let skills = format_skills(vec![skill_row("s1", "u1", "Rust", Some(endorsements))]);

        assert_eq!(skills[0].endorsed_by.len(), 1);
        assert_eq!(skills[0].endorsed_by[0].id, "u2");
        assert_eq!(skills[0].endorsed_by[0].full_name, "User u2");
    }

    #[test]
    fn test_assemble_profile_defaults_nullable_columns() {
        let assembled = assemble_profile(profile_row("u1"), vec![], vec![]);
        assert_eq!(assembled.headline, "");
        assert_eq!(assembled.bio, "");
        assert_eq!(assembled.avatar_url, "");
        assert!(assembled.skills.is_empty());
        assert!(assembled.connections.is_empty());
    }

    #[test]
    fn test_assemble_profiles_groups_by_owner() {
        let profiles = vec![profile_row("u1"), profile_row("u2")];
        let skills = vec![
            skill_row("s1", "u1", "Rust", None),
            skill_row("s2", "u2", "Design", None),
            skill_row("s3", "u1", "Sales", None),
        ];
        let connections = vec![
            ConnectionRow {
                user_id: "u1".to_string(),
                peer_id: "u2".to_string(),
            },
            ConnectionRow {
                user_id: "u2".to_string(),
                peer_id: "u1".to_string(),
            },
        ];

        let assembled = assemble_profiles(profiles, skills, connections);
        assert_eq!(assembled.len(), 2);

        let u1 = assembled.iter().find(|p| p.id == "u1").unwrap();
        let skills_u1: Vec<&str> = u1.skills.iter().map(|s| s.skill.as_str()).collect();
        assert_eq!(skills_u1, vec!["Rust", "Sales"]);
        assert_eq!(u1.connections, vec!["u2".to_string()]);

        let u2 = assembled.iter().find(|p| p.id == "u2").unwrap();
        assert_eq!(u2.skills.len(), 1);
        assert_eq!(u2.connections, vec!["u1".to_string()]);
    }

    #[test]
    fn test_assemble_profiles_user_without_rows() {
        let assembled = assemble_profiles(vec![profile_row("u1")], vec![], vec![]);
        assert_eq!(assembled.len(), 1);
        assert!(assembled[0].skills.is_empty());
        assert!(assembled[0].connections.is_empty());
    }
}
