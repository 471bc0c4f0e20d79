//! Denormalized profile view model.

use serde::{Deserialize, Serialize};

/// A user who vouched for a skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endorser {
    pub id: String,
    pub full_name: String,
}

/// A named skill with the users endorsing it. Zero endorsers is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillEndorsement {
    pub skill: String,
    pub endorsed_by: Vec<Endorser>,
}

/// Assembled profile view, rebuilt from backend rows on every fetch.
///
/// Skill names are unique per user (backend uniqueness constraint);
/// connections are referenced by identifier only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub headline: String,
    pub bio: String,
    pub avatar_url: String,
    pub skills: Vec<SkillEndorsement>,
    pub connections: Vec<String>,
}

impl UserProfile {
    /// The user's most prominent skill, if any.
    pub fn top_skill(&self) -> Option<&str> {
        self.skills.first().map(|s| s.skill.as_str())
    }

    /// First whitespace-separated token of the full name.
    pub fn first_name(&self) -> &str {
        self.full_name
            .split_whitespace()
            .next()
            .unwrap_or(&self.full_name)
    }
}
