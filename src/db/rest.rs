// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! REST implementation of the backend trait.
//!
//! Speaks the managed backend's row API: column selects with embedded
//! resources for the skills→endorsements→profiles join, `eq`/`in`/`ilike`
//! filters as query parameters, and POST bodies for inserts. Uniqueness
//! conflicts (HTTP 409 / Postgres 23505) are mapped to the typed `Conflict`
//! error here, once, at the transport edge.

use std::collections::HashSet;
use std::sync::RwLock;

use serde::Deserialize;

use crate::config::Config;
use crate::db::backend::{Backend, MutationStyle};
use crate::db::{rpc, tables};
use crate::error::{AppError, Result};
use crate::models::{ConnectionRow, ProfileRow, ProfileUpdate, SkillRow};

const PROFILE_COLUMNS: &str = "id,email,full_name,headline,bio,avatar_url";
const SKILL_COLUMNS: &str = "id,user_id,skill_name,endorsements(endorser_id,profiles(id,full_name))";
const CONNECTION_COLUMNS: &str = "user_id:user1_id,peer_id:user2_id";

/// Postgres unique-violation error code, as reported in REST error bodies.
const UNIQUE_VIOLATION: &str = "23505";

/// REST client for the managed backend's row API.
pub struct RestBackend {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    style: MutationStyle,
    /// Current user's access token; requests fall back to the anon key.
    session_token: RwLock<Option<String>>,
}

impl RestBackend {
    pub fn new(config: &Config, style: MutationStyle) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("{}/rest/v1", config.backend_url),
            anon_key: config.backend_anon_key.clone(),
            style,
            session_token: RwLock::new(None),
        }
    }

    /// Install or clear the signed-in user's access token.
    ///
    /// Row-level security on the backend keys off this bearer token; the auth
    /// gateway updates it on every session transition.
    pub fn set_session_token(&self, token: Option<String>) {
        *self
            .session_token
            .write()
            .expect("session token lock poisoned") = token;
    }

    fn bearer(&self) -> String {
        self.session_token
            .read()
            .expect("session token lock poisoned")
            .clone()
            .unwrap_or_else(|| self.anon_key.clone())
    }

    fn get(&self, table: &str) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}/{}", self.base_url, table))
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}/{}", self.base_url, path))
            .header("apikey", &self.anon_key)
            .header("Prefer", "return=minimal")
            .bearer_auth(self.bearer())
    }

    fn patch(&self, table: &str) -> reqwest::RequestBuilder {
        self.http
            .patch(format!("{}/{}", self.base_url, table))
            .header("apikey", &self.anon_key)
            .header("Prefer", "return=minimal")
            .bearer_auth(self.bearer())
    }

    /// Check response status, mapping conflicts to the typed error.
    async fn check_response(&self, response: reqwest::Response) -> Result<()> {
        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        let error_body: Option<ErrorBody> = serde_json::from_str(&body).ok();
        let code = error_body.as_ref().and_then(|e| e.code.as_deref());

        if status.as_u16() == 409 || code == Some(UNIQUE_VIOLATION) {
            let message = error_body
                .and_then(|e| e.message)
                .unwrap_or_else(|| "duplicate row".to_string());
            return Err(AppError::Conflict(message));
        }

        Err(AppError::BackendApi(format!("HTTP {}: {}", status, body)))
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::BackendApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::BackendApi(format!("JSON parse error: {}", e)))
    }

    fn in_filter(ids: &[String]) -> String {
        format!("in.({})", ids.join(","))
    }
}

/// Error body shape returned by the row API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct IdRow {
    id: String,
}

#[derive(Deserialize)]
struct UserIdRow {
    user_id: String,
}

#[async_trait::async_trait]
impl Backend for RestBackend {
    async fn fetch_profile(&self, id: &str) -> Result<Option<ProfileRow>> {
        let response = self
            .get(tables::PROFILES)
            .query(&[
                ("select", PROFILE_COLUMNS.to_string()),
                ("id", format!("eq.{}", id)),
            ])
            .send()
            .await
            .map_err(|e| AppError::BackendApi(e.to_string()))?;

        let rows: Vec<ProfileRow> = self.check_response_json(response).await?;
        Ok(rows.into_iter().next())
    }

    async fn fetch_profiles(&self, ids: &[String]) -> Result<Vec<ProfileRow>> {
        let response = self
            .get(tables::PROFILES)
            .query(&[
                ("select", PROFILE_COLUMNS.to_string()),
                ("id", Self::in_filter(ids)),
            ])
            .send()
            .await
            .map_err(|e| AppError::BackendApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    async fn list_profile_ids(&self) -> Result<Vec<String>> {
        let response = self
            .get(tables::PROFILES)
            .query(&[("select", "id")])
            .send()
            .await
            .map_err(|e| AppError::BackendApi(e.to_string()))?;

        let rows: Vec<IdRow> = self.check_response_json(response).await?;
        Ok(rows.into_iter().map(|r| r.id).collect())
    }

    async fn fetch_skills(&self, user_ids: &[String]) -> Result<Vec<SkillRow>> {
        let response = self
            .get(tables::SKILLS)
            .query(&[
                ("select", SKILL_COLUMNS.to_string()),
                ("user_id", Self::in_filter(user_ids)),
            ])
            .send()
            .await
            .map_err(|e| AppError::BackendApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    async fn search_skill_user_ids(&self, query: &str) -> Result<Vec<String>> {
        let response = self
            .get(tables::SKILLS)
            .query(&[
                ("select", "user_id".to_string()),
                ("skill_name", format!("ilike.*{}*", query)),
            ])
            .send()
            .await
            .map_err(|e| AppError::BackendApi(e.to_string()))?;

        let rows: Vec<UserIdRow> = self.check_response_json(response).await?;

        // Deduplicate while keeping backend ordering
        let mut seen = HashSet::new();
        Ok(rows
            .into_iter()
            .map(|r| r.user_id)
            .filter(|id| seen.insert(id.clone()))
            .collect())
    }

    async fn fetch_connections(&self, user_ids: &[String]) -> Result<Vec<ConnectionRow>> {
        let response = self
            .get(tables::CONNECTIONS)
            .query(&[
                ("select", CONNECTION_COLUMNS.to_string()),
                ("user1_id", Self::in_filter(user_ids)),
            ])
            .send()
            .await
            .map_err(|e| AppError::BackendApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    async fn update_profile(&self, user_id: &str, updates: &ProfileUpdate) -> Result<()> {
        let response = self
            .patch(tables::PROFILES)
            .query(&[("id", format!("eq.{}", user_id))])
            .json(updates)
            .send()
            .await
            .map_err(|e| AppError::BackendApi(e.to_string()))?;

        self.check_response(response).await
    }

    async fn insert_skill(&self, user_id: &str, skill_name: &str) -> Result<()> {
        let response = match self.style {
            MutationStyle::Rows => self
                .post(tables::SKILLS)
                .json(&serde_json::json!({
                    "user_id": user_id,
                    "skill_name": skill_name,
                }))
                .send()
                .await
                .map_err(|e| AppError::BackendApi(e.to_string()))?,
            MutationStyle::Rpc => self
                .post(&format!("rpc/{}", rpc::ADD_SKILL))
                .json(&serde_json::json!({
                    "user_id": user_id,
                    "skill_name": skill_name,
                }))
                .send()
                .await
                .map_err(|e| AppError::BackendApi(e.to_string()))?,
        };

        self.check_response(response).await
    }

    async fn find_skill_id(&self, user_id: &str, skill_name: &str) -> Result<Option<String>> {
        let response = self
            .get(tables::SKILLS)
            .query(&[
                ("select", "id".to_string()),
                ("user_id", format!("eq.{}", user_id)),
                ("skill_name", format!("eq.{}", skill_name)),
            ])
            .send()
            .await
            .map_err(|e| AppError::BackendApi(e.to_string()))?;

        let rows: Vec<IdRow> = self.check_response_json(response).await?;
        Ok(rows.into_iter().next().map(|r| r.id))
    }

    async fn insert_endorsement(
        &self,
        target_user_id: &str,
        skill_name: &str,
        endorser_id: &str,
    ) -> Result<()> {
        let response = match self.style {
            MutationStyle::Rows => {
                let skill_id = self
                    .find_skill_id(target_user_id, skill_name)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(format!(
                            "skill {:?} for user {}",
                            skill_name, target_user_id
                        ))
                    })?;

                self.post(tables::ENDORSEMENTS)
                    .json(&serde_json::json!({
                        "skill_id": skill_id,
                        "endorser_id": endorser_id,
                    }))
                    .send()
                    .await
                    .map_err(|e| AppError::BackendApi(e.to_string()))?
            }
            // The legacy procedure resolves the skill itself, so no lookup
            // round trip on this path
            MutationStyle::Rpc => self
                .post(&format!("rpc/{}", rpc::ENDORSE_SKILL))
                .json(&serde_json::json!({
                    "target_user_id": target_user_id,
                    "skill_name": skill_name,
                    "endorser_id": endorser_id,
                }))
                .send()
                .await
                .map_err(|e| AppError::BackendApi(e.to_string()))?,
        };

        self.check_response(response).await
    }

    async fn insert_connection_pair(&self, a: &str, b: &str) -> Result<()> {
        // Both directed rows in one insert so the relation is symmetric
        let response = self
            .post(tables::CONNECTIONS)
            .json(&serde_json::json!([
                { "user1_id": a, "user2_id": b },
                { "user1_id": b, "user2_id": a },
            ]))
            .send()
            .await
            .map_err(|e| AppError::BackendApi(e.to_string()))?;

        self.check_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_filter() {
        let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(RestBackend::in_filter(&ids), "in.(a,b,c)");
        assert_eq!(RestBackend::in_filter(&[]), "in.()");
    }

    #[test]
    fn test_conflict_code_in_error_body() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"code":"23505","message":"duplicate key value"}"#)
                .expect("error body should parse");
        assert_eq!(body.code.as_deref(), Some(UNIQUE_VIOLATION));
        assert_eq!(body.message.as_deref(), Some("duplicate key value"));
    }
}
