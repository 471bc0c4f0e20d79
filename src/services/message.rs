// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Generative connection-message drafting.
//!
//! Best-effort: when no API key is configured, or the remote call fails for
//! any reason, the composer returns a deterministic templated message. The
//! rest of the connection flow never blocks on this.

use serde::Deserialize;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::UserProfile;

const GENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Generative-text API client.
#[derive(Clone)]
pub struct GenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GenAiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: GENAI_BASE_URL.to_string(),
            api_key,
            model,
        }
    }

    /// Request a completion for the given prompt.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&serde_json::json!({
                "contents": [{ "parts": [{ "text": prompt }] }],
            }))
            .send()
            .await
            .map_err(|e| AppError::BackendApi(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::BackendApi(format!("HTTP {}: {}", status, body)));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::BackendApi(format!("JSON parse error: {}", e)))?;

        body.first_text()
            .ok_or_else(|| AppError::BackendApi("empty completion".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    parts: Option<Vec<Part>>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .next()?
            .text
            .filter(|t| !t.trim().is_empty())
    }
}

/// Drafts connection-request messages, falling back to a template.
pub struct MessageComposer {
    client: Option<GenAiClient>,
}

impl MessageComposer {
    pub fn new(config: &Config) -> Self {
        let client = match &config.genai_api_key {
            Some(key) => Some(GenAiClient::new(key.clone(), config.genai_model.clone())),
            None => {
                tracing::warn!("Generative-text API key not found, drafting disabled");
                None
            }
        };
        Self { client }
    }

    /// Draft a connection-request message from `sender` to `target`.
    ///
    /// Never fails: any remote error resolves to the templated fallback.
    pub async fn connection_message(&self, sender: &UserProfile, target: &UserProfile) -> String {
        let Some(client) = &self.client else {
            return fallback_message(sender, target);
        };

        match client.generate(&build_prompt(sender, target)).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Message drafting failed, using fallback");
                fallback_message(sender, target)
            }
        }
    }
}

/// Deterministic fallback embedding both first names and the target's top
/// skill (or a generic phrase when they have none).
fn fallback_message(sender: &UserProfile, target: &UserProfile) -> String {
    let field = target.top_skill().unwrap_or("your field");

    format!(
        "Hi {},\n\n\
         I came across your profile and was impressed by your skills in {}. \
         I'm passionate about building new ventures and am looking for talented \
         individuals to collaborate with.\n\n\
         Would you be open to a brief chat next week to explore potential synergies?\n\n\
         Best,\n{}",
        target.first_name(),
        field,
        sender.first_name()
    )
}

fn build_prompt(sender: &UserProfile, target: &UserProfile) -> String {
    let sender_skills: Vec<&str> = sender.skills.iter().map(|s| s.skill.as_str()).collect();
    let target_skills: Vec<&str> = target.skills.iter().map(|s| s.skill.as_str()).collect();

    format!(
        "Generate a professional and concise connection request message from {sender} to {target}.\n\
         The goal is to network and explore potential collaboration for starting a new business.\n\n\
         My Profile ({sender}):\n\
         - Headline: {sender_headline}\n\
         - Skills: {sender_skills}\n\
         - Bio: {sender_bio}\n\n\
         Their Profile ({target}):\n\
         - Headline: {target_headline}\n\
         - Skills: {target_skills}\n\n\
         The message should be friendly, mention a shared interest or a specific skill of \
         theirs that is impressive, and propose a brief chat. Keep it under 100 words.",
        sender = sender.full_name,
        target = target.full_name,
        sender_headline = sender.headline,
        sender_skills = sender_skills.join(", "),
        sender_bio = sender.bio,
        target_headline = target.headline,
        target_skills = target_skills.join(", "),
    )
}
