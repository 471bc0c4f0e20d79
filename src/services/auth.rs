// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth gateway: thin pass-through to the managed auth service.
//!
//! Handles:
//! - Password sign-in / sign-up / sign-out
//! - Token refresh
//! - Session-change subscriptions with cancelable, idempotent handles
//!
//! The remote service owns the session; on sign-up its trigger provisions
//! the profile row asynchronously and the gateway neither waits for nor
//! verifies provisioning.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use serde::Deserialize;
use validator::Validate;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{AuthEvent, Session};

/// Auth API client.
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl AuthClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("{}/auth/v1", config.backend_url),
            anon_key: config.backend_anon_key.clone(),
        }
    }

    /// Exchange email/password for a session.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let response = self
            .http
            .post(format!("{}/token", self.base_url))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .map_err(|e| AppError::BackendApi(e.to_string()))?;

        let body: TokenResponse = self.check_response_json(response).await?;
        body.into_session()
    }

    /// Register a new account.
    ///
    /// The full name and a seeded avatar URL travel as user metadata; the
    /// backend trigger turns them into a profile row. Returns `None` when the
    /// service requires email confirmation before issuing a session.
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<Option<Session>> {
        let response = self
            .http
            .post(format!("{}/signup", self.base_url))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({
                "email": request.email,
                "password": request.password,
                "data": {
                    "full_name": request.full_name,
                    "avatar_url": format!("https://i.pravatar.cc/150?u={}", request.email),
                },
            }))
            .send()
            .await
            .map_err(|e| AppError::BackendApi(e.to_string()))?;

        let body: TokenResponse = self.check_response_json(response).await?;
        match body.access_token {
            Some(_) => body.into_session().map(Some),
            None => Ok(None),
        }
    }

    /// Invalidate the remote session.
    pub async fn sign_out(&self, access_token: &str) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/logout", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::BackendApi(e.to_string()))?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::BackendApi(format!("HTTP {}: {}", status, body)))
    }

    /// Exchange a refresh token for a fresh session.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Session> {
        let response = self
            .http
            .post(format!("{}/token", self.base_url))
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|e| AppError::BackendApi(e.to_string()))?;

        let body: TokenResponse = self.check_response_json(response).await?;
        body.into_session()
    }

    /// Check response and parse JSON body, mapping auth rejections.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            // Credential rejections come back as 400/401/422
            if matches!(status.as_u16(), 400 | 401 | 422) {
                tracing::debug!(status = %status, "Auth request rejected");
                return Err(AppError::InvalidCredentials);
            }

            return Err(AppError::BackendApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::BackendApi(format!("JSON parse error: {}", e)))
    }
}

/// Sign-up input, validated locally before the remote call.
#[derive(Debug, Clone, Validate)]
pub struct SignUpRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1))]
    pub full_name: String,
}

/// Token endpoint response. The sign-up endpoint reuses this shape but may
/// omit the token fields when email confirmation is pending.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    user: Option<TokenUser>,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: String,
    email: Option<String>,
}

impl TokenResponse {
    fn into_session(self) -> Result<Session> {
        let user = self
            .user
            .ok_or_else(|| AppError::BackendApi("token response missing user".to_string()))?;
        let access_token = self
            .access_token
            .ok_or_else(|| AppError::BackendApi("token response missing access_token".to_string()))?;

        let expires_in = self.expires_in.unwrap_or(3600);

        Ok(Session {
            user_id: user.id,
            email: user.email.unwrap_or_default(),
            access_token,
            refresh_token: self.refresh_token.unwrap_or_default(),
            expires_at: chrono::Utc::now() + chrono::Duration::seconds(expires_in),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AuthService - session mirror and change subscriptions
// ─────────────────────────────────────────────────────────────────────────────

type AuthCallback = Arc<dyn Fn(AuthEvent, Option<&Session>) + Send + Sync>;
type ListenerList = Mutex<Vec<(u64, AuthCallback)>>;

/// Auth gateway owning the in-memory session mirror.
///
/// Every session transition synchronously notifies all live subscribers with
/// `(event, session)`. Notifications unconditionally replace downstream
/// state; last notification wins.
pub struct AuthService {
    client: AuthClient,
    session: RwLock<Option<Session>>,
    listeners: Arc<ListenerList>,
    next_listener_id: AtomicU64,
}

impl AuthService {
    pub fn new(config: &Config) -> Self {
        Self {
            client: AuthClient::new(config),
            session: RwLock::new(None),
            listeners: Arc::new(Mutex::new(Vec::new())),
            next_listener_id: AtomicU64::new(0),
        }
    }

    /// The mirrored session, if signed in.
    pub fn session(&self) -> Option<Session> {
        self.session.read().expect("session lock poisoned").clone()
    }

    /// Register a session-change callback.
    ///
    /// The returned handle cancels the subscription on `unsubscribe()` or
    /// drop; cancellation is idempotent.
    pub fn subscribe<F>(&self, callback: F) -> AuthSubscription
    where
        F: Fn(AuthEvent, Option<&Session>) + Send + Sync + 'static,
    {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .expect("listener lock poisoned")
            .push((id, Arc::new(callback)));

        AuthSubscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
            active: true,
        }
    }

    /// Sign in with email/password.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let session = self.client.sign_in(email, password).await?;
        self.replace_session(AuthEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    /// Sign up a new account. Validates input locally first.
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<Option<Session>> {
        request
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let session = self.client.sign_up(&request).await?;
        if let Some(session) = &session {
            self.replace_session(AuthEvent::SignedIn, Some(session.clone()));
        }
        Ok(session)
    }

    /// Invalidate the remote session and clear the mirror.
    pub async fn sign_out(&self) -> Result<()> {
        let current = self.session();
        if let Some(session) = current {
            self.client.sign_out(&session.access_token).await?;
        }
        self.replace_session(AuthEvent::SignedOut, None);
        Ok(())
    }

    /// Refresh the access token using the stored refresh token.
    pub async fn refresh_session(&self) -> Result<Session> {
        let current = self
            .session()
            .ok_or_else(|| AppError::BadRequest("no session to refresh".to_string()))?;

        let refreshed = self.client.refresh(&current.refresh_token).await?;
        self.replace_session(AuthEvent::TokenRefreshed, Some(refreshed.clone()));
        Ok(refreshed)
    }

    /// Overwrite the mirror and notify subscribers. Every session transition
    /// routes through here, so notification order is uniform.
    #[doc(hidden)]
    pub fn replace_session(&self, event: AuthEvent, session: Option<Session>) {
        *self.session.write().expect("session lock poisoned") = session.clone();
        self.notify(event, session.as_ref());
    }

    fn notify(&self, event: AuthEvent, session: Option<&Session>) {
        // Snapshot the callbacks so a listener can unsubscribe re-entrantly
        let callbacks: Vec<AuthCallback> = self
            .listeners
            .lock()
            .expect("listener lock poisoned")
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();

        for callback in callbacks {
            callback(event, session);
        }
    }
}

/// Handle for a session-change subscription.
///
/// Dropping the handle unsubscribes, so a router teardown releases its
/// subscription automatically.
pub struct AuthSubscription {
    id: u64,
    listeners: Weak<ListenerList>,
    active: bool,
}

impl AuthSubscription {
    /// Cancel the subscription. Calling this more than once is a no-op.
    pub fn unsubscribe(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .lock()
                .expect("listener lock poisoned")
                .retain(|(id, _)| *id != self.id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
