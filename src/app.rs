// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session-gated page routing.
//!
//! The router owns the only copies of the mirrored session and the current
//! page. The session is updated exclusively through one auth-subscription
//! callback; nothing else mutates it.

use std::sync::{Arc, Mutex};

use crate::models::{AuthEvent, Session};
use crate::services::auth::{AuthService, AuthSubscription};

/// Resolved page state.
///
/// `Profile` always carries its target user id; a profile view without a
/// target is unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Auth,
    Home,
    Profile { user_id: String },
    MyProfile,
}

/// Navigation request as issued by the UI, where the target id is still
/// optional. Resolution applies the profile-requires-target guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    Auth,
    Home,
    Profile(Option<String>),
    MyProfile,
}

/// Page state machine over {Auth, Home, Profile, MyProfile}.
#[derive(Debug)]
pub struct Router {
    session: Option<Session>,
    page: Page,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self {
            session: None,
            page: Page::Auth,
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Explicit navigation.
    ///
    /// An unauthenticated router stays on `Auth`. A `Profile` request with no
    /// target id resolves to `Home`.
    pub fn navigate(&mut self, request: PageRequest) {
        if self.session.is_none() {
            self.page = Page::Auth;
            return;
        }

        self.page = match request {
            PageRequest::Auth => Page::Auth,
            PageRequest::Home => Page::Home,
            PageRequest::MyProfile => Page::MyProfile,
            PageRequest::Profile(Some(user_id)) => Page::Profile { user_id },
            PageRequest::Profile(None) => {
                tracing::warn!("Profile navigation without a user id, redirecting to Home");
                Page::Home
            }
        };
    }

    /// Consume one session transition from the auth subscription.
    ///
    /// Losing the session forces `Auth` and clears any viewing target.
    /// Gaining a session while on `Auth` moves to `Home`, but never overrides
    /// a different in-progress page.
    pub fn handle_auth_change(&mut self, event: AuthEvent, session: Option<Session>) {
        tracing::debug!(?event, signed_in = session.is_some(), "Session transition");
        self.session = session;

        match self.session {
            Some(_) => {
                if self.page == Page::Auth {
                    self.page = Page::Home;
                }
            }
            None => {
                self.page = Page::Auth;
            }
        }
    }
}

/// Wire a shared router to the auth gateway.
///
/// The returned subscription is the router's scoped resource: dropping it
/// (router teardown) stops session updates.
pub fn bind_router(auth: &AuthService, router: Arc<Mutex<Router>>) -> AuthSubscription {
    auth.subscribe(move |event, session| {
        router
            .lock()
            .expect("router lock poisoned")
            .handle_auth_change(event, session.cloned());
    })
}
