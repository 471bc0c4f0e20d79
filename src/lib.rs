// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Innovation Engine: co-founder matching over a managed backend
//!
//! This crate is the client core for a networking/profile app. All durable
//! state lives in an external managed backend (auth, relational storage,
//! uniqueness constraints, RPC functions); this crate assembles denormalized
//! profile views from raw backend rows, wraps the auth surface, applies
//! idempotent skill/endorsement/connection mutations, drafts connection
//! messages via an optional generative-text API, and drives page routing.

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

use std::sync::Arc;

use config::Config;
use db::{Backend, MutationStyle, RestBackend};
use services::{AuthService, AuthSubscription, MessageComposer, ProfileService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub auth: AuthService,
    pub profiles: ProfileService,
    pub composer: MessageComposer,
    /// Keeps the REST backend's bearer token following the session.
    _token_subscription: Option<AuthSubscription>,
}

impl AppState {
    /// Build the full service stack against the managed backend's REST surface.
    pub fn new(config: Config) -> Self {
        let backend = Arc::new(RestBackend::new(&config, MutationStyle::Rows));
        let mut state = Self::with_backend(config, backend.clone());

        // Row-level security on the backend keys off the signed-in user's
        // token, so the REST client follows every session transition
        state._token_subscription = Some(state.auth.subscribe(move |_, session| {
            backend.set_session_token(session.map(|s| s.access_token.clone()));
        }));

        state
    }

    /// Build the service stack over an explicit backend implementation.
    ///
    /// Used by tests to run against the in-memory double, and by the legacy
    /// deployment to select RPC-style mutations.
    pub fn with_backend(config: Config, backend: Arc<dyn Backend>) -> Self {
        let auth = AuthService::new(&config);
        let profiles = ProfileService::new(backend);
        let composer = MessageComposer::new(&config);

        Self {
            config,
            auth,
            profiles,
            composer,
            _token_subscription: None,
        }
    }
}
