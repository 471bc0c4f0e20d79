// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod auth;
pub mod message;
pub mod profiles;

pub use auth::{AuthService, AuthSubscription, SignUpRequest};
pub use message::MessageComposer;
pub use profiles::ProfileService;
