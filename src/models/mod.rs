// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod profile;
pub mod rows;
pub mod session;

pub use profile::{Endorser, SkillEndorsement, UserProfile};
pub use rows::{ConnectionRow, EndorsementRow, EndorserRef, ProfileRow, ProfileUpdate, SkillRow};
pub use session::{AuthEvent, Session};
