// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use std::sync::Arc;

use innovation_engine::db::{MemoryBackend, MutationStyle};
use innovation_engine::models::ProfileRow;
use innovation_engine::services::ProfileService;

/// Initialize test logging (idempotent).
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("innovation_engine=debug")
        .with_test_writer()
        .try_init();
}

#[allow(dead_code)]
pub fn profile_row(id: &str, full_name: &str) -> ProfileRow {
    ProfileRow {
        id: id.to_string(),
        email: format!("{}@example.com", id),
        full_name: full_name.to_string(),
        headline: Some(format!("{} headline", full_name)),
        bio: None,
        avatar_url: Some(format!("https://i.pravatar.cc/150?u={}", id)),
    }
}

/// Backend seeded with the standard fixture set:
/// - `u-asha` (Asha Rao): skills Rust (endorsed by Tomás), Product Strategy
/// - `u-tomas` (Tomás Lima): skill Design
/// - `u-lin` (Lin Wei): no skills
#[allow(dead_code)]
pub fn seeded_backend(style: MutationStyle) -> Arc<MemoryBackend> {
    let backend = Arc::new(MemoryBackend::new(style));

    backend.seed_profile(profile_row("u-asha", "Asha Rao"));
    backend.seed_profile(profile_row("u-tomas", "Tomás Lima"));
    backend.seed_profile(profile_row("u-lin", "Lin Wei"));

    let rust = backend.seed_skill("u-asha", "Rust");
    backend.seed_skill("u-asha", "Product Strategy");
    backend.seed_skill("u-tomas", "Design");

    backend.seed_endorsement(&rust, "u-tomas");

    backend
}

#[allow(dead_code)]
pub fn service(backend: Arc<MemoryBackend>) -> ProfileService {
    ProfileService::new(backend)
}
