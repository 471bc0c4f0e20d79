// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

mod common;

use common::{profile_row, seeded_backend, service};
use innovation_engine::db::{Backend, MutationStyle};

#[tokio::test]
async fn test_get_user_assembles_skills_and_endorsers() {
    common::init_tracing();
    let backend = seeded_backend(MutationStyle::Rows);
    let profiles = service(backend);

    let asha = profiles
        .get_user_by_id("u-asha")
        .await
        .expect("fetch should succeed")
        .expect("profile should exist");

    assert_eq!(asha.full_name, "Asha Rao");
    assert_eq!(asha.headline, "Asha Rao headline");
    // Nullable bio column becomes an empty string
    assert_eq!(asha.bio, "");

    let skill_names: Vec<&str> = asha.skills.iter().map(|s| s.skill.as_str()).collect();
    assert_eq!(skill_names, vec!["Rust", "Product Strategy"]);

    let rust = asha.skills.iter().find(|s| s.skill == "Rust").unwrap();
    assert_eq!(rust.endorsed_by.len(), 1);
    assert_eq!(rust.endorsed_by[0].id, "u-tomas");
    assert_eq!(rust.endorsed_by[0].full_name, "Tomás Lima");
}

#[tokio::test]
async fn test_skill_without_endorsements_yields_empty_list() {
    let backend = seeded_backend(MutationStyle::Rows);
    let profiles = service(backend);

    let tomas = profiles
        .get_user_by_id("u-tomas")
        .await
        .unwrap()
        .expect("profile should exist");

    // The double omits the endorsements collection entirely for this skill;
    // assembly must still yield an empty endorser list
    assert_eq!(tomas.skills.len(), 1);
    assert_eq!(tomas.skills[0].skill, "Design");
    assert!(tomas.skills[0].endorsed_by.is_empty());
}

#[tokio::test]
async fn test_orphaned_endorsement_is_excluded() {
    let backend = seeded_backend(MutationStyle::Rows);

    // Endorser without a profile row: the join comes back unresolved
    let design_id = backend
        .find_skill_id("u-tomas", "Design")
        .await
        .unwrap()
        .expect("fixture skill");
    backend.seed_endorsement(&design_id, "u-deleted");

    let profiles = service(backend);
    let tomas = profiles.get_user_by_id("u-tomas").await.unwrap().unwrap();

    assert!(tomas.skills[0].endorsed_by.is_empty());
}

#[tokio::test]
async fn test_missing_profile_is_none() {
    let backend = seeded_backend(MutationStyle::Rows);
    let profiles = service(backend);

    let missing = profiles.get_user_by_id("u-nobody").await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_connections_are_identifiers_only() {
    let backend = seeded_backend(MutationStyle::Rows);
    let profiles = service(backend.clone());

    profiles
        .send_connection_request("u-asha", "u-lin")
        .await
        .unwrap();

    let asha = profiles.get_user_by_id("u-asha").await.unwrap().unwrap();
    assert_eq!(asha.connections, vec!["u-lin".to_string()]);
}

#[tokio::test]
async fn test_profile_update_round_trip() {
    let backend = seeded_backend(MutationStyle::Rows);
    let profiles = service(backend);

    profiles
        .update_profile(
            "u-lin",
            innovation_engine::models::ProfileUpdate {
                headline: Some("CTO in search of a CEO".to_string()),
                bio: Some("Distributed systems, ten years".to_string()),
            },
        )
        .await
        .unwrap();

    let lin = profiles.get_user_by_id("u-lin").await.unwrap().unwrap();
    assert_eq!(lin.headline, "CTO in search of a CEO");
    assert_eq!(lin.bio, "Distributed systems, ten years");
}

#[tokio::test]
async fn test_update_unknown_profile_propagates_not_found() {
    let backend = seeded_backend(MutationStyle::Rows);
    let profiles = service(backend);

    let err = profiles
        .update_profile(
            "u-nobody",
            innovation_engine::models::ProfileUpdate {
                headline: Some("x".to_string()),
                bio: None,
            },
        )
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_profiles_are_rebuilt_on_every_fetch() {
    let backend = seeded_backend(MutationStyle::Rows);
    let profiles = service(backend.clone());

    let before = profiles.get_user_by_id("u-lin").await.unwrap().unwrap();
    assert!(before.skills.is_empty());

    backend.seed_profile(profile_row("u-lin", "Lin Wei"));
    backend.seed_skill("u-lin", "Fundraising");

    let after = profiles.get_user_by_id("u-lin").await.unwrap().unwrap();
    assert_eq!(after.skills.len(), 1);
}
