// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Idempotent mutation semantics, exercised against both backend variants:
//! direct row inserts and the legacy RPC procedures.

mod common;

use common::{seeded_backend, service};
use innovation_engine::db::MutationStyle;

const BOTH_STYLES: [MutationStyle; 2] = [MutationStyle::Rows, MutationStyle::Rpc];

#[tokio::test]
async fn test_add_skill_is_idempotent() {
    common::init_tracing();
    for style in BOTH_STYLES {
        let backend = seeded_backend(style);
        let profiles = service(backend);

        profiles.add_skill("u-lin", "Fundraising").await.unwrap();
        // Adding the same skill again is a no-op, not an error
        profiles.add_skill("u-lin", "Fundraising").await.unwrap();

        let lin = profiles.get_user_by_id("u-lin").await.unwrap().unwrap();
        let names: Vec<&str> = lin.skills.iter().map(|s| s.skill.as_str()).collect();
        assert_eq!(names, vec!["Fundraising"], "style {:?}", style);
    }
}

#[tokio::test]
async fn test_add_endorsement_requires_existing_skill() {
    for style in BOTH_STYLES {
        let backend = seeded_backend(style);
        let profiles = service(backend);

        let err = profiles
            .add_endorsement("u-lin", "Juggling", "u-asha")
            .await
            .unwrap_err();
        assert!(err.is_not_found(), "style {:?}", style);
    }
}

#[tokio::test]
async fn test_add_endorsement_is_idempotent() {
    for style in BOTH_STYLES {
        let backend = seeded_backend(style);
        let profiles = service(backend);

        profiles
            .add_endorsement("u-tomas", "Design", "u-asha")
            .await
            .unwrap();
        profiles
            .add_endorsement("u-tomas", "Design", "u-asha")
            .await
            .unwrap();

        let tomas = profiles.get_user_by_id("u-tomas").await.unwrap().unwrap();
        let design = tomas.skills.iter().find(|s| s.skill == "Design").unwrap();
        assert_eq!(design.endorsed_by.len(), 1, "style {:?}", style);
        assert_eq!(design.endorsed_by[0].full_name, "Asha Rao");
    }
}

#[tokio::test]
async fn test_connection_request_is_symmetric() {
    for style in BOTH_STYLES {
        let backend = seeded_backend(style);
        let profiles = service(backend);

        profiles
            .send_connection_request("u-asha", "u-tomas")
            .await
            .unwrap();

        let asha = profiles.get_user_by_id("u-asha").await.unwrap().unwrap();
        let tomas = profiles.get_user_by_id("u-tomas").await.unwrap().unwrap();

        assert!(asha.connections.contains(&"u-tomas".to_string()));
        assert!(tomas.connections.contains(&"u-asha".to_string()));
    }
}

#[tokio::test]
async fn test_duplicate_connection_request_is_swallowed() {
    for style in BOTH_STYLES {
        let backend = seeded_backend(style);
        let profiles = service(backend);

        profiles
            .send_connection_request("u-asha", "u-tomas")
            .await
            .unwrap();
        // Repeat in both directions; both are no-ops
        profiles
            .send_connection_request("u-asha", "u-tomas")
            .await
            .unwrap();
        profiles
            .send_connection_request("u-tomas", "u-asha")
            .await
            .unwrap();

        let asha = profiles.get_user_by_id("u-asha").await.unwrap().unwrap();
        assert_eq!(asha.connections, vec!["u-tomas".to_string()]);
    }
}
