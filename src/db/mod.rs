//! Backend collaborator layer.
//!
//! The managed backend owns storage, auth, row-level security, and the two
//! legacy RPC functions. This module defines the typed surface the services
//! consume, the REST implementation, and an in-memory double for tests and
//! offline use.

pub mod backend;
pub mod memory;
pub mod rest;

pub use backend::{Backend, MutationStyle};
pub use memory::MemoryBackend;
pub use rest::RestBackend;

/// Table names as constants.
pub mod tables {
    pub const PROFILES: &str = "profiles";
    pub const SKILLS: &str = "skills";
    pub const ENDORSEMENTS: &str = "endorsements";
    pub const CONNECTIONS: &str = "connections";
}

/// Legacy RPC function names (superseded by direct row operations, still
/// exposed by the backend for the old client).
pub mod rpc {
    pub const ADD_SKILL: &str = "add_skill";
    pub const ENDORSE_SKILL: &str = "endorse_skill";
}
