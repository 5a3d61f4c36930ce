//! Project management for `ProjectIQ`.
//!
//! Projects belong to an organization, carry a member list, and expose a
//! status that is derived from the statuses of their tasks. The only
//! user-direct writes are metadata edits (name, description, members); the
//! status is recomputed by [`services::ProjectStatusReconciler`] after every
//! task mutation. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
