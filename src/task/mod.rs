//! Task board management for `ProjectIQ`.
//!
//! Tasks belong to a project and sit in one status column, ordered by
//! position. Single-task edits and the transactional bulk reposition both
//! end with a reconciliation of the owning project's derived status. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
