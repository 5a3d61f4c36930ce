//! `ProjectIQ`: project boards with derived project status.
//!
//! This crate holds the business core behind a kanban-style project tracker.
//! Tasks sit in status columns and are ordered by position; a project's
//! status is never edited directly but derived from its tasks.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence
//! - **Adapters**: In-memory and `PostgreSQL` implementations of the ports
//! - **Services**: Orchestration over the ports
//!
//! # Modules
//!
//! - [`project`]: Projects, status derivation and reconciliation
//! - [`task`]: Tasks, board placement and transactional bulk reordering
//! - [`config`]: Environment-driven configuration
//! - [`database`]: Connection pool construction
//! - [`telemetry`]: Tracing subscriber setup

pub mod config;
pub mod database;
pub mod project;
pub mod task;
pub mod telemetry;
