//! `PostgreSQL` adapters for task board persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresTaskRepository, RepositionBudget};
