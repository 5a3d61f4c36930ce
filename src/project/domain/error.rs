//! Error types for project domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain project values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProjectDomainError {
    /// The project name is empty after trimming.
    #[error("project name must not be empty")]
    EmptyProjectName,

    /// The project name exceeds the persisted column width.
    #[error("project name exceeds {max} characters")]
    ProjectNameTooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },

    /// The organization slug is malformed.
    #[error("invalid organization slug '{0}', expected lowercase letters, digits, and dashes")]
    InvalidOrganizationSlug(String),
}

/// Error returned while parsing project statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown project status: {0}")]
pub struct ParseProjectStatusError(pub String);
