//! Domain model for projects.
//!
//! Holds the project aggregate, its validated scalar types, and the pure
//! status derivation rule applied by the reconciler.

mod error;
mod ids;
mod project;
mod status;

pub use error::{ParseProjectStatusError, ProjectDomainError};
pub use ids::{MemberId, OrganizationSlug, ProjectId, ProjectName};
pub use project::{PersistedProjectData, Project};
pub use status::{ProjectStatus, derive_project_status};
