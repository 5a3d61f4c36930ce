//! Application services for project metadata and status reconciliation.

mod management;
mod reconciler;

pub use management::{
    CreateProjectRequest, ProjectService, ProjectServiceError, ProjectServiceResult,
    UpdateProjectRequest,
};
pub use reconciler::{ProjectStatusReconciler, ReconcileError, ReconciliationReport};
