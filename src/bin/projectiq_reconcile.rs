//! Re-derives stored project statuses from their tasks.
//!
//! Usage:
//!
//! ```text
//! projectiq-reconcile [--json] project <PROJECT_ID>
//! projectiq-reconcile [--json] organization <SLUG>
//! ```
//!
//! Task writes reconcile their project after committing, so a crash in
//! between can leave a stale status behind. This tool repairs it. The
//! process exits non-zero when any reconciliation fails.

use clap::{Parser, Subcommand};
use projectiq::config::ProjectIqConfig;
use projectiq::database::build_pool;
use projectiq::project::adapters::postgres::PostgresProjectRepository;
use projectiq::project::domain::{OrganizationSlug, ProjectId, ProjectStatus};
use projectiq::project::ports::ProjectRepository;
use projectiq::project::services::{ProjectStatusReconciler, ReconciliationReport};
use projectiq::task::adapters::postgres::PostgresTaskRepository;
use projectiq::telemetry::init_tracing;
use serde::Serialize;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Parser)]
#[command(name = "projectiq-reconcile", version, about = "Re-derive project statuses")]
struct Cli {
    /// Emit one JSON object per project instead of plain text.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    target: Target,
}

#[derive(Debug, Subcommand)]
enum Target {
    /// Reconcile a single project.
    Project {
        /// Project identifier.
        id: uuid::Uuid,
    },
    /// Reconcile every project of an organization.
    Organization {
        /// Organization slug.
        slug: String,
    },
}

#[derive(Debug, Serialize)]
struct ReportLine {
    project_id: ProjectId,
    status: Option<ProjectStatus>,
    error: Option<String>,
}

impl From<&ReconciliationReport> for ReportLine {
    fn from(report: &ReconciliationReport) -> Self {
        match &report.outcome {
            Ok(status) => Self {
                project_id: report.project_id,
                status: Some(*status),
                error: None,
            },
            Err(err) => Self {
                project_id: report.project_id,
                status: None,
                error: Some(err.to_string()),
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, BoxError> {
    let cli = Cli::parse();
    init_tracing("projectiq=info")?;

    let config = ProjectIqConfig::from_env()?;
    let pool = build_pool(&config)?;
    let projects = Arc::new(PostgresProjectRepository::new(pool.clone()));
    let tasks =
        Arc::new(PostgresTaskRepository::new(pool).with_budget(config.reposition_budget));
    let reconciler = ProjectStatusReconciler::new(Arc::clone(&projects), tasks);

    let targets = match cli.target {
        Target::Project { id } => vec![ProjectId::from_uuid(id)],
        Target::Organization { slug } => {
            let organization = OrganizationSlug::new(slug)?;
            projects
                .find_by_organization(&organization)
                .await?
                .iter()
                .map(|project| project.id())
                .collect()
        }
    };
    info!(project_count = targets.len(), "reconciling projects");

    let reports = reconciler.reconcile_many(targets).await;
    write_reports(&mut io::stdout().lock(), &reports, cli.json)?;

    if reports.iter().all(ReconciliationReport::is_success) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn write_reports(
    out: &mut impl Write,
    reports: &[ReconciliationReport],
    json: bool,
) -> Result<(), BoxError> {
    for report in reports {
        let line = ReportLine::from(report);
        if json {
            writeln!(out, "{}", serde_json::to_string(&line)?)?;
        } else {
            match (line.status, line.error) {
                (Some(status), _) => writeln!(out, "{}\t{status}", line.project_id)?,
                (None, Some(error)) => writeln!(out, "{}\tFAILED\t{error}", line.project_id)?,
                (None, None) => writeln!(out, "{}\tFAILED", line.project_id)?,
            }
        }
    }
    Ok(())
}
