//! Runs a job against a local workspace and reports what happened.
use log::*;
use serde::Serialize;
use std::{path::Path, rc::Rc};
use tokio::fs;

use crate::{
    Result,
    change_builder::DependencyChangeBuilder,
    checker::UpdateCheckerFactory,
    cli::Args,
    job::Job,
    local::{LiteralChangeBuilder, LogService, ServiceEvent, Workspace},
    orchestrator::{Orchestrator, RunSummary},
    service::ServiceManager,
};

/// Outcome of a run as written by the binary.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub job_id: String,
    pub dry_run: bool,
    pub summary: Option<RunSummary>,
    /// Set when the run failed as a whole
    pub error: Option<String>,
    /// Calls that reached the service
    pub events: Vec<ServiceEvent>,
}

pub async fn execute(args: &Args) -> Result<()> {
    let report = run(&args.job, &args.workspace, args.dry_run()).await?;
    let failed = report.error.clone();

    let json = serde_json::json!(&report);

    if let Some(out_file) = &args.out_file {
        write_json(&json, out_file).await?;
    } else {
        println!("{}", serde_json::to_string_pretty(&json)?);
    }

    if let Some(message) = failed {
        error!("job {} failed: {message}", report.job_id);
    }

    Ok(())
}

/// Loads the job and workspace and runs the job once.
pub async fn run(
    job_path: &Path,
    workspace_path: &Path,
    dry_run: bool,
) -> Result<RunReport> {
    let job = Rc::new(Job::load(job_path).await?);
    let workspace = Workspace::load(workspace_path).await?;

    let mut snapshot = workspace.snapshot(Rc::clone(&job))?;

    let service = LogService::new();
    let manager = if dry_run {
        ServiceManager::dry_run(Box::new(service.clone()))
    } else {
        ServiceManager::new(Box::new(service.clone()))
    };

    let checkers: Rc<dyn UpdateCheckerFactory> =
        Rc::new(workspace.checker_factory());
    let change_builder: Rc<dyn DependencyChangeBuilder> =
        Rc::new(LiteralChangeBuilder::new());

    let orchestrator = Orchestrator::builder()
        .job(Rc::clone(&job))
        .service(Rc::new(manager))
        .checkers(checkers)
        .change_builder(change_builder)
        .build()?;

    let (summary, error) = match orchestrator.run(&mut snapshot).await {
        Ok(summary) => (Some(summary), None),
        Err(e) => (None, Some(e.to_string())),
    };

    Ok(RunReport {
        job_id: job.id.clone(),
        dry_run,
        summary,
        error,
        events: service.events().await,
    })
}

async fn write_json(json: &serde_json::Value, out_file: &Path) -> Result<()> {
    if let Some(parent) = out_file.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).await?;
    }

    let content = serde_json::to_string_pretty(json)?;
    info!("writing run report to: {}", out_file.display());
    fs::write(out_file, &content).await?;

    Ok(())
}
