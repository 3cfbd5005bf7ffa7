//! Common test utilities for orchestrator tests.

use std::rc::Rc;

pub use crate::test_helpers::*;
use crate::{
    Result,
    change_builder::DependencyChangeBuilder,
    checker::UpdateCheckerFactory,
    job::{Job, JobBuilder},
    local::{
        LiteralChangeBuilder, LogService, RegistryEntry, ServiceEvent,
        StaticCheckerFactory,
    },
    orchestrator::{Orchestrator, RunSummary, context::StrategyContext},
    service::{Service, ServiceManager},
    snapshot::{DependencySnapshot, DirectorySnapshot},
};

pub const BASE_COMMIT_SHA: &str = "abc123";

/// Job builder preset with an id and package manager.
///
/// # Example
/// ```ignore
/// let job = create_test_job_builder().security_updates_only(true).build().unwrap();
/// ```
pub fn create_test_job_builder() -> JobBuilder {
    let mut builder = Job::builder();
    builder.id("test-job").package_manager("cargo");
    builder
}

pub fn create_test_snapshot(
    job: &Rc<Job>,
    directories: Vec<DirectorySnapshot>,
) -> DependencySnapshot {
    DependencySnapshot::new(Rc::clone(job), BASE_COMMIT_SHA, directories)
        .unwrap()
}

/// Creates a test Orchestrator answering from `registry`. Files are
/// rewritten by the literal change builder.
pub fn create_test_orchestrator(
    job: &Rc<Job>,
    service: impl Service + 'static,
    registry: Vec<RegistryEntry>,
) -> Orchestrator {
    let checkers: Rc<dyn UpdateCheckerFactory> =
        Rc::new(StaticCheckerFactory::new(registry));

    create_test_orchestrator_with_checkers(job, service, checkers)
}

/// Creates a test Orchestrator with a custom checker factory, typically a
/// mock.
pub fn create_test_orchestrator_with_checkers(
    job: &Rc<Job>,
    service: impl Service + 'static,
    checkers: Rc<dyn UpdateCheckerFactory>,
) -> Orchestrator {
    let change_builder: Rc<dyn DependencyChangeBuilder> =
        Rc::new(LiteralChangeBuilder::new());

    Orchestrator::builder()
        .job(Rc::clone(job))
        .service(Rc::new(ServiceManager::new(Box::new(service))))
        .checkers(checkers)
        .change_builder(change_builder)
        .build()
        .unwrap()
}

/// Strategy context for driving building blocks such as the group
/// orchestrator directly.
pub fn create_test_context(
    job: &Rc<Job>,
    service: impl Service + 'static,
    registry: Vec<RegistryEntry>,
) -> StrategyContext {
    StrategyContext::new(
        Rc::clone(job),
        Rc::new(ServiceManager::new(Box::new(service))),
        Rc::new(StaticCheckerFactory::new(registry)),
        Rc::new(LiteralChangeBuilder::new()),
    )
}

/// Runs `job` against `snapshot` with a recording service and returns the
/// outcome together with every service call made.
pub async fn run_recorded(
    job: &Rc<Job>,
    snapshot: &mut DependencySnapshot,
    registry: Vec<RegistryEntry>,
) -> (Result<RunSummary>, Vec<ServiceEvent>) {
    let service = LogService::new();
    let orchestrator = create_test_orchestrator(job, service.clone(), registry);

    let result = orchestrator.run(snapshot).await;

    (result, service.events().await)
}

/// Create, update and close calls among `events`.
pub fn pull_request_events(events: &[ServiceEvent]) -> Vec<&ServiceEvent> {
    events
        .iter()
        .filter(|e| {
            matches!(
                e,
                ServiceEvent::CreatePullRequest { .. }
                    | ServiceEvent::UpdatePullRequest { .. }
                    | ServiceEvent::ClosePullRequest { .. }
            )
        })
        .collect()
}

/// Error types recorded among `events`, in order.
pub fn recorded_error_types(events: &[ServiceEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            ServiceEvent::RecordUpdateJobError(error) => {
                Some(error.error_type.clone())
            }
            _ => None,
        })
        .collect()
}

/// Dependency names of every created pull request, sorted per pull
/// request.
pub fn created_pull_requests(events: &[ServiceEvent]) -> Vec<Vec<String>> {
    events
        .iter()
        .filter_map(|e| match e {
            ServiceEvent::CreatePullRequest { dependencies, .. } => {
                let mut names = dependencies.clone();
                names.sort();
                Some(names)
            }
            _ => None,
        })
        .collect()
}
