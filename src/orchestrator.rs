//! Selects the update strategy for a job, runs it and relays the outcome
//! to the service.
use derive_builder::Builder;
use log::*;
use serde::Serialize;
use std::rc::Rc;

use crate::{
    Result, UpdaterError,
    change::DependencyChange,
    change_builder::DependencyChangeBuilder,
    checker::UpdateCheckerFactory,
    job::Job,
    orchestrator::{
        context::StrategyContext,
        registry::{StrategyKind, StrategyRegistry},
        strategy::Strategy,
    },
    service::ServiceManager,
    snapshot::DependencySnapshot,
};

pub mod batch;
pub mod context;
pub mod directory;
pub mod group;
pub mod registry;
pub mod steps;
pub mod strategies;
pub mod strategy;

/// What a run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub strategy: String,
    /// Changes submitted as new or updated pull requests
    pub changes: Vec<DependencyChange>,
}

#[derive(Builder)]
#[builder(setter(into), build_fn(private, name = "_build"))]
pub struct OrchestratorParams {
    pub job: Rc<Job>,
    pub service: Rc<ServiceManager>,
    pub checkers: Rc<dyn UpdateCheckerFactory>,
    pub change_builder: Rc<dyn DependencyChangeBuilder>,
}

impl OrchestratorParamsBuilder {
    pub fn build(&self) -> Result<Orchestrator> {
        let params = self._build().map_err(|e| {
            UpdaterError::invalid_config(format!(
                "Failed to build orchestrator: {}",
                e
            ))
        })?;
        Ok(Orchestrator::new(params))
    }
}

pub struct Orchestrator {
    ctx: StrategyContext,
}

impl Orchestrator {
    pub fn builder() -> OrchestratorParamsBuilder {
        OrchestratorParamsBuilder::default()
    }

    pub fn new(params: OrchestratorParams) -> Self {
        Self {
            ctx: StrategyContext::new(
                params.job,
                params.service,
                params.checkers,
                params.change_builder,
            ),
        }
    }

    pub fn job(&self) -> &Job {
        &self.ctx.job
    }

    /// The strategy this orchestrator's job selects.
    pub fn strategy(&self) -> Option<StrategyKind> {
        StrategyRegistry::select(&self.ctx.job)
    }

    /// Runs the selected strategy against `snapshot`.
    ///
    /// Failures inside a strategy are reported and swallowed, with two
    /// exceptions that are returned: a job no strategy applies to, and the
    /// all-versions-ignored signal of a strict job.
    pub async fn run(
        &self,
        snapshot: &mut DependencySnapshot,
    ) -> Result<RunSummary> {
        let job = &self.ctx.job;

        let matching = StrategyRegistry::matching(job);
        // The current predicates are mutually exclusive. Priority order
        // only decides once an added strategy overlaps an existing one.
        if matching.len() > 1 {
            warn!(
                "job {} matches several strategies {:?}, using {}",
                job.id, matching, matching[0]
            );
        }

        let Some(kind) = matching.first().copied() else {
            let error = UpdaterError::NoStrategy {
                job_id: job.id.clone(),
            };
            error!("{error}");
            self.ctx.capture_exception(&error).await;
            return Err(error);
        };

        info!("job {}: running {kind}", job.id);

        let strategy = Strategy::new(kind, self.ctx.clone());

        let changes = match strategy.perform(snapshot).await {
            Ok(changes) => changes,
            Err(e @ UpdaterError::AllVersionsIgnored { .. }) => {
                self.ctx.error_handler.handle_job_error(&e, None).await;
                return Err(e);
            }
            Err(e) => {
                error!("{kind} failed: {e}");
                self.ctx.error_handler.handle_job_error(&e, None).await;
                vec![]
            }
        };

        info!(
            "job {}: {kind} submitted {} pull request(s)",
            job.id,
            changes.len()
        );

        Ok(RunSummary {
            strategy: kind.to_string(),
            changes,
        })
    }
}
