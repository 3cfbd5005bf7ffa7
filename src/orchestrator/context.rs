use std::rc::Rc;

use crate::{
    change_builder::DependencyChangeBuilder, checker::UpdateCheckerFactory,
    error_handler::ErrorHandler, job::Job, service::ServiceManager,
};

/// Collaborators shared by every strategy of a run.
#[derive(Clone)]
pub struct StrategyContext {
    pub job: Rc<Job>,
    pub service: Rc<ServiceManager>,
    pub checkers: Rc<dyn UpdateCheckerFactory>,
    pub change_builder: Rc<dyn DependencyChangeBuilder>,
    pub error_handler: Rc<ErrorHandler>,
}

impl StrategyContext {
    pub fn new(
        job: Rc<Job>,
        service: Rc<ServiceManager>,
        checkers: Rc<dyn UpdateCheckerFactory>,
        change_builder: Rc<dyn DependencyChangeBuilder>,
    ) -> Self {
        let error_handler =
            Rc::new(ErrorHandler::new(Rc::clone(&service), Rc::clone(&job)));

        Self {
            job,
            service,
            checkers,
            change_builder,
            error_handler,
        }
    }
}

/// Result of asking a checker for the latest version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionCheck {
    /// Every candidate version is excluded by ignore conditions
    AllIgnored,
    Latest(Option<String>),
}
