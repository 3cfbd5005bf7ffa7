use log::*;

use crate::{
    Result,
    checker::{UnlockScope, UpdateChecker},
};

/// Outcome of unlock planning for one dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum UnlockPlan {
    Unlock(UnlockScope),
    UpdateNotPossible,
}

impl UnlockPlan {
    pub fn scope(&self) -> Option<UnlockScope> {
        match self {
            Self::Unlock(scope) => Some(*scope),
            Self::UpdateNotPossible => None,
        }
    }
}

/// Picks the least invasive unlock scope an update checker accepts.
pub struct RequirementsUnlockPlanner;

impl RequirementsUnlockPlanner {
    pub async fn plan(checker: &dyn UpdateChecker) -> Result<UnlockPlan> {
        let unlockable = checker.requirements_unlocked_or_can_be().await?;

        if unlockable && checker.can_update(UnlockScope::Own).await? {
            debug!("unlock plan: own");
            return Ok(UnlockPlan::Unlock(UnlockScope::Own));
        }

        if checker.can_update(UnlockScope::All).await? {
            debug!("unlock plan: all");
            return Ok(UnlockPlan::Unlock(UnlockScope::All));
        }

        if !unlockable && checker.can_update(UnlockScope::None).await? {
            debug!("unlock plan: none");
            return Ok(UnlockPlan::Unlock(UnlockScope::None));
        }

        debug!("unlock plan: update not possible");
        Ok(UnlockPlan::UpdateNotPossible)
    }
}
