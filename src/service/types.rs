use serde::{Deserialize, Serialize};

/// Reason attached to a pull request closure. The string forms are a
/// stable contract with the hosting backend.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CloseReason {
    DependencyRemoved,
    DependenciesChanged,
    UpToDate,
    UpdateNoLongerPossible,
    DependencyGroupEmpty,
}

/// A classified error reported for the job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JobError {
    pub error_type: String,
    pub details: serde_json::Value,
}

impl JobError {
    pub fn new(error_type: impl Into<String>, details: serde_json::Value) -> Self {
        Self {
            error_type: error_type.into(),
            details,
        }
    }
}
