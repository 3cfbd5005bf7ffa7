//! Error types for depbump.

use thiserror::Error;

/// Main error type for orchestration and collaborator operations.
#[derive(Error, Debug)]
pub enum UpdaterError {
    // Configuration defects
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No update strategy applies to job {job_id}")]
    NoStrategy { job_id: String },

    #[error("Dependency group '{0}' is not present in the update config")]
    GroupNotFound(String),

    // Dependency file errors
    #[error("Dependency file not found: {0}")]
    DependencyFileNotFound(String),

    #[error("Dependency file not resolvable: {0}")]
    DependencyFileNotResolvable(String),

    // Registry errors
    #[error("Inconsistent registry response: {0}")]
    InconsistentRegistryResponse(String),

    #[error("Authentication failed for private source: {0}")]
    PrivateSourceAuthenticationFailure(String),

    #[error("Private source timed out: {0}")]
    PrivateSourceTimedOut(String),

    #[error("Git dependencies not reachable: {}", .0.join(", "))]
    GitDependenciesNotReachable(Vec<String>),

    #[error("All updates for {dependency} were ignored")]
    AllVersionsIgnored { dependency: String },

    // Service/transport errors
    #[error("Service operation failed: {0}")]
    ServiceError(String),

    #[error("Fixture parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Regular expression error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] log::SetLoggerError),

    // Generic wrapper for other errors
    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Result type alias using UpdaterError
pub type Result<T> = std::result::Result<T, UpdaterError>;

impl UpdaterError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a service error with context
    pub fn service(msg: impl Into<String>) -> Self {
        Self::ServiceError(msg.into())
    }

    /// Create an all-versions-ignored signal for a dependency
    pub fn all_versions_ignored(dependency: impl Into<String>) -> Self {
        Self::AllVersionsIgnored {
            dependency: dependency.into(),
        }
    }

    /// Errors that describe a broken job definition rather than a failed
    /// update.
    pub fn is_configuration_defect(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_)
                | Self::NoStrategy { .. }
                | Self::GroupNotFound(_)
        )
    }
}

impl From<std::io::Error> for UpdaterError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(color_eyre::Report::from(err))
    }
}

impl From<derive_builder::UninitializedFieldError> for UpdaterError {
    fn from(err: derive_builder::UninitializedFieldError) -> Self {
        Self::invalid_config(err.to_string())
    }
}
