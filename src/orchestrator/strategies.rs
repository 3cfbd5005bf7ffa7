//! The update strategies, one per kind of job.
pub mod create_group_security_update_pull_request;
pub mod create_security_update_pull_request;
pub mod group_update_all_versions;
pub mod refresh_group_security_update_pull_request;
pub mod refresh_group_update_pull_request;
pub mod refresh_security_update_pull_request;
pub mod refresh_version_update_pull_request;
pub mod update_all_versions;
