//! Tests for security updates.
//!
//! Tests for:
//! - Creating a pull request at the lowest fixed version
//! - Reporting dependencies that are missing, not vulnerable, or cannot be
//!   fixed
//! - Reporting fixes that already have an open pull request
//! - Grouped security pull requests
//! - Closing refreshed security pull requests

use std::rc::Rc;

use super::common::*;
use crate::{
    job::{AppliesTo, GroupConfig, GroupRules, JobBuilder, SecurityAdvisory},
    local::{RegistryEntry, ServiceEvent},
    service::CloseReason,
};

fn advisory(name: &str, affected: &str) -> SecurityAdvisory {
    SecurityAdvisory {
        dependency_name: name.to_string(),
        affected_versions: vec![affected.to_string()],
        ..SecurityAdvisory::default()
    }
}

fn security_job_builder(dependencies: &[&str]) -> JobBuilder {
    let mut builder = create_test_job_builder();
    builder
        .security_updates_only(true)
        .dependencies(
            dependencies
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<String>>(),
        )
        .security_advisories(vec![
            advisory("lodash", "<4.17.21"),
            advisory("axios", "<1.6.0"),
        ]);
    builder
}

fn lodash_registry() -> Vec<RegistryEntry> {
    vec![create_test_registry_entry(
        "lodash",
        &["4.17.20", "4.17.21", "4.17.22"],
    )]
}

fn lodash_directory(version: &str) -> Vec<crate::snapshot::DirectorySnapshot> {
    vec![create_test_directory(
        "/",
        vec![
            create_test_dependency("lodash", version),
            create_test_dependency("serde", "1.0.0"),
        ],
    )]
}

fn closed_with(events: &[ServiceEvent]) -> Vec<CloseReason> {
    events
        .iter()
        .filter_map(|e| match e {
            ServiceEvent::ClosePullRequest { reason, .. } => Some(*reason),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn vulnerable_dependency_moves_to_lowest_fix() {
    let job = Rc::new(security_job_builder(&["lodash"]).build().unwrap());
    let mut snapshot = create_test_snapshot(&job, lodash_directory("4.17.20"));

    let (result, events) =
        run_recorded(&job, &mut snapshot, lodash_registry()).await;

    let summary = result.unwrap();
    assert_eq!(summary.strategy, "create_security_update_pull_request");
    assert_eq!(summary.changes.len(), 1);
    assert_eq!(
        summary.changes[0].updated_dependencies[0].version(),
        Some("4.17.21")
    );
    assert_eq!(created_pull_requests(&events), vec![vec!["lodash".to_string()]]);
    assert!(recorded_error_types(&events).is_empty());
}

#[tokio::test]
async fn missing_dependency_is_reported() {
    let job = Rc::new(security_job_builder(&["lodash"]).build().unwrap());
    let mut snapshot = create_test_snapshot(
        &job,
        vec![create_test_directory(
            "/",
            vec![create_test_dependency("serde", "1.0.0")],
        )],
    );

    let (result, events) =
        run_recorded(&job, &mut snapshot, lodash_registry()).await;

    result.unwrap();
    assert_eq!(
        recorded_error_types(&events),
        vec!["security_update_dependency_not_found"]
    );
    assert!(pull_request_events(&events).is_empty());
}

#[tokio::test]
async fn patched_dependency_is_reported_as_not_needed() {
    let job = Rc::new(security_job_builder(&["lodash"]).build().unwrap());
    let mut snapshot = create_test_snapshot(&job, lodash_directory("4.17.21"));

    let (result, events) =
        run_recorded(&job, &mut snapshot, lodash_registry()).await;

    result.unwrap();
    assert_eq!(
        recorded_error_types(&events),
        vec!["security_update_not_needed"]
    );
    assert!(pull_request_events(&events).is_empty());
}

#[tokio::test]
async fn unresolvable_fix_is_reported_with_details() {
    let job = Rc::new(security_job_builder(&["lodash"]).build().unwrap());
    let mut snapshot = create_test_snapshot(&job, lodash_directory("4.17.20"));

    let registry = vec![RegistryEntry {
        resolvable: false,
        conflicting_dependencies: vec!["express".into()],
        ..create_test_registry_entry("lodash", &["4.17.21"])
    }];

    let (result, events) = run_recorded(&job, &mut snapshot, registry).await;
    result.unwrap();

    let details = events
        .iter()
        .find_map(|e| match e {
            ServiceEvent::RecordUpdateJobError(error)
                if error.error_type == "security_update_not_possible" =>
            {
                Some(error.details.clone())
            }
            _ => None,
        })
        .unwrap();

    assert_eq!(details["dependency-name"], "lodash");
    assert_eq!(details["latest-resolvable-version"], "4.17.20");
    assert_eq!(details["lowest-non-vulnerable-version"], "4.17.21");
    assert_eq!(details["conflicting-dependencies"][0], "express");
    assert!(pull_request_events(&events).is_empty());
}

#[tokio::test]
async fn open_pull_request_for_fix_is_reported() {
    let job = Rc::new(
        security_job_builder(&["lodash"])
            .existing_pull_requests(vec![create_test_existing_pr(&[(
                "lodash", "4.17.21",
            )])])
            .build()
            .unwrap(),
    );
    let mut snapshot = create_test_snapshot(&job, lodash_directory("4.17.20"));

    let (result, events) =
        run_recorded(&job, &mut snapshot, lodash_registry()).await;

    result.unwrap();
    assert_eq!(
        recorded_error_types(&events),
        vec!["pull_request_exists_for_security_update"]
    );
    assert!(pull_request_events(&events).is_empty());
}

#[tokio::test]
async fn grouped_security_updates_share_one_pull_request() {
    let job = Rc::new(
        security_job_builder(&["lodash", "axios"])
            .dependency_groups(vec![
                GroupConfig::new("security", AppliesTo::SecurityUpdates)
                    .with_rules(GroupRules {
                        patterns: vec!["*".into()],
                        ..GroupRules::default()
                    }),
            ])
            .build()
            .unwrap(),
    );
    let mut snapshot = create_test_snapshot(
        &job,
        vec![create_test_directory(
            "/",
            vec![
                create_test_dependency("lodash", "4.17.20"),
                create_test_dependency("axios", "1.5.0"),
            ],
        )],
    );

    let mut registry = lodash_registry();
    registry.push(create_test_registry_entry("axios", &["1.6.0", "1.7.0"]));

    let (result, events) = run_recorded(&job, &mut snapshot, registry).await;

    let summary = result.unwrap();
    assert_eq!(
        summary.strategy,
        "create_group_security_update_pull_request"
    );
    assert_eq!(summary.changes.len(), 1);
    assert_eq!(summary.changes[0].group.as_deref(), Some("security"));
    assert_eq!(
        created_pull_requests(&events),
        vec![vec!["axios".to_string(), "lodash".to_string()]]
    );
}

#[tokio::test]
async fn grouped_security_member_not_vulnerable_is_reported() {
    let job = Rc::new(
        security_job_builder(&["lodash", "axios"])
            .directories(["/", "/web"])
            .build()
            .unwrap(),
    );
    let mut snapshot = create_test_snapshot(
        &job,
        vec![
            create_test_directory(
                "/",
                vec![create_test_dependency("lodash", "4.17.20")],
            ),
            create_test_directory(
                "/web",
                vec![create_test_dependency("axios", "1.6.0")],
            ),
        ],
    );

    let mut registry = lodash_registry();
    registry.push(create_test_registry_entry("axios", &["1.6.0", "1.7.0"]));

    let (result, events) = run_recorded(&job, &mut snapshot, registry).await;

    let summary = result.unwrap();
    assert_eq!(summary.changes.len(), 1);
    assert_eq!(summary.changes[0].group, None);
    assert_eq!(
        recorded_error_types(&events),
        vec!["security_update_not_needed"]
    );
    assert_eq!(created_pull_requests(&events), vec![vec!["lodash".to_string()]]);
}

fn refresh_job(version: &str) -> Rc<crate::job::Job> {
    Rc::new(
        security_job_builder(&["lodash"])
            .updating_a_pull_request(true)
            .existing_pull_requests(vec![create_test_existing_pr(&[(
                "lodash", version,
            )])])
            .build()
            .unwrap(),
    )
}

#[tokio::test]
async fn refresh_closes_when_dependency_is_removed() {
    let job = refresh_job("4.17.21");
    let mut snapshot = create_test_snapshot(
        &job,
        vec![create_test_directory(
            "/",
            vec![create_test_dependency("serde", "1.0.0")],
        )],
    );

    let (result, events) =
        run_recorded(&job, &mut snapshot, lodash_registry()).await;

    assert_eq!(
        result.unwrap().strategy,
        "refresh_security_update_pull_request"
    );
    assert_eq!(closed_with(&events), vec![CloseReason::DependencyRemoved]);
}

#[tokio::test]
async fn refresh_closes_when_no_longer_vulnerable() {
    let job = refresh_job("4.17.21");
    let mut snapshot = create_test_snapshot(&job, lodash_directory("4.17.21"));

    let (result, events) =
        run_recorded(&job, &mut snapshot, lodash_registry()).await;

    result.unwrap();
    assert_eq!(closed_with(&events), vec![CloseReason::UpToDate]);
    assert!(created_pull_requests(&events).is_empty());
}

#[tokio::test]
async fn refresh_closes_when_fix_is_no_longer_possible() {
    let job = refresh_job("4.17.21");
    let mut snapshot = create_test_snapshot(&job, lodash_directory("4.17.20"));

    let registry = vec![RegistryEntry {
        resolvable: false,
        ..create_test_registry_entry("lodash", &["4.17.21"])
    }];

    let (result, events) = run_recorded(&job, &mut snapshot, registry).await;

    result.unwrap();
    assert_eq!(
        closed_with(&events),
        vec![CloseReason::UpdateNoLongerPossible]
    );
}

#[tokio::test]
async fn refresh_with_unchanged_fix_makes_no_calls() {
    let job = refresh_job("4.17.21");
    let mut snapshot = create_test_snapshot(&job, lodash_directory("4.17.20"));

    let (result, events) =
        run_recorded(&job, &mut snapshot, lodash_registry()).await;

    result.unwrap();
    assert!(pull_request_events(&events).is_empty());
}
