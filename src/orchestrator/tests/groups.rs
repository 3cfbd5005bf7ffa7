//! Tests for grouped version updates.
//!
//! Tests for:
//! - Group members being handled whether the group succeeds or fails
//! - Skipping groups that already have an open pull request
//! - Members declined by update-type rules falling back to individual
//!   pull requests

use std::rc::Rc;

use super::common::*;
use crate::{
    UpdaterError,
    checker::MockUpdateCheckerFactory,
    job::{
        AppliesTo, ExistingGroupPullRequest, GroupConfig, GroupRules, Job,
        PullRequestDependency, UpdateType,
    },
    local::{LiteralChangeBuilder, ServiceEvent},
    orchestrator::{
        context::StrategyContext, directory::HandledPolicy,
        group::GroupOrchestrator,
    },
    service::{MockService, ServiceManager},
    snapshot::DependencySnapshot,
};

fn frontend_group(update_types: Vec<UpdateType>) -> GroupConfig {
    GroupConfig::new("frontend", AppliesTo::VersionUpdates).with_rules(
        GroupRules {
            patterns: vec!["react*".into()],
            update_types,
            ..GroupRules::default()
        },
    )
}

fn grouped_job() -> Rc<Job> {
    Rc::new(
        create_test_job_builder()
            .dependency_groups(vec![frontend_group(vec![])])
            .build()
            .unwrap(),
    )
}

fn grouped_snapshot(job: &Rc<Job>) -> DependencySnapshot {
    create_test_snapshot(
        job,
        vec![create_test_directory(
            "/",
            vec![
                create_test_dependency("react", "18.0.0"),
                create_test_dependency("react-dom", "18.0.0"),
                create_test_dependency("serde", "1.0.0"),
            ],
        )],
    )
}

fn assert_only_group_handled(snapshot: &DependencySnapshot) {
    assert!(snapshot.is_handled("react"));
    assert!(snapshot.is_handled("react-dom"));
    assert!(!snapshot.is_handled("serde"));
}

#[tokio::test]
async fn group_members_are_handled_after_submission() {
    let job = grouped_job();

    let mut mock_service = MockService::new();
    mock_service
        .expect_create_pull_request()
        .withf(|change, _| {
            change.group.as_deref() == Some("frontend")
                && change.updated_dependency_names().len() == 2
        })
        .times(1)
        .returning(|_, _| Ok(()));

    let ctx = create_test_context(
        &job,
        mock_service,
        vec![
            create_test_registry_entry("react", &["18.3.0"]),
            create_test_registry_entry("react-dom", &["18.3.0"]),
            create_test_registry_entry("serde", &["1.1.0"]),
        ],
    );
    let mut snapshot = grouped_snapshot(&job);

    let submitted = GroupOrchestrator::new(&ctx, HandledPolicy::Keep)
        .run(&mut snapshot)
        .await
        .unwrap();

    assert_eq!(submitted.len(), 1);
    assert_only_group_handled(&snapshot);
}

#[tokio::test]
async fn group_members_are_handled_when_submission_fails() {
    let job = grouped_job();

    let mut mock_service = MockService::new();
    mock_service
        .expect_create_pull_request()
        .times(1)
        .returning(|_, _| Err(UpdaterError::service("backend unavailable")));
    mock_service
        .expect_capture_exception()
        .times(1)
        .returning(|_, _| Ok(()));
    mock_service
        .expect_record_update_job_error()
        .withf(|e| {
            e.error_type == "unknown_error"
                && e.details["dependency-group"] == "frontend"
        })
        .times(1)
        .returning(|_| Ok(()));

    let ctx = create_test_context(
        &job,
        mock_service,
        vec![
            create_test_registry_entry("react", &["18.3.0"]),
            create_test_registry_entry("react-dom", &["18.3.0"]),
        ],
    );
    let mut snapshot = grouped_snapshot(&job);

    let submitted = GroupOrchestrator::new(&ctx, HandledPolicy::Keep)
        .run(&mut snapshot)
        .await
        .unwrap();

    assert!(submitted.is_empty());
    assert_only_group_handled(&snapshot);
}

#[tokio::test]
async fn group_members_are_handled_when_checks_fail() {
    let job = grouped_job();

    let mut mock_checkers = MockUpdateCheckerFactory::new();
    mock_checkers
        .expect_checker_for()
        .returning(|_, _, _| {
            Err(UpdaterError::PrivateSourceTimedOut("registry.example".into()))
        });

    let mut mock_service = MockService::new();
    mock_service
        .expect_record_update_job_error()
        .withf(|e| e.error_type == "private_source_timed_out")
        .times(2)
        .returning(|_| Ok(()));
    mock_service.expect_create_pull_request().times(0);

    let ctx = StrategyContext::new(
        Rc::clone(&job),
        Rc::new(ServiceManager::new(Box::new(mock_service))),
        Rc::new(mock_checkers),
        Rc::new(LiteralChangeBuilder::new()),
    );
    let mut snapshot = grouped_snapshot(&job);

    let submitted = GroupOrchestrator::new(&ctx, HandledPolicy::Keep)
        .run(&mut snapshot)
        .await
        .unwrap();

    assert!(submitted.is_empty());
    assert_only_group_handled(&snapshot);
}

#[tokio::test]
async fn grouped_dependencies_are_left_out_of_individual_pull_requests() {
    let job = grouped_job();
    let mut snapshot = grouped_snapshot(&job);

    let (result, events) = run_recorded(
        &job,
        &mut snapshot,
        vec![
            create_test_registry_entry("react", &["18.3.0"]),
            create_test_registry_entry("react-dom", &["18.3.0"]),
            create_test_registry_entry("serde", &["1.1.0"]),
        ],
    )
    .await;

    let summary = result.unwrap();
    assert_eq!(summary.strategy, "group_update_all_versions");
    assert_eq!(
        created_pull_requests(&events),
        vec![
            vec!["react".to_string(), "react-dom".to_string()],
            vec!["serde".to_string()],
        ]
    );
}

#[tokio::test]
async fn group_with_open_pull_request_is_skipped() {
    let job = Rc::new(
        create_test_job_builder()
            .dependency_groups(vec![frontend_group(vec![])])
            .existing_group_pull_requests(vec![ExistingGroupPullRequest {
                dependency_group_name: "frontend".into(),
                dependencies: vec![
                    PullRequestDependency::new("react", "18.3.0"),
                    PullRequestDependency::new("react-dom", "18.3.0"),
                ],
            }])
            .build()
            .unwrap(),
    );
    let mut snapshot = grouped_snapshot(&job);

    let (result, events) = run_recorded(
        &job,
        &mut snapshot,
        vec![
            create_test_registry_entry("react", &["18.3.0"]),
            create_test_registry_entry("react-dom", &["18.3.0"]),
            create_test_registry_entry("serde", &["1.1.0"]),
        ],
    )
    .await;

    result.unwrap();
    assert_eq!(created_pull_requests(&events), vec![vec!["serde".to_string()]]);
    assert_only_group_handled(&snapshot);
}

#[tokio::test]
async fn declined_members_get_individual_pull_requests() {
    let job = Rc::new(
        create_test_job_builder()
            .dependency_groups(vec![frontend_group(vec![
                UpdateType::Minor,
                UpdateType::Patch,
            ])])
            .build()
            .unwrap(),
    );
    let mut snapshot = grouped_snapshot(&job);

    let (result, events) = run_recorded(
        &job,
        &mut snapshot,
        vec![
            create_test_registry_entry("react", &["19.0.0"]),
            create_test_registry_entry("react-dom", &["18.3.0"]),
        ],
    )
    .await;

    result.unwrap();

    let grouped = events
        .iter()
        .filter_map(|e| match e {
            ServiceEvent::CreatePullRequest { group, .. } => group.clone(),
            _ => None,
        })
        .collect::<Vec<String>>();
    assert_eq!(grouped, vec!["frontend".to_string()]);

    assert_eq!(
        created_pull_requests(&events),
        vec![vec!["react-dom".to_string()], vec!["react".to_string()]]
    );
}
