use crate::support::{pending, service, temporary_store, workflow};
use filevault::store::FileCatalog;
use filevault::upload::{ResolveMode, UploadOutcome};
use filevault::workflow::{Decision, Disposition, Progress, WorkflowError, WorkflowState};

#[test]
fn batch_pauses_on_conflict_then_resolves_by_copy() {
    let store = temporary_store();
    service(&store).submit(&pending("b.txt", b"old"), None).unwrap();
    let workflow = workflow(&store);

    let state = workflow
        .start(
            WorkflowState::Idle,
            vec![
                pending("a.txt", b"a"),
                pending("b.txt", b"new"),
                pending("c.txt", b"c"),
            ],
        )
        .unwrap();

    match &state {
        WorkflowState::AwaitingDecision { conflict, run } => {
            assert_eq!(conflict.target_path, "b.txt");
            assert_eq!(
                run.progress,
                Progress {
                    current: 2,
                    total: 3
                }
            );
            assert_eq!(run.remaining.len(), 1);
        }
        other => panic!("expected a paused batch, got {}", other.name()),
    }
    // a.txt was committed before the pause
    assert!(store.find_by_path("a.txt").unwrap().is_some());
    assert!(store.find_by_path("c.txt").unwrap().is_none());

    let state = workflow
        .apply(state, Decision::Resolve(ResolveMode::Copy))
        .unwrap();
    assert!(matches!(state, WorkflowState::Completed { .. }));
    let summary = state.summary();
    assert_eq!((summary.created, summary.copied), (2, 1));

    let paths: Vec<String> = store
        .list_all_with_versions()
        .unwrap()
        .into_iter()
        .map(|f| f.path)
        .collect();
    assert_eq!(paths, vec!["b.txt", "a.txt", "b (1).txt", "c.txt"]);
}

#[test]
fn replace_decision_appends_to_the_existing_file() {
    let store = temporary_store();
    service(&store).submit(&pending("x.txt", b"one"), None).unwrap();
    let workflow = workflow(&store);

    let state = workflow
        .start(WorkflowState::Idle, vec![pending("x.txt", b"two")])
        .unwrap();
    let state = workflow
        .apply(state, Decision::Resolve(ResolveMode::Replace))
        .unwrap();

    assert!(matches!(
        state.processed()[0].disposition,
        Disposition::Stored(UploadOutcome::Replaced { .. })
    ));
    let files = store.list_all_with_versions().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].versions.len(), 2);
}

#[test]
fn skip_leaves_the_catalog_untouched_and_continues() {
    let store = temporary_store();
    service(&store).submit(&pending("x.txt", b"one"), None).unwrap();
    let workflow = workflow(&store);

    let state = workflow
        .start(
            WorkflowState::Idle,
            vec![pending("x.txt", b"two"), pending("y.txt", b"y")],
        )
        .unwrap();
    let state = workflow.skip(state).unwrap();

    assert!(matches!(state, WorkflowState::Completed { .. }));
    assert_eq!(state.processed()[0].disposition, Disposition::Skipped);
    assert_eq!(state.summary().skipped, 1);
    assert_eq!(store.content_count(), 3);
    let files = store.list_all_with_versions().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].versions.len(), 1);
}

#[test]
fn cancel_discards_the_conflict_and_the_remainder() {
    let store = temporary_store();
    service(&store).submit(&pending("b.txt", b"old"), None).unwrap();
    let workflow = workflow(&store);

    let state = workflow
        .start(
            WorkflowState::Idle,
            vec![
                pending("a.txt", b"a"),
                pending("b.txt", b"new"),
                pending("c.txt", b"c"),
            ],
        )
        .unwrap();
    let state = workflow.apply(state, Decision::Cancel).unwrap();

    match &state {
        WorkflowState::Cancelled {
            processed,
            discarded,
            ..
        } => {
            assert_eq!(processed.len(), 1);
            assert_eq!(processed[0].target_path, "a.txt");
            assert_eq!(discarded, &vec!["b.txt".to_string(), "c.txt".to_string()]);
        }
        other => panic!("expected cancelled, got {}", other.name()),
    }
    assert!(store.find_by_path("a.txt").unwrap().is_some());
    assert!(store.find_by_path("c.txt").unwrap().is_none());

    // a cancelled workflow accepts a new batch
    let state = workflow
        .start(state, vec![pending("c.txt", b"c")])
        .unwrap();
    assert!(matches!(state, WorkflowState::Completed { .. }));
}

#[test]
fn resolving_without_a_conflict_is_rejected_and_state_returned() {
    let store = temporary_store();
    let workflow = workflow(&store);

    let err = workflow
        .resolve(WorkflowState::Idle, ResolveMode::Replace)
        .unwrap_err();

    match err {
        WorkflowError::InvalidTransition { state, .. } => {
            assert!(matches!(*state, WorkflowState::Idle));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn failed_item_reports_the_unsent_remainder() {
    let dir = tempfile::tempdir().unwrap();
    let store = temporary_store();
    let workflow = workflow(&store);
    let missing = filevault::upload::PendingUpload::from_file(
        dir.path().join("gone.bin"),
        "gone.bin",
    )
    .unwrap();

    let err = workflow
        .start(
            WorkflowState::Idle,
            vec![pending("a.txt", b"a"), missing, pending("c.txt", b"c")],
        )
        .unwrap_err();

    let WorkflowError::ItemFailed(failure) = err else {
        panic!("expected an item failure");
    };
    assert_eq!(failure.target_path, "gone.bin");
    assert_eq!(failure.processed.len(), 1);
    assert_eq!(failure.remaining.len(), 1);

    let state = workflow
        .start(WorkflowState::Idle, failure.remaining)
        .unwrap();
    assert!(matches!(state, WorkflowState::Completed { .. }));
    assert!(store.find_by_path("c.txt").unwrap().is_some());
}

#[test]
fn skipping_the_middle_conflict_completes_at_three_of_three() {
    let store = temporary_store();
    service(&store).submit(&pending("b.txt", b"original"), None).unwrap();
    let workflow = workflow(&store);

    let state = workflow
        .start(
            WorkflowState::Idle,
            vec![
                pending("a.txt", b"a"),
                pending("b.txt", b"incoming"),
                pending("c.txt", b"c"),
            ],
        )
        .unwrap();
    assert!(matches!(state, WorkflowState::AwaitingDecision { .. }));
    assert_eq!(
        state.progress(),
        Some(Progress {
            current: 2,
            total: 3
        })
    );

    let state = workflow.skip(state).unwrap();

    assert!(matches!(state, WorkflowState::Completed { .. }));
    assert_eq!(
        state.progress(),
        Some(Progress {
            current: 3,
            total: 3
        })
    );
    let dispositions: Vec<(&str, &Disposition)> = state
        .processed()
        .iter()
        .map(|item| (item.target_path.as_str(), &item.disposition))
        .collect();
    assert_eq!(dispositions.len(), 3);
    assert_eq!(dispositions[1], ("b.txt", &Disposition::Skipped));

    let files = store.list_all_with_versions().unwrap();
    let b = files.iter().find(|f| f.path == "b.txt").unwrap();
    assert_eq!(b.versions.len(), 1);
    assert!(store.find_by_path("c.txt").unwrap().is_some());
    assert!(store.find_by_path("b (1).txt").unwrap().is_none());
}
