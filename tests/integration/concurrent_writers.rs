use crate::support::{pending, service, temporary_store};
use filevault::store::FileCatalog;
use filevault::upload::{ResolveMode, UploadOutcome};
use std::sync::{Arc, Barrier};
use std::thread;

const WRITERS: usize = 8;

#[test]
fn identical_bytes_from_many_writers_store_one_content_record() {
    let store = temporary_store();
    let barrier = Arc::new(Barrier::new(WRITERS));

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let service = service(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                service
                    .submit(&pending(&format!("copy-{}.bin", i), b"shared payload"), None)
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        assert!(matches!(handle.join().unwrap(), UploadOutcome::Created { .. }));
    }

    assert_eq!(store.content_count(), 1);
    let files = store.list_all_with_versions().unwrap();
    assert_eq!(files.len(), WRITERS);
    assert!(files.iter().all(|f| f.duplicate_of.len() == WRITERS - 1));
}

#[test]
fn racing_creates_on_one_path_leave_a_single_file() {
    let store = temporary_store();
    let barrier = Arc::new(Barrier::new(WRITERS));

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let service = service(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                service
                    .submit(&pending("race.txt", format!("writer {}", i).as_bytes()), None)
                    .unwrap()
            })
        })
        .collect();
    let outcomes: Vec<UploadOutcome> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let created = outcomes
        .iter()
        .filter(|o| matches!(o, UploadOutcome::Created { .. }))
        .count();
    assert_eq!(created, 1);
    assert_eq!(outcomes.iter().filter(|o| o.is_conflict()).count(), WRITERS - 1);
    let files = store.list_all_with_versions().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].versions.len(), 1);
}

#[test]
fn racing_copies_get_distinct_paths() {
    let store = temporary_store();
    service(&store).submit(&pending("report.pdf", b"base"), None).unwrap();
    let barrier = Arc::new(Barrier::new(WRITERS));

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let service = service(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                service
                    .submit(
                        &pending("report.pdf", format!("copy {}", i).as_bytes()),
                        Some(ResolveMode::Copy),
                    )
                    .unwrap()
            })
        })
        .collect();
    let mut paths: Vec<String> = handles
        .into_iter()
        .map(|h| h.join().unwrap().stored_path().unwrap().to_string())
        .collect();
    paths.sort();
    paths.dedup();

    assert_eq!(paths.len(), WRITERS);
    assert_eq!(store.list_all_with_versions().unwrap().len(), WRITERS + 1);
}

#[test]
fn racing_replaces_keep_every_version_with_one_current() {
    let store = temporary_store();
    service(&store).submit(&pending("log.txt", b"v0"), None).unwrap();
    let barrier = Arc::new(Barrier::new(WRITERS));

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let service = service(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                service
                    .submit(
                        &pending("log.txt", format!("v{}", i + 1).as_bytes()),
                        Some(ResolveMode::Replace),
                    )
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let files = store.list_all_with_versions().unwrap();
    let versions = &files[0].versions;
    assert_eq!(versions.len(), WRITERS + 1);
    assert_eq!(versions.iter().filter(|v| v.is_current).count(), 1);
    assert!(versions
        .windows(2)
        .all(|pair| pair[0].uploaded_at > pair[1].uploaded_at));
}
