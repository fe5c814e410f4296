use crate::support::{service, temporary_store};
use filevault::error::UploadError;
use filevault::store::FileCatalog;
use filevault::upload::{ResolveMode, UploadOutcome, UploadRequest};

fn request(path: &str, bytes: &[u8], mode: Option<ResolveMode>) -> UploadRequest {
    UploadRequest {
        bytes: Some(bytes.to_vec()),
        target_path: path.to_string(),
        mode,
    }
}

#[test]
fn same_bytes_at_two_paths_share_one_content_record() {
    let store = temporary_store();
    let service = service(&store);

    service.handle(request("a.txt", b"hello", None)).unwrap();
    service.handle(request("b.txt", b"hello", None)).unwrap();

    assert_eq!(store.content_count(), 1);
    let files = store.list_all_with_versions().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].duplicate_of, vec!["b.txt".to_string()]);
    assert_eq!(files[1].duplicate_of, vec!["a.txt".to_string()]);
}

#[test]
fn occupied_path_without_mode_changes_nothing() {
    let store = temporary_store();
    let service = service(&store);
    service.handle(request("x.txt", b"v1", None)).unwrap();
    let before = store.list_all_with_versions().unwrap();

    let outcome = service.handle(request("x.txt", b"v2", None)).unwrap();

    assert_eq!(
        outcome,
        UploadOutcome::Conflict {
            target_path: "x.txt".to_string()
        }
    );
    let after = store.list_all_with_versions().unwrap();
    assert_eq!(before, after);
}

#[test]
fn replace_appends_a_version_that_becomes_current() {
    let store = temporary_store();
    let service = service(&store);
    service.handle(request("x.txt", b"v1", None)).unwrap();

    let outcome = service
        .handle(request("x.txt", b"version two", Some(ResolveMode::Replace)))
        .unwrap();
    assert!(matches!(outcome, UploadOutcome::Replaced { ref path, .. } if path == "x.txt"));

    let files = store.list_all_with_versions().unwrap();
    assert_eq!(files.len(), 1);
    let file = &files[0];
    assert_eq!(file.versions.len(), 2);
    assert_eq!(file.size, 11);
    assert!(file.versions[0].is_current);
    assert!(!file.versions[1].is_current);
    assert!(file.versions[0].uploaded_at > file.versions[1].uploaded_at);
    assert_eq!(file.uploaded_at, file.versions[0].uploaded_at);
}

#[test]
fn copy_allocates_the_first_free_numbered_path() {
    let store = temporary_store();
    let service = service(&store);
    service.handle(request("docs/r.pdf", b"one", None)).unwrap();
    service.handle(request("docs/r (1).pdf", b"two", None)).unwrap();

    let outcome = service
        .handle(request("docs/r.pdf", b"three", Some(ResolveMode::Copy)))
        .unwrap();

    assert_eq!(outcome.stored_path(), Some("docs/r (2).pdf"));
    let paths: Vec<String> = store
        .list_all_with_versions()
        .unwrap()
        .into_iter()
        .map(|f| f.path)
        .collect();
    assert_eq!(paths, vec!["docs/r.pdf", "docs/r (1).pdf", "docs/r (2).pdf"]);
}

#[test]
fn missing_payload_is_rejected_before_hashing() {
    let store = temporary_store();
    let result = service(&store).handle(UploadRequest {
        bytes: None,
        target_path: "a.txt".to_string(),
        mode: None,
    });
    assert!(matches!(result, Err(UploadError::NoBytesProvided)));
    assert_eq!(store.content_count(), 0);
}

#[test]
fn empty_payload_is_a_valid_file() {
    let store = temporary_store();
    let outcome = service(&store)
        .handle(request("empty.bin", b"", None))
        .unwrap();
    assert!(matches!(outcome, UploadOutcome::Created { .. }));
    assert_eq!(store.list_all_with_versions().unwrap()[0].size, 0);
}

#[test]
fn leading_slash_and_dot_slash_name_the_same_file() {
    let store = temporary_store();
    let service = service(&store);
    service.handle(request("/notes/a.md", b"1", None)).unwrap();
    let outcome = service.handle(request("./notes/a.md", b"2", None)).unwrap();
    assert!(outcome.is_conflict());
}

#[test]
fn unreadable_local_file_fails_before_any_store_call() {
    let dir = tempfile::tempdir().unwrap();
    let store = temporary_store();
    let upload = filevault::upload::PendingUpload::from_file(
        dir.path().join("missing.bin"),
        "missing.bin",
    )
    .unwrap();

    let result = service(&store).submit(&upload, None);

    assert!(matches!(
        result,
        Err(UploadError::HashComputationFailure(_))
    ));
    assert_eq!(store.content_count(), 0);
    assert!(store.find_by_path("missing.bin").unwrap().is_none());
}

#[test]
fn repeated_leading_slashes_never_reach_the_catalog() {
    let store = temporary_store();
    let service = service(&store);
    service.handle(request("//a/b.txt", b"x", None)).unwrap();
    service.handle(request("././c.txt", b"y", None)).unwrap();

    let paths: Vec<String> = store
        .list_all_with_versions()
        .unwrap()
        .into_iter()
        .map(|f| f.path)
        .collect();
    assert_eq!(paths, vec!["a/b.txt", "c.txt"]);

    let tree = filevault::tree::build_tree(&store.list_all_with_versions().unwrap());
    assert_eq!(tree[0].name(), "a");
}

#[test]
fn empty_middle_segment_is_rejected() {
    let store = temporary_store();
    let result = service(&store).handle(request("a//b.txt", b"x", None));
    assert!(matches!(result, Err(UploadError::InvalidPath(_))));
    assert!(store.list_all_with_versions().unwrap().is_empty());
}
