use filevault::config::FileVaultConfig;
use filevault::error::ApiError;
use filevault::tooling::cli::{CliContext, Commands, ConflictPolicy};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn context(temp: &TempDir) -> CliContext {
    CliContext::from_config(&FileVaultConfig::default(), Some(temp.path().join("store"))).unwrap()
}

fn upload(sources: Vec<PathBuf>, on_conflict: ConflictPolicy) -> Commands {
    Commands::Upload {
        sources,
        prefix: None,
        on_conflict,
    }
}

#[test]
fn upload_folder_then_list_json_contract() {
    let temp = TempDir::new().unwrap();
    let photos = temp.path().join("photos");
    fs::create_dir_all(&photos).unwrap();
    fs::write(photos.join("a.jpg"), b"same").unwrap();
    fs::write(photos.join("b.jpg"), b"same").unwrap();
    let cli = context(&temp);

    let report = cli
        .execute(&upload(vec![photos], ConflictPolicy::Cancel))
        .unwrap();
    assert!(report.contains("2 created"));

    let output = cli
        .execute(&Commands::List {
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    let files = parsed.as_array().unwrap();
    assert_eq!(files.len(), 2);
    let first = &files[0];
    assert_eq!(first["path"], "photos/a.jpg");
    assert!(first.get("id").and_then(|v| v.as_u64()).is_some());
    assert_eq!(first["size"], 4);
    assert!(first.get("uploadedAt").and_then(|v| v.as_str()).is_some());
    assert_eq!(first["duplicateOf"][0], "photos/b.jpg");
    let version = &first["versions"][0];
    assert_eq!(version["isCurrent"], true);
    assert!(version.get("uploadedAt").is_some());
    assert!(version.get("contentId").is_none());
}

#[test]
fn second_upload_with_copy_policy_keeps_both() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("notes.txt");
    fs::write(&file, b"first").unwrap();
    let cli = context(&temp);
    cli.execute(&upload(vec![file.clone()], ConflictPolicy::Ask))
        .unwrap();

    fs::write(&file, b"second").unwrap();
    let report = cli
        .execute(&upload(vec![file], ConflictPolicy::Copy))
        .unwrap();

    assert!(report.contains("notes (1).txt"));
    assert!(report.contains("1 copied"));
}

#[test]
fn skip_policy_reports_skipped_items() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("a.txt");
    fs::write(&file, b"1").unwrap();
    let cli = context(&temp);
    cli.execute(&upload(vec![file.clone()], ConflictPolicy::Skip))
        .unwrap();

    let report = cli
        .execute(&upload(vec![file], ConflictPolicy::Skip))
        .unwrap();
    assert!(report.contains("1 skipped"));
}

#[test]
fn tree_json_is_tagged_and_text_handles_empty_catalog() {
    let temp = TempDir::new().unwrap();
    let cli = context(&temp);

    let empty = cli
        .execute(&Commands::Tree {
            format: "text".to_string(),
        })
        .unwrap();
    assert!(empty.contains("No files uploaded yet"));

    let docs = temp.path().join("docs");
    fs::create_dir_all(docs.join("drafts")).unwrap();
    fs::write(docs.join("drafts").join("plan.md"), b"plan").unwrap();
    cli.execute(&upload(vec![docs], ConflictPolicy::Cancel))
        .unwrap();

    let output = cli
        .execute(&Commands::Tree {
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed[0]["type"], "folder");
    assert_eq!(parsed[0]["name"], "docs");
    assert_eq!(parsed[0]["children"][0]["path"], "docs/drafts");
    assert_eq!(parsed[0]["children"][0]["children"][0]["type"], "file");
}

#[test]
fn reset_with_yes_clears_the_store() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("a.txt");
    fs::write(&file, b"1").unwrap();
    let cli = context(&temp);
    cli.execute(&upload(vec![file], ConflictPolicy::Cancel))
        .unwrap();

    cli.execute(&Commands::Reset { yes: true }).unwrap();

    let output = cli
        .execute(&Commands::List {
            format: "json".to_string(),
        })
        .unwrap();
    assert_eq!(output.trim(), "[]");
}

#[test]
fn unknown_format_is_rejected() {
    let temp = TempDir::new().unwrap();
    let cli = context(&temp);
    let result = cli.execute(&Commands::List {
        format: "yaml".to_string(),
    });
    assert!(result.is_err());
}

#[test]
fn show_lists_version_history_newest_first() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("notes.txt");
    fs::write(&file, b"first").unwrap();
    let cli = context(&temp);
    cli.execute(&upload(vec![file.clone()], ConflictPolicy::Cancel))
        .unwrap();
    fs::write(&file, b"second!").unwrap();
    cli.execute(&upload(vec![file], ConflictPolicy::Replace))
        .unwrap();

    let text = cli
        .execute(&Commands::Show {
            path: "/notes.txt".to_string(),
            format: "text".to_string(),
        })
        .unwrap();
    assert!(text.contains("Version history (2)"));
    assert!(text.contains("v2"));
    assert!(text.contains("v1"));
    assert!(text.contains("current"));
    assert!(text.contains("Just now"));
    assert!(text.find("v2").unwrap() < text.find("v1").unwrap());

    let json = cli
        .execute(&Commands::Show {
            path: "notes.txt".to_string(),
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["path"], "notes.txt");
    assert_eq!(parsed["size"], 7);
    assert_eq!(parsed["versions"].as_array().unwrap().len(), 2);
    assert_eq!(parsed["versions"][0]["isCurrent"], true);
    assert_eq!(parsed["versions"][1]["isCurrent"], false);
}

#[test]
fn show_unknown_path_is_not_found() {
    let temp = TempDir::new().unwrap();
    let cli = context(&temp);
    let result = cli.execute(&Commands::Show {
        path: "missing.txt".to_string(),
        format: "text".to_string(),
    });
    assert!(matches!(result, Err(ApiError::NotFound(path)) if path == "missing.txt"));
}
