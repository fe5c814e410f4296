//! Text and JSON rendering for listings, trees, and batch reports.

use crate::store::FileSnapshot;
use crate::tree::TreeNode;
use crate::upload::UploadOutcome;
use crate::workflow::{BatchSummary, Disposition, ItemFailure, ProcessedItem, WorkflowState};
use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

const KB: u64 = 1024;
const MB: u64 = 1024 * 1024;

/// Section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// `512 B`, `1.5 KB`, `2.0 MB`
pub fn format_size(bytes: u64) -> String {
    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}

/// `Mar 4, 2024`
pub fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%b %-d, %Y").to_string()
}

/// `Mar 4, 2024, 03:30 PM`
pub fn format_date_time(at: &DateTime<Utc>) -> String {
    at.format("%b %-d, %Y, %I:%M %p").to_string()
}

/// `Just now`, `5m ago`, `3h ago`, `2d ago`, then the plain date from a week on.
pub fn format_relative_date(at: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(*at);
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if elapsed.num_hours() < 24 {
        format!("{}h ago", elapsed.num_hours())
    } else if elapsed.num_days() < 7 {
        format!("{}d ago", elapsed.num_days())
    } else {
        format_date(at)
    }
}

/// One file in detail: location, size, duplicates, and its version history newest first.
pub fn format_file_detail_text(file: &FileSnapshot, now: DateTime<Utc>) -> String {
    let mut out = format!("{}\n\n", format_section_heading(&file.path));
    out.push_str(&format!("  Size: {}\n", format_size(file.size)));
    out.push_str(&format!("  Uploaded: {}\n", format_date_time(&file.uploaded_at)));

    if file.is_duplicate() {
        out.push_str(&format!("\n{}\n", "Duplicate content, identical to:".yellow()));
        for path in &file.duplicate_of {
            out.push_str(&format!("  {}\n", path));
        }
    }

    out.push_str(&format!(
        "\n{}\n\n",
        format_section_heading(&format!("Version history ({})", file.versions.len()))
    ));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Version", "", "Size", "Uploaded"]);
    let count = file.versions.len();
    for (index, version) in file.versions.iter().enumerate() {
        table.add_row(vec![
            format!("v{}", count - index),
            if version.is_current {
                "current".to_string()
            } else {
                String::new()
            },
            format_size(version.size),
            format_relative_date(&version.uploaded_at, now),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

pub fn format_file_detail_json(file: &FileSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(file)
}

pub fn format_listing_text(files: &[FileSnapshot]) -> String {
    if files.is_empty() {
        return "No files uploaded yet\n".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Path", "Size", "Uploaded", "Versions", "Duplicate of"]);
    for file in files {
        table.add_row(vec![
            file.path.clone(),
            format_size(file.size),
            format_date(&file.uploaded_at),
            file.versions.len().to_string(),
            if file.is_duplicate() {
                file.duplicate_of.join(", ")
            } else {
                "-".to_string()
            },
        ]);
    }
    let mut out = format!("{}\n", table);
    out.push_str(&format!("Total: {} files.\n", files.len()));
    out
}

pub fn format_listing_json(files: &[FileSnapshot]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(files)
}

pub fn format_tree_text(nodes: &[TreeNode]) -> String {
    if nodes.is_empty() {
        return "No files uploaded yet\n".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Name", "Uploaded", "Size", "Duplicate", "Versions"]);
    for node in nodes {
        add_tree_rows(&mut table, node, 0);
    }
    format!("{}\n", table)
}

fn add_tree_rows(table: &mut Table, node: &TreeNode, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        TreeNode::Folder(folder) => {
            let count = |n: u64| if n > 0 { n.to_string() } else { "-".to_string() };
            table.add_row(vec![
                format!("{}{}/", indent, folder.name.bold()),
                "--".to_string(),
                "--".to_string(),
                count(folder.stats.duplicate_count),
                count(folder.stats.versioned_count),
            ]);
            for child in &folder.children {
                add_tree_rows(table, child, depth + 1);
            }
        }
        TreeNode::File(file) => {
            let snapshot = &file.file;
            let versions = if snapshot.is_versioned() {
                snapshot.versions.len().to_string()
            } else {
                "-".to_string()
            };
            table.add_row(vec![
                format!("{}{}", indent, file.name),
                format_date(&snapshot.uploaded_at),
                format_size(snapshot.size),
                (if snapshot.is_duplicate() { "●" } else { "-" }).to_string(),
                versions,
            ]);
        }
    }
}

pub fn format_tree_json(nodes: &[TreeNode]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(nodes)
}

fn format_processed_line(item: &ProcessedItem) -> String {
    match &item.disposition {
        Disposition::Stored(UploadOutcome::Created { path, .. }) => {
            format!("  {} {}", "created ".green(), path)
        }
        Disposition::Stored(UploadOutcome::Replaced { path, .. }) => {
            format!("  {} {}", "replaced".yellow(), path)
        }
        Disposition::Stored(UploadOutcome::Copied { path, .. }) => {
            format!("  {} {} (from {})", "copied  ".cyan(), path, item.target_path)
        }
        Disposition::Stored(UploadOutcome::Conflict { target_path }) => {
            format!("  {} {}", "conflict".red(), target_path)
        }
        Disposition::Skipped => format!("  {} {}", "skipped ".dimmed(), item.target_path),
    }
}

fn push_counts(out: &mut String, summary: &BatchSummary) {
    out.push_str(&format!(
        "{} created, {} replaced, {} copied, {} skipped",
        summary.created, summary.replaced, summary.copied, summary.skipped
    ));
}

/// Per-item lines followed by the batch totals.
pub fn format_batch_report(state: &WorkflowState) -> String {
    let mut out = String::new();
    for item in state.processed() {
        out.push_str(&format_processed_line(item));
        out.push('\n');
    }
    if let WorkflowState::Cancelled { discarded, .. } = state {
        for path in discarded {
            out.push_str(&format!("  {} {}\n", "discarded".red(), path));
        }
    }

    let summary = state.summary();
    let verb = match state {
        WorkflowState::Cancelled { .. } => "Upload cancelled",
        _ => "Upload complete",
    };
    out.push_str(&format!("{}: ", verb));
    push_counts(&mut out, &summary);
    if summary.discarded > 0 {
        out.push_str(&format!(", {} discarded", summary.discarded));
    }
    out.push('.');
    out
}

/// What a failed batch committed, the item that failed, and what was never sent.
pub fn format_failure_report(failure: &ItemFailure) -> String {
    let mut out = String::new();
    for item in &failure.processed {
        out.push_str(&format_processed_line(item));
        out.push('\n');
    }
    out.push_str(&format!(
        "  {} {}: {}\n",
        "failed  ".red(),
        failure.target_path,
        failure.error
    ));
    for pending in &failure.remaining {
        out.push_str(&format!("  {} {}\n", "not sent".dimmed(), pending.target_path));
    }

    out.push_str(&format!(
        "Upload stopped at {}/{}: ",
        failure.progress.current, failure.progress.total
    ));
    push_counts(
        &mut out,
        &BatchSummary::from_processed(&failure.processed, 0),
    );
    out.push_str(&format!(", {} not sent.", failure.remaining.len()));
    out
}
