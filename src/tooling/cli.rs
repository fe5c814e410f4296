//! CLI Tooling
//!
//! Command-line surface for the vault: batch uploads with conflict prompts, the flat
//! listing, the per-file detail view, the folder tree, and reset.

use super::format::{
    format_batch_report, format_failure_report, format_file_detail_json,
    format_file_detail_text, format_listing_json, format_listing_text, format_section_heading,
    format_tree_json, format_tree_text,
};
use crate::config::{ConfigLoader, FileVaultConfig};
use crate::error::ApiError;
use crate::store::{FileCatalog, SledStore};
use crate::tree::build_tree;
use crate::upload::{normalize_target_path, PendingUpload, ResolveMode, UploadService};
use crate::workflow::{Decision, Progress, UploadWorkflow, WorkflowError, WorkflowState};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use walkdir::WalkDir;

/// Filevault CLI - content-addressed file vault
#[derive(Parser)]
#[command(name = "filevault")]
#[command(about = "Content-addressed file vault with per-path version history")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Store directory (overrides configuration)
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload local files and folders
    Upload {
        /// Files or directories; directories keep their own name
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Folder to upload into
        #[arg(long)]
        prefix: Option<String>,

        /// What to do when a target path is already taken
        #[arg(long, value_enum, default_value_t = ConflictPolicy::Ask)]
        on_conflict: ConflictPolicy,
    },
    /// List every file with its versions and duplicates
    List {
        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show one file with its duplicates and full version history
    Show {
        /// Stored path of the file
        path: String,

        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show files as a folder tree
    Tree {
        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Delete every file, version, and content record
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

/// Conflict handling for a whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConflictPolicy {
    /// Prompt for each conflict
    Ask,
    Replace,
    Copy,
    Skip,
    Cancel,
}

impl ConflictPolicy {
    /// The fixed decision, or `None` when the user must be asked.
    pub fn decision(self) -> Option<Decision> {
        match self {
            ConflictPolicy::Ask => None,
            ConflictPolicy::Replace => Some(Decision::Resolve(ResolveMode::Replace)),
            ConflictPolicy::Copy => Some(Decision::Resolve(ResolveMode::Copy)),
            ConflictPolicy::Skip => Some(Decision::Skip),
            ConflictPolicy::Cancel => Some(Decision::Cancel),
        }
    }
}

/// CLI context bound to one open store
pub struct CliContext {
    store: Arc<SledStore>,
    workflow: UploadWorkflow,
    store_path: PathBuf,
}

impl CliContext {
    /// Load configuration and open the store.
    pub fn new(store_path: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = ConfigLoader::load_with(config_path.as_deref())?;
        Self::from_config(&config, store_path)
    }

    /// Open the store described by an already loaded configuration.
    pub fn from_config(
        config: &FileVaultConfig,
        store_path: Option<PathBuf>,
    ) -> Result<Self, ApiError> {
        let store_path = config.resolve_store_path(store_path)?;
        let store = Arc::new(SledStore::open(&store_path, config.owner_id)?);
        info!(store = %store_path.display(), owner_id = config.owner_id, "Opened store");
        let workflow = UploadWorkflow::new(UploadService::from_store(Arc::clone(&store)));
        Ok(Self {
            store,
            workflow,
            store_path,
        })
    }

    pub fn store(&self) -> &SledStore {
        &self.store
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let result = match command {
            Commands::Upload {
                sources,
                prefix,
                on_conflict,
            } => self.handle_upload(sources, prefix.as_deref(), *on_conflict),
            Commands::List { format } => self.handle_list(format),
            Commands::Show { path, format } => self.handle_show(path, format),
            Commands::Tree { format } => self.handle_tree(format),
            Commands::Reset { yes } => self.handle_reset(*yes),
        };
        self.store.flush()?;
        result
    }

    fn handle_upload(
        &self,
        sources: &[PathBuf],
        prefix: Option<&str>,
        policy: ConflictPolicy,
    ) -> Result<String, ApiError> {
        let batch = collect_uploads(sources, prefix)?;
        if batch.is_empty() {
            return Ok("Nothing to upload.".to_string());
        }

        let mut state = self
            .workflow
            .start(WorkflowState::Idle, batch)
            .map_err(batch_error)?;
        while let WorkflowState::AwaitingDecision { conflict, run } = &state {
            let decision = match policy.decision() {
                Some(decision) => decision,
                None => prompt_decision(conflict, run.progress)?,
            };
            state = self.workflow.apply(state, decision).map_err(batch_error)?;
        }

        let mut out = format!("{}\n", format_section_heading("Upload"));
        out.push_str(&format_batch_report(&state));
        Ok(out)
    }

    fn handle_list(&self, format: &str) -> Result<String, ApiError> {
        let files = self.store.list_all_with_versions()?;
        match format {
            "json" => Ok(format_listing_json(&files)?),
            "text" => Ok(format_listing_text(&files)),
            other => Err(invalid_format(other)),
        }
    }

    fn handle_show(&self, path: &str, format: &str) -> Result<String, ApiError> {
        let path = normalize_target_path(path)?;
        let file = self
            .store
            .list_all_with_versions()?
            .into_iter()
            .find(|file| file.path == path)
            .ok_or(ApiError::NotFound(path))?;
        match format {
            "json" => Ok(format_file_detail_json(&file)?),
            "text" => Ok(format_file_detail_text(&file, Utc::now())),
            other => Err(invalid_format(other)),
        }
    }

    fn handle_tree(&self, format: &str) -> Result<String, ApiError> {
        let files = self.store.list_all_with_versions()?;
        let tree = build_tree(&files);
        match format {
            "json" => Ok(format_tree_json(&tree)?),
            "text" => Ok(format_tree_text(&tree)),
            other => Err(invalid_format(other)),
        }
    }

    fn handle_reset(&self, yes: bool) -> Result<String, ApiError> {
        if !yes {
            use dialoguer::Confirm;
            let confirmed = Confirm::new()
                .with_prompt("Delete every file, version, and stored content?")
                .default(false)
                .interact()?;
            if !confirmed {
                return Ok("Reset cancelled".to_string());
            }
        }
        self.store.reset_all()?;
        Ok("All files deleted.".to_string())
    }
}

/// Failed items surface with the report of what the batch had already stored.
fn batch_error(error: WorkflowError) -> ApiError {
    match error {
        WorkflowError::ItemFailed(failure) => {
            ApiError::BatchFailed(format_failure_report(&failure))
        }
        other => ApiError::Workflow(other),
    }
}

fn invalid_format(format: &str) -> ApiError {
    ApiError::ConfigError(format!(
        "Invalid format: {} (must be 'text' or 'json')",
        format
    ))
}

fn prompt_decision(conflict: &PendingUpload, progress: Progress) -> Result<Decision, ApiError> {
    use dialoguer::Select;

    let choices = [
        "Replace (add a new version)",
        "Keep both (store a copy)",
        "Skip this file",
        "Cancel remaining uploads",
    ];
    let selection = Select::new()
        .with_prompt(format!(
            "[{}/{}] {} already exists",
            progress.current, progress.total, conflict.target_path
        ))
        .items(&choices)
        .default(0)
        .interact()?;

    Ok(match selection {
        0 => Decision::Resolve(ResolveMode::Replace),
        1 => Decision::Resolve(ResolveMode::Copy),
        2 => Decision::Skip,
        _ => Decision::Cancel,
    })
}

/// Expand sources into a batch. Directories are walked in name order and keep their
/// own name as the top folder; files land directly under `prefix`.
pub fn collect_uploads(
    sources: &[PathBuf],
    prefix: Option<&str>,
) -> Result<Vec<PendingUpload>, ApiError> {
    let prefix = prefix
        .map(|p| p.trim_matches('/'))
        .filter(|p| !p.is_empty());
    let mut batch = Vec::new();
    for source in sources {
        let metadata = std::fs::metadata(source)?;
        if metadata.is_dir() {
            let root = source.file_name().map(|name| name.to_string_lossy().into_owned());
            for entry in WalkDir::new(source).sort_by_file_name() {
                let entry = entry.map_err(std::io::Error::from)?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
                let mut segments: Vec<String> = prefix.into_iter().map(str::to_string).collect();
                segments.extend(root.clone());
                segments.extend(
                    relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned()),
                );
                batch.push(PendingUpload::from_file(
                    entry.path().to_path_buf(),
                    &segments.join("/"),
                )?);
            }
        } else {
            let name = source
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let target = match prefix {
                Some(prefix) => format!("{}/{}", prefix, name),
                None => name,
            };
            batch.push(PendingUpload::from_file(source.clone(), &target)?);
        }
    }
    Ok(batch)
}
