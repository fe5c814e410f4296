//! Batch Upload Workflow
//!
//! Drives an ordered batch of uploads through the upload service one item at a time.
//! A path conflict pauses the batch in `AwaitingDecision` until the caller resolves,
//! skips, or cancels. Every transition consumes the current state and returns the next
//! one, so the queue is never shared between steps.
//!
//! Items committed before a pause, cancellation, or failure stay committed.

use crate::error::UploadError;
use crate::upload::{PendingUpload, ResolveMode, UploadOutcome, UploadService};
use serde::Serialize;
use std::collections::VecDeque;
use thiserror::Error;
use tracing::{debug, info, warn};

/// 1-based position of the item being (or last) processed, out of the batch size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

/// What happened to an item that left the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    Stored(UploadOutcome),
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedItem {
    pub target_path: String,
    pub disposition: Disposition,
}

/// In-flight batch: progress, the untouched remainder, and the items already handled.
#[derive(Debug, Clone)]
pub struct BatchRun {
    pub progress: Progress,
    pub remaining: VecDeque<PendingUpload>,
    pub processed: Vec<ProcessedItem>,
}

/// Caller's answer to a paused conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Resolve(ResolveMode),
    Skip,
    Cancel,
}

#[derive(Debug, Clone)]
pub enum WorkflowState {
    Idle,
    Running(BatchRun),
    AwaitingDecision {
        conflict: PendingUpload,
        run: BatchRun,
    },
    Cancelled {
        progress: Progress,
        processed: Vec<ProcessedItem>,
        /// Target paths that were dropped without being stored.
        discarded: Vec<String>,
    },
    Completed {
        progress: Progress,
        processed: Vec<ProcessedItem>,
    },
}

impl WorkflowState {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::Running(_) => "running",
            WorkflowState::AwaitingDecision { .. } => "awaiting a decision",
            WorkflowState::Cancelled { .. } => "cancelled",
            WorkflowState::Completed { .. } => "completed",
        }
    }

    pub fn progress(&self) -> Option<Progress> {
        match self {
            WorkflowState::Idle => None,
            WorkflowState::Running(run) | WorkflowState::AwaitingDecision { run, .. } => {
                Some(run.progress)
            }
            WorkflowState::Cancelled { progress, .. } | WorkflowState::Completed { progress, .. } => {
                Some(*progress)
            }
        }
    }

    pub fn processed(&self) -> &[ProcessedItem] {
        match self {
            WorkflowState::Idle => &[],
            WorkflowState::Running(run) | WorkflowState::AwaitingDecision { run, .. } => {
                run.processed.as_slice()
            }
            WorkflowState::Cancelled { processed, .. }
            | WorkflowState::Completed { processed, .. } => processed.as_slice(),
        }
    }

    /// Terminal states accept a new batch.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowState::Idle | WorkflowState::Cancelled { .. } | WorkflowState::Completed { .. }
        )
    }

    pub fn summary(&self) -> BatchSummary {
        let discarded = match self {
            WorkflowState::Cancelled { discarded, .. } => discarded.len(),
            _ => 0,
        };
        BatchSummary::from_processed(self.processed(), discarded)
    }
}

/// Counts for reporting a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub created: usize,
    pub replaced: usize,
    pub copied: usize,
    pub skipped: usize,
    pub discarded: usize,
}

impl BatchSummary {
    pub fn from_processed(processed: &[ProcessedItem], discarded: usize) -> Self {
        let mut summary = BatchSummary {
            discarded,
            ..Default::default()
        };
        for item in processed {
            match &item.disposition {
                Disposition::Stored(UploadOutcome::Created { .. }) => summary.created += 1,
                Disposition::Stored(UploadOutcome::Replaced { .. }) => summary.replaced += 1,
                Disposition::Stored(UploadOutcome::Copied { .. }) => summary.copied += 1,
                Disposition::Stored(UploadOutcome::Conflict { .. }) => {}
                Disposition::Skipped => summary.skipped += 1,
            }
        }
        summary
    }
}

/// An item that could not be stored, with everything needed to resume.
#[derive(Debug)]
pub struct ItemFailure {
    pub target_path: String,
    pub error: UploadError,
    pub progress: Progress,
    pub processed: Vec<ProcessedItem>,
    /// Items after the failed one, never offered to the catalog.
    pub remaining: Vec<PendingUpload>,
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The transition does not apply to the current state, which is handed back.
    #[error("cannot {action} while {from}")]
    InvalidTransition {
        from: &'static str,
        action: &'static str,
        state: Box<WorkflowState>,
    },

    #[error("upload of {} failed: {}", .0.target_path, .0.error)]
    ItemFailed(Box<ItemFailure>),
}

/// Sequential batch driver over an `UploadService`.
pub struct UploadWorkflow {
    service: UploadService,
}

impl UploadWorkflow {
    pub fn new(service: UploadService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &UploadService {
        &self.service
    }

    /// Queue a batch without processing anything yet.
    pub fn begin(
        &self,
        state: WorkflowState,
        batch: Vec<PendingUpload>,
    ) -> Result<WorkflowState, WorkflowError> {
        if !state.is_terminal() {
            return Err(invalid(state, "start a batch"));
        }
        info!(total = batch.len(), "starting upload batch");
        Ok(WorkflowState::Running(BatchRun {
            progress: Progress {
                current: 0,
                total: batch.len(),
            },
            remaining: batch.into(),
            processed: Vec::new(),
        }))
    }

    /// Queue a batch and process it until it completes or pauses on a conflict.
    pub fn start(
        &self,
        state: WorkflowState,
        batch: Vec<PendingUpload>,
    ) -> Result<WorkflowState, WorkflowError> {
        let state = self.begin(state, batch)?;
        self.drive(state)
    }

    /// Process exactly one queued item.
    pub fn step(&self, state: WorkflowState) -> Result<WorkflowState, WorkflowError> {
        match state {
            WorkflowState::Running(run) => self.advance(run),
            other => Err(invalid(other, "process the next item")),
        }
    }

    /// Store the paused upload using `mode`, then resume the batch.
    pub fn resolve(
        &self,
        state: WorkflowState,
        mode: ResolveMode,
    ) -> Result<WorkflowState, WorkflowError> {
        let (conflict, mut run) = match state {
            WorkflowState::AwaitingDecision { conflict, run } => (conflict, run),
            other => return Err(invalid(other, "resolve a conflict")),
        };
        match self.service.submit(&conflict, Some(mode)) {
            Ok(outcome) => {
                debug!(path = %conflict.target_path, ?mode, "resolved conflict");
                run.processed.push(ProcessedItem {
                    target_path: conflict.target_path,
                    disposition: Disposition::Stored(outcome),
                });
                self.drive(WorkflowState::Running(run))
            }
            Err(error) => Err(failure(conflict.target_path, error, run)),
        }
    }

    /// Drop the paused upload without touching the catalog, then resume the batch.
    pub fn skip(&self, state: WorkflowState) -> Result<WorkflowState, WorkflowError> {
        let (conflict, mut run) = match state {
            WorkflowState::AwaitingDecision { conflict, run } => (conflict, run),
            other => return Err(invalid(other, "skip a conflict")),
        };
        debug!(path = %conflict.target_path, "skipped conflicting upload");
        run.processed.push(ProcessedItem {
            target_path: conflict.target_path,
            disposition: Disposition::Skipped,
        });
        self.drive(WorkflowState::Running(run))
    }

    /// Discard everything not yet stored.
    pub fn cancel(&self, state: WorkflowState) -> Result<WorkflowState, WorkflowError> {
        let (conflict, run) = match state {
            WorkflowState::AwaitingDecision { conflict, run } => (Some(conflict), run),
            WorkflowState::Running(run) => (None, run),
            other => return Err(invalid(other, "cancel")),
        };
        let discarded: Vec<String> = conflict
            .into_iter()
            .chain(run.remaining)
            .map(|item| item.target_path)
            .collect();
        info!(
            processed = run.processed.len(),
            discarded = discarded.len(),
            "cancelled upload batch"
        );
        Ok(WorkflowState::Cancelled {
            progress: run.progress,
            processed: run.processed,
            discarded,
        })
    }

    pub fn apply(
        &self,
        state: WorkflowState,
        decision: Decision,
    ) -> Result<WorkflowState, WorkflowError> {
        match decision {
            Decision::Resolve(mode) => self.resolve(state, mode),
            Decision::Skip => self.skip(state),
            Decision::Cancel => self.cancel(state),
        }
    }

    fn drive(&self, mut state: WorkflowState) -> Result<WorkflowState, WorkflowError> {
        loop {
            state = match state {
                WorkflowState::Running(run) => self.advance(run)?,
                other => return Ok(other),
            };
        }
    }

    fn advance(&self, mut run: BatchRun) -> Result<WorkflowState, WorkflowError> {
        let Some(item) = run.remaining.pop_front() else {
            return Ok(complete(run));
        };
        run.progress.current += 1;
        debug!(
            path = %item.target_path,
            current = run.progress.current,
            total = run.progress.total,
            "processing upload"
        );

        match self.service.submit(&item, None) {
            Ok(UploadOutcome::Conflict { .. }) => {
                info!(path = %item.target_path, "upload paused on path conflict");
                Ok(WorkflowState::AwaitingDecision {
                    conflict: item,
                    run,
                })
            }
            Ok(outcome) => {
                run.processed.push(ProcessedItem {
                    target_path: item.target_path,
                    disposition: Disposition::Stored(outcome),
                });
                if run.remaining.is_empty() {
                    Ok(complete(run))
                } else {
                    Ok(WorkflowState::Running(run))
                }
            }
            Err(error) => Err(failure(item.target_path, error, run)),
        }
    }
}

fn complete(run: BatchRun) -> WorkflowState {
    info!(
        processed = run.processed.len(),
        total = run.progress.total,
        "upload batch completed"
    );
    WorkflowState::Completed {
        progress: run.progress,
        processed: run.processed,
    }
}

fn invalid(state: WorkflowState, action: &'static str) -> WorkflowError {
    WorkflowError::InvalidTransition {
        from: state.name(),
        action,
        state: Box::new(state),
    }
}

fn failure(target_path: String, error: UploadError, run: BatchRun) -> WorkflowError {
    warn!(path = %target_path, error = %error, "upload failed, batch stopped");
    WorkflowError::ItemFailed(Box::new(ItemFailure {
        target_path,
        error,
        progress: run.progress,
        processed: run.processed,
        remaining: run.remaining.into(),
    }))
}
