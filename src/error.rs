//! Error types for export-reconcile
//!
//! This module provides:
//! - The crate-wide [`Error`] type and [`Result`] alias
//! - Export-domain errors ([`ExportError`]) for hard stops, failed tasks and
//!   finalizer precondition violations
//! - Mapping of every error to a process exit status via [`ToExitStatus`]

use crate::types::{ExitStatus, ExportHistoryId, TaskId, TaskResult};
use thiserror::Error;

/// Result type alias for export-reconcile operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for export-reconcile
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "listing.file_name")
        key: Option<String>,
    },

    /// Export workflow error
    #[error("{0}")]
    Export(#[from] ExportError),

    /// The host API collaborator failed
    #[error("API error: {0}")]
    Api(String),

    /// I/O error that could not be recovered from
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Export workflow errors
#[derive(Debug, Error)]
pub enum ExportError {
    /// Repositories in scope are not fully exportable and the export must not proceed
    #[error("export blocked: {count} unexportable repositories in {scope} scope")]
    Ineligible {
        /// Scope name ("repository", "version", "library")
        scope: &'static str,
        /// Number of unexportable repositories
        count: usize,
    },

    /// The export task could not be submitted
    #[error("{message}: {reason}")]
    SubmissionFailed {
        /// Scope-specific failure message
        message: &'static str,
        /// Underlying failure
        reason: String,
    },

    /// The export task ended in error or warning
    #[error("Can not fetch export history from an unfinished task {task_id} (result: {result})")]
    TaskFailed {
        /// The failed task
        task_id: TaskId,
        /// The task's terminal result
        result: TaskResult,
    },

    /// The export history record could not be located
    #[error("Could not fetch the export history")]
    HistoryUnresolvable {
        /// Task the record was looked up from, if any
        task_id: Option<TaskId>,
        /// Record id that was looked up, if known
        export_history_id: Option<ExportHistoryId>,
    },

    /// Listing files were requested for a non-syncable export
    #[error(
        "Cannot generate listing files for this export since it is not syncable. \
         It was not generated with --format=syncable."
    )]
    NotSyncable {
        /// Export history record id
        id: ExportHistoryId,
        /// The record's declared format, if any
        format: Option<String>,
    },

    /// The export history record has no path
    #[error("Export History does not have the path specified. The task may have errored out.")]
    MissingPath {
        /// Export history record id
        id: ExportHistoryId,
    },
}

impl ExportError {
    /// Whether this error means the finalizer was invoked for the wrong record
    pub fn is_precondition_violation(&self) -> bool {
        matches!(
            self,
            ExportError::NotSyncable { .. } | ExportError::MissingPath { .. }
        )
    }
}

/// Convert errors to process exit statuses
///
/// This trait maps domain errors to the exit categories of the host framework.
pub trait ToExitStatus {
    /// Get the exit status for this error
    fn exit_status(&self) -> ExitStatus;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToExitStatus for Error {
    fn exit_status(&self) -> ExitStatus {
        match self {
            Error::Export(ExportError::HistoryUnresolvable { .. }) => ExitStatus::CantCreate,
            Error::Io(_) => ExitStatus::CantCreate,

            Error::Export(_) => ExitStatus::Software,
            Error::Config { .. } => ExitStatus::Software,
            Error::Api(_) => ExitStatus::Software,
            Error::Serialization(_) => ExitStatus::Software,
            Error::Other(_) => ExitStatus::Software,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Export(e) => match e {
                ExportError::Ineligible { .. } => "ineligible_repositories",
                ExportError::SubmissionFailed { .. } => "submission_failed",
                ExportError::TaskFailed { .. } => "task_failed",
                ExportError::HistoryUnresolvable { .. } => "history_unresolvable",
                ExportError::NotSyncable { .. } => "not_syncable",
                ExportError::MissingPath { .. } => "missing_path",
            },
            Error::Api(_) => "api_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::Other(_) => "internal_error",
        }
    }
}
