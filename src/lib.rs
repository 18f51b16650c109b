//! # export-reconcile
//!
//! Post-export reconciliation for content exports.
//!
//! Once an asynchronous export task has run, the files a downstream import
//! tool needs have to be materialized next to the exported content. This
//! crate decides what to write and writes it:
//!
//! - **Eligibility** - before submission, repositories in scope that do not
//!   use the `immediate` download policy are reported, and may block the export
//! - **Resolution** - the finished task is reloaded and its export history
//!   record looked up, unless the caller chose not to wait
//! - **Finalization** - syncable exports get a `listing` file per content
//!   directory; other exports get a `metadata.json` document
//!
//! Talking to the server and printing to the user are left to the host,
//! through the [`ExportApi`] and [`Output`] traits.
//!
//! ## Quick Start
//!
//! ```no_run
//! use export_reconcile::{
//!     Config, ConsoleOutput, ContentExporter, ExportFormat, ExportRequest, HistoryTarget,
//!     TaskId,
//! };
//! use export_reconcile::api::ExportApi;
//! use std::sync::Arc;
//!
//! # async fn example(api: Arc<dyn ExportApi>) -> export_reconcile::Result<()> {
//! let exporter = ContentExporter::new(api, Arc::new(ConsoleOutput), Config::default())?;
//!
//! // Export version 42 in the syncable layout and wait for it
//! let request = ExportRequest::version(42).with_format(ExportFormat::Syncable);
//! let status = exporter.run(&request).await;
//!
//! // Or finalize an export submitted earlier with `async_mode`
//! let result = exporter
//!     .generate_listing(&HistoryTarget::Task(TaskId::from("5a0c1b2e")))
//!     .await;
//! let status = exporter.report(result);
//! # let _ = status;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Host API collaborator trait
pub mod api;
/// Configuration types
pub mod config;
/// Pre-export eligibility check
pub mod eligibility;
/// Error types
pub mod error;
/// Export command orchestration
pub mod exporter;
/// Listing and metadata generation
pub mod finalizer;
/// User-facing output
pub mod output;
/// Export outcome resolution
pub mod resolver;
/// Core types
pub mod types;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use api::ExportApi;
pub use config::{CommandConfig, Config, ListingConfig, MetadataConfig};
pub use eligibility::{EligibilityClassifier, EligibilityReport};
pub use error::{Error, ExportError, Result, ToExitStatus};
pub use exporter::ContentExporter;
pub use finalizer::{FinalizeOutcome, ListingOutcome, MetadataOutcome, OutputFinalizer};
pub use output::{ConsoleOutput, Output, Table};
pub use resolver::{ExportOutcomeResolver, Resolution};
pub use types::{
    ContentViewVersionId, DownloadPolicy, ExitStatus, ExportFormat, ExportHistory,
    ExportHistoryId, ExportRequest, ExportScope, HistoryTarget, OrganizationId, Repository,
    RepositoryFilter, RepositoryId, Task, TaskId, TaskRef, TaskResult,
};
