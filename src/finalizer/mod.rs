//! Output finalization for resolved exports
//!
//! Once an export history record is known, the files a downstream import
//! needs are materialized next to the exported content:
//! - Syncable exports get a `listing` index file in each content directory
//! - Any other export gets its metadata serialized to `metadata.json`
//!
//! Filesystem failures are recovered locally: listing generation reports how
//! to re-run it with more privileges, metadata generation falls back to a
//! second location.

use crate::config::Config;
use crate::error::Result;
use crate::output::Output;
use crate::types::{ExportFormat, ExportHistory};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

mod listing;
mod metadata;

use listing::run_listing_stage;
use metadata::run_metadata_stage;

/// Result of listing generation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListingOutcome {
    /// Every qualifying directory received a listing file
    Generated {
        /// Content root that was indexed
        root: PathBuf,
        /// Number of listing files written
        directories: usize,
    },
    /// The content tree could not be read or written; some listings may be missing
    Inaccessible {
        /// Export path that could not be accessed
        path: PathBuf,
        /// Underlying filesystem error
        reason: String,
    },
}

/// Result of metadata generation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MetadataOutcome {
    /// Written inside the export path
    Written(PathBuf),
    /// The export path was not writable; written to the fallback location instead
    Fallback {
        /// File that was written
        path: PathBuf,
        /// Why the export path could not be used
        reason: String,
    },
}

impl MetadataOutcome {
    /// Location of the metadata document
    pub fn path(&self) -> &PathBuf {
        match self {
            MetadataOutcome::Written(path) => path,
            MetadataOutcome::Fallback { path, .. } => path,
        }
    }
}

/// Result of [`OutputFinalizer::finalize`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FinalizeOutcome {
    /// Listing files were generated (or attempted)
    Listing(ListingOutcome),
    /// A metadata document was written
    Metadata(MetadataOutcome),
}

/// Generates listing files or metadata documents for export history records
pub struct OutputFinalizer {
    output: Arc<dyn Output>,
    config: Arc<Config>,
}

impl OutputFinalizer {
    /// Create a new finalizer
    pub fn new(output: Arc<dyn Output>, config: Arc<Config>) -> Self {
        Self { output, config }
    }

    /// Finalize an export according to the record's declared format
    pub async fn finalize(&self, history: &ExportHistory) -> Result<FinalizeOutcome> {
        let format = history.format();
        info!(
            export_history_id = %history.id,
            ?format,
            "finalizing export output"
        );

        match format {
            ExportFormat::Syncable => Ok(FinalizeOutcome::Listing(
                self.generate_listing(history).await?,
            )),
            ExportFormat::Importable => Ok(FinalizeOutcome::Metadata(
                self.generate_metadata(history).await?,
            )),
        }
    }

    /// Write a listing file into every content directory of a syncable export
    ///
    /// # Errors
    ///
    /// [`ExportError::NotSyncable`](crate::ExportError::NotSyncable) or
    /// [`ExportError::MissingPath`](crate::ExportError::MissingPath) if the
    /// record cannot be indexed; nothing is written in that case. Filesystem
    /// errors are reported to the user and returned as
    /// [`ListingOutcome::Inaccessible`].
    pub async fn generate_listing(&self, history: &ExportHistory) -> Result<ListingOutcome> {
        run_listing_stage(history, self.output.as_ref(), &self.config).await
    }

    /// Write the record's metadata as JSON, falling back to a second directory
    ///
    /// # Errors
    ///
    /// Returns an error only if the fallback location is not writable either.
    pub async fn generate_metadata(&self, history: &ExportHistory) -> Result<MetadataOutcome> {
        run_metadata_stage(history, self.output.as_ref(), &self.config).await
    }
}
