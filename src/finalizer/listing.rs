//! Listing file generation for syncable exports

use super::ListingOutcome;
use crate::config::{Config, ListingConfig};
use crate::error::{ExportError, Result};
use crate::output::Output;
use crate::types::{ExportFormat, ExportHistory};
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Execute the listing stage
pub(crate) async fn run_listing_stage(
    history: &ExportHistory,
    output: &dyn Output,
    config: &Config,
) -> Result<ListingOutcome> {
    if history.format() != ExportFormat::Syncable {
        return Err(ExportError::NotSyncable {
            id: history.id,
            format: history.format_name().map(str::to_string),
        }
        .into());
    }

    let Some(export_path) = history.path() else {
        return Err(ExportError::MissingPath { id: history.id }.into());
    };

    let root = export_path.join(&config.listing.content_dir);
    debug!(export_history_id = %history.id, ?root, "running listing stage");

    match write_listings(&root, &config.listing).await {
        Ok(directories) => {
            info!(
                export_history_id = %history.id,
                ?root,
                directories,
                "listing files generated"
            );
            output.print_message(&format!("Generated {}", export_path.display()));
            Ok(ListingOutcome::Generated { root, directories })
        }
        Err(e) => {
            warn!(
                export_history_id = %history.id,
                path = ?export_path,
                error = %e,
                "unable to write listing files"
            );
            output.print_message(&format!(
                "Unable to access/write listing files to '{}'. \
                 To generate listing files run the command below as a root user ",
                export_path.display()
            ));
            output.print_message(&format!(
                " {} content-export generate-listing --id {}",
                config.commands.program, history.id
            ));
            Ok(ListingOutcome::Inaccessible {
                path: export_path.to_path_buf(),
                reason: e.to_string(),
            })
        }
    }
}

/// Index every non-metadata directory under `root`, returning the number of listings written
///
/// Stops at the first filesystem error; listings written before it are kept.
async fn write_listings(root: &Path, config: &ListingConfig) -> std::io::Result<usize> {
    let mut directories = Vec::new();
    let mut metadata_dirs = Vec::new();
    collect_directories(
        root,
        &config.metadata_dir_name,
        &mut directories,
        &mut metadata_dirs,
    )
    .await?;

    let excluded = excluded_ancestors(root, &metadata_dirs);
    debug!(
        ?root,
        directories = directories.len(),
        metadata_dirs = metadata_dirs.len(),
        excluded = excluded.len(),
        "content tree scanned"
    );

    let mut written = 0;
    for dir in directories.iter().filter(|dir| !excluded.contains(*dir)) {
        let entries = listing_entries(dir, config).await?;
        tokio::fs::write(dir.join(&config.file_name), listing_contents(&entries)).await?;
        debug!(?dir, entries = entries.len(), "wrote listing");
        written += 1;
    }

    Ok(written)
}

/// Walk the tree once, collecting directories in pre-order
///
/// Metadata directories are recorded separately and not descended into, so
/// neither they nor anything below them ends up in `directories`. Symlinks to
/// directories are collected but not descended into either.
fn collect_directories<'a>(
    path: &'a Path,
    metadata_dir_name: &'a str,
    directories: &'a mut Vec<PathBuf>,
    metadata_dirs: &'a mut Vec<PathBuf>,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + 'a>> {
    Box::pin(async move {
        directories.push(path.to_path_buf());

        // (path, descend)
        let mut subdirs = Vec::new();
        let mut entries = tokio::fs::read_dir(path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                subdirs.push((entry.path(), true));
            } else if file_type.is_symlink() {
                // dangling links are plain entries
                let target_is_dir = tokio::fs::metadata(entry.path())
                    .await
                    .is_ok_and(|meta| meta.is_dir());
                if target_is_dir {
                    subdirs.push((entry.path(), false));
                }
            }
        }
        subdirs.sort();

        for (subdir, descend) in subdirs {
            if subdir.file_name().is_some_and(|n| n == metadata_dir_name) {
                metadata_dirs.push(subdir);
            } else if descend {
                collect_directories(&subdir, metadata_dir_name, directories, metadata_dirs)
                    .await?;
            } else {
                directories.push(subdir);
            }
        }

        Ok(())
    })
}

/// Ancestors of metadata directories strictly below `root`
fn excluded_ancestors(root: &Path, metadata_dirs: &[PathBuf]) -> HashSet<PathBuf> {
    let mut excluded = HashSet::new();
    for dir in metadata_dirs {
        for ancestor in dir.ancestors().skip(1) {
            if ancestor == root || !ancestor.starts_with(root) {
                break;
            }
            excluded.insert(ancestor.to_path_buf());
        }
    }
    excluded
}

/// Names of the immediate children of `dir`, sorted
async fn listing_entries(dir: &Path, config: &ListingConfig) -> std::io::Result<Vec<OsString>> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let hidden = name.as_encoded_bytes().starts_with(b".");
        if name == config.file_name.as_str() || (!config.include_hidden && hidden) {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}

/// Listing file contents: entry names as raw bytes, one per line
fn listing_contents(names: &[OsString]) -> Vec<u8> {
    let mut contents = Vec::new();
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            contents.push(b'\n');
        }
        contents.extend_from_slice(&name_bytes(name));
    }
    contents
}

#[cfg(unix)]
fn name_bytes(name: &OsStr) -> std::borrow::Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    std::borrow::Cow::Borrowed(name.as_bytes())
}

#[cfg(not(unix))]
fn name_bytes(name: &OsStr) -> std::borrow::Cow<'_, [u8]> {
    match name.to_string_lossy() {
        std::borrow::Cow::Borrowed(s) => std::borrow::Cow::Borrowed(s.as_bytes()),
        std::borrow::Cow::Owned(s) => std::borrow::Cow::Owned(s.into_bytes()),
    }
}
