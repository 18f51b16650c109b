//! Metadata document generation for importable exports

use super::MetadataOutcome;
use crate::config::Config;
use crate::error::Result;
use crate::output::Output;
use crate::types::ExportHistory;
use std::io;
use tracing::{debug, info, warn};

/// Execute the metadata stage
pub(crate) async fn run_metadata_stage(
    history: &ExportHistory,
    output: &dyn Output,
    config: &Config,
) -> Result<MetadataOutcome> {
    let metadata_json = serde_json::to_string(&history.metadata)?;
    debug!(
        export_history_id = %history.id,
        bytes = metadata_json.len(),
        "running metadata stage"
    );

    let primary = match history.path() {
        Some(path) => {
            let metadata_path = path.join(&config.metadata.file_name);
            tokio::fs::write(&metadata_path, &metadata_json)
                .await
                .map(|()| metadata_path)
        }
        None => Err(io::Error::new(
            io::ErrorKind::NotFound,
            "export history has no path",
        )),
    };

    let reason = match primary {
        Ok(metadata_path) => {
            info!(export_history_id = %history.id, path = ?metadata_path, "metadata written");
            output.print_message(&format!("Generated {}", metadata_path.display()));
            return Ok(MetadataOutcome::Written(metadata_path));
        }
        Err(e) => e,
    };

    let fallback_path = config
        .metadata
        .resolve_fallback_dir()?
        .join(format!("metadata-{}.json", history.id));
    warn!(
        export_history_id = %history.id,
        path = ?history.path,
        fallback = ?fallback_path,
        error = %reason,
        "export path not writable, writing metadata to fallback location"
    );

    tokio::fs::write(&fallback_path, &metadata_json).await?;

    let shown_path = history
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    output.print_message(&format!(
        "Unable to access/write to '{}'. Generated '{}' instead. \
         This file is necessary to perform an import.",
        shown_path,
        fallback_path.display()
    ));

    Ok(MetadataOutcome::Fallback {
        path: fallback_path,
        reason: reason.to_string(),
    })
}
