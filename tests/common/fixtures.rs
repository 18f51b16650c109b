//! Export trees and records for integration tests

use export_reconcile::{ExportHistory, ExportHistoryId, Task, TaskResult};
use serde_json::json;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Create a syncable export layout under `base` and return its export path
///
/// ```text
/// export/content/ACME/Library/custom/prod/repo/repodata/repomd.xml
/// export/content/ACME/Library/custom/prod/repo/Packages/b/bash-5.1.rpm
/// export/content/ACME/Library/files/iso/disk.iso
/// export/content/ACME/Library/files/iso/.partial
/// ```
pub fn syncable_tree(base: &Path) -> PathBuf {
    let export = base.join("export");
    let library = export.join("content/ACME/Library");
    let repo = library.join("custom/prod/repo");

    std::fs::create_dir_all(repo.join("repodata")).unwrap();
    std::fs::create_dir_all(repo.join("Packages/b")).unwrap();
    std::fs::create_dir_all(library.join("files/iso")).unwrap();
    std::fs::write(repo.join("repodata/repomd.xml"), "<repomd/>").unwrap();
    std::fs::write(repo.join("Packages/b/bash-5.1.rpm"), "rpm").unwrap();
    std::fs::write(library.join("files/iso/disk.iso"), "iso").unwrap();
    std::fs::write(library.join("files/iso/.partial"), "").unwrap();
    export
}

/// Export history record as the server reports it
pub fn export_history(id: i64, format: &str, path: Option<&Path>) -> ExportHistory {
    serde_json::from_value(json!({
        "id": id,
        "path": path,
        "created_at": "2024-06-30T17:23:06Z",
        "metadata": {
            "format": format,
            "organization": {"name": "ACME", "label": "ACME"},
            "base_path": "ACME/Library",
            "repositories": {"custom/prod/repo": {"content_type": "yum"}},
            "incremental": false
        }
    }))
    .unwrap()
}

/// A finished task pointing at an export history record
pub fn finished_task(id: &str, export_history_id: i64) -> Task {
    Task::new(id, TaskResult::Success).with_export_history_id(ExportHistoryId(export_history_id))
}

/// Paths (relative to `base`) of every listing file below it, sorted
pub fn listing_files(base: &Path) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(base)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file() && e.file_name() == "listing")
        .map(|e| {
            e.path()
                .strip_prefix(base)
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    files.sort();
    files
}
