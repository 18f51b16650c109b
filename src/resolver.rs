//! Export outcome resolution
//!
//! Turns a submitted export task into the export history record describing
//! what was written, or into the reason that record cannot be used:
//!
//! ```text
//! Submitted ──async──▶ Deferred
//!     │
//!     └──re-fetch──▶ Polled ──▶ Resolved | Unresolvable | Failed (error)
//! ```

use crate::api::ExportApi;
use crate::config::Config;
use crate::error::{ExportError, Result};
use crate::output::Output;
use crate::types::{ExportFormat, ExportHistory, ExportHistoryId, Task, TaskId, TaskRef};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Terminal, non-error states of resolution
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    /// The caller asked not to wait; reconciliation is left to a follow-up command
    Deferred {
        /// The submitted task
        task_id: TaskId,
    },
    /// The export history record was loaded
    Resolved(ExportHistory),
    /// The task succeeded but its export history record cannot be located
    Unresolvable {
        /// The task the record was looked up from
        task_id: TaskId,
        /// The back-reference found in the task output, if any
        export_history_id: Option<ExportHistoryId>,
    },
}

impl Resolution {
    /// The resolved record, if any
    pub fn history(&self) -> Option<&ExportHistory> {
        match self {
            Resolution::Resolved(history) => Some(history),
            _ => None,
        }
    }
}

/// Resolves submitted export tasks to export history records
pub struct ExportOutcomeResolver {
    api: Arc<dyn ExportApi>,
    output: Arc<dyn Output>,
    config: Arc<Config>,
}

impl ExportOutcomeResolver {
    /// Create a new resolver
    pub fn new(api: Arc<dyn ExportApi>, output: Arc<dyn Output>, config: Arc<Config>) -> Self {
        Self {
            api,
            output,
            config,
        }
    }

    /// Resolve a just-submitted task
    ///
    /// In async mode nothing is fetched; the user is told which follow-up
    /// command finalizes the export once the task is done. Otherwise the task
    /// is re-fetched and its export history record looked up.
    ///
    /// # Errors
    ///
    /// [`ExportError::TaskFailed`] if the task ended in `error` or `warning`;
    /// collaborator errors are propagated.
    pub async fn resolve(
        &self,
        task: &TaskRef,
        format: ExportFormat,
        async_mode: bool,
    ) -> Result<Resolution> {
        let task_id = task.id();

        if async_mode {
            info!(%task_id, "async export requested, deferring reconciliation");
            self.emit_async_info(task_id, format);
            return Ok(Resolution::Deferred {
                task_id: task_id.clone(),
            });
        }

        self.resolve_task(task_id).await
    }

    /// Re-fetch a task and look up the export history record it produced
    pub async fn resolve_task(&self, task_id: &TaskId) -> Result<Resolution> {
        let task = self.api.fetch_task(task_id).await?;
        debug!(%task_id, result = %task.result, state = ?task.state, "task reloaded");
        self.resolve_polled(task).await
    }

    async fn resolve_polled(&self, task: Task) -> Result<Resolution> {
        if task.result.is_failure() {
            warn!(task_id = %task.id, result = %task.result, "export task did not succeed");
            return Err(ExportError::TaskFailed {
                task_id: task.id,
                result: task.result,
            }
            .into());
        }

        let Some(export_history_id) = task.export_history_id() else {
            warn!(task_id = %task.id, "task output has no export history id");
            return Ok(Resolution::Unresolvable {
                task_id: task.id,
                export_history_id: None,
            });
        };

        match self.api.fetch_export_history(export_history_id).await? {
            Some(history) => {
                info!(
                    task_id = %task.id,
                    export_history_id = %history.id,
                    path = ?history.path,
                    created_at = ?history.created_at,
                    "export history resolved"
                );
                Ok(Resolution::Resolved(history))
            }
            None => {
                warn!(
                    task_id = %task.id,
                    %export_history_id,
                    "export history record not found"
                );
                Ok(Resolution::Unresolvable {
                    task_id: task.id,
                    export_history_id: Some(export_history_id),
                })
            }
        }
    }

    /// Look up an export history record directly by id
    pub async fn fetch_history(&self, id: ExportHistoryId) -> Result<Option<ExportHistory>> {
        self.api.fetch_export_history(id).await
    }

    fn emit_async_info(&self, task_id: &TaskId, format: ExportFormat) {
        let program = &self.config.commands.program;
        if format.is_syncable() {
            self.output.print_message(
                "Once the task completes the listing files may be generated with the command:",
            );
            self.output.print_message(&format!(
                " {program} content-export generate-listing --task-id {task_id}"
            ));
        } else {
            self.output.print_message(
                "Once the task completes the export metadata must be generated with the command:",
            );
            self.output.print_message(&format!(
                " {program} content-export generate-metadata --task-id {task_id}"
            ));
        }
    }
}
