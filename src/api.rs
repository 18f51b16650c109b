//! Host API collaborator trait
//!
//! Request construction, authentication and transport belong to the host
//! environment. The reconciliation core only needs the operations below.

use crate::types::{
    ExportHistory, ExportHistoryId, ExportRequest, Repository, RepositoryFilter, RepositoryId,
    Task, TaskId, TaskRef,
};
use async_trait::async_trait;

/// Operations the export workflow consumes from the content-management server
///
/// Implementations report transport or server failures as
/// [`Error::Api`](crate::Error::Api).
///
/// # Examples
///
/// ```no_run
/// use export_reconcile::api::ExportApi;
/// use export_reconcile::types::TaskId;
///
/// # async fn example(api: &dyn ExportApi) -> export_reconcile::Result<()> {
/// let task = api.fetch_task(&TaskId::from("8d7c3c1e")).await?;
/// if let Some(id) = task.export_history_id() {
///     let history = api.fetch_export_history(id).await?;
///     println!("export written to {:?}", history.and_then(|h| h.path));
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ExportApi: Send + Sync {
    /// Submit an export task for the request's scope
    ///
    /// Returns as soon as the task is accepted; the task may still be running.
    async fn submit_export(&self, request: &ExportRequest) -> crate::Result<TaskRef>;

    /// Fetch the latest state of a task
    async fn fetch_task(&self, id: &TaskId) -> crate::Result<Task>;

    /// Look up an export history record
    ///
    /// Returns `Ok(None)` when no record with this id exists.
    async fn fetch_export_history(
        &self,
        id: ExportHistoryId,
    ) -> crate::Result<Option<ExportHistory>>;

    /// Fetch a single repository
    async fn fetch_repository(&self, id: RepositoryId) -> crate::Result<Repository>;

    /// List repositories matching a filter
    async fn list_repositories(&self, filter: &RepositoryFilter)
    -> crate::Result<Vec<Repository>>;
}
