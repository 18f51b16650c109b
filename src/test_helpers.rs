//! Shared in-memory collaborators for unit tests.

use crate::api::ExportApi;
use crate::error::{Error, Result};
use crate::output::{Output, Table};
use crate::types::{
    ExportHistory, ExportHistoryId, ExportRequest, Repository, RepositoryFilter, RepositoryId,
    Task, TaskId, TaskRef,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Calls made against [`FakeApi`], in order
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ApiCall {
    Submit(ExportRequest),
    FetchTask(TaskId),
    FetchHistory(ExportHistoryId),
    FetchRepository(RepositoryId),
    ListRepositories(RepositoryFilter),
}

/// In-memory `ExportApi` that records every call
#[derive(Default)]
pub(crate) struct FakeApi {
    tasks: Mutex<HashMap<TaskId, Task>>,
    histories: Mutex<HashMap<ExportHistoryId, ExportHistory>>,
    repositories: Mutex<Vec<Repository>>,
    submission: Mutex<Option<std::result::Result<TaskRef, String>>>,
    calls: Mutex<Vec<ApiCall>>,
}

impl FakeApi {
    pub(crate) fn add_task(&self, task: Task) {
        self.tasks.lock().unwrap().insert(task.id.clone(), task);
    }

    pub(crate) fn add_history(&self, history: ExportHistory) {
        self.histories.lock().unwrap().insert(history.id, history);
    }

    pub(crate) fn add_repository(&self, repo: Repository) {
        self.repositories.lock().unwrap().push(repo);
    }

    pub(crate) fn submit_returns(&self, result: std::result::Result<TaskRef, String>) {
        *self.submission.lock().unwrap() = Some(result);
    }

    pub(crate) fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn repository_filters(&self) -> Vec<RepositoryFilter> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::ListRepositories(filter) => Some(filter),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn history_fetches(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, ApiCall::FetchHistory(_)))
            .count()
    }

    pub(crate) fn submissions(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, ApiCall::Submit(_)))
            .count()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ExportApi for FakeApi {
    async fn submit_export(&self, request: &ExportRequest) -> Result<TaskRef> {
        self.record(ApiCall::Submit(request.clone()));
        match self.submission.lock().unwrap().clone() {
            Some(Ok(task)) => Ok(task),
            Some(Err(reason)) => Err(Error::Api(reason)),
            None => Err(Error::Api("no submission configured".into())),
        }
    }

    async fn fetch_task(&self, id: &TaskId) -> Result<Task> {
        self.record(ApiCall::FetchTask(id.clone()));
        self.tasks
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::Api(format!("task {id} not found")))
    }

    async fn fetch_export_history(&self, id: ExportHistoryId) -> Result<Option<ExportHistory>> {
        self.record(ApiCall::FetchHistory(id));
        Ok(self.histories.lock().unwrap().get(&id).cloned())
    }

    async fn fetch_repository(&self, id: RepositoryId) -> Result<Repository> {
        self.record(ApiCall::FetchRepository(id));
        self.repositories
            .lock()
            .unwrap()
            .iter()
            .find(|repo| repo.id == id)
            .cloned()
            .ok_or_else(|| Error::Api(format!("repository {id} not found")))
    }

    async fn list_repositories(&self, filter: &RepositoryFilter) -> Result<Vec<Repository>> {
        self.record(ApiCall::ListRepositories(filter.clone()));
        Ok(self.repositories.lock().unwrap().clone())
    }
}

/// `Output` that keeps everything it is given
#[derive(Default)]
pub(crate) struct RecordedOutput {
    messages: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
    tables: Mutex<Vec<Table>>,
}

impl RecordedOutput {
    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub(crate) fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub(crate) fn tables(&self) -> Vec<Table> {
        self.tables.lock().unwrap().clone()
    }
}

impl Output for RecordedOutput {
    fn print_message(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }

    fn print_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn print_table(&self, table: &Table) {
        self.tables.lock().unwrap().push(table.clone());
    }
}
