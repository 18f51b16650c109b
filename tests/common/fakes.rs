//! In-memory collaborators standing in for the host environment

use async_trait::async_trait;
use export_reconcile::{
    Error, ExportApi, ExportHistory, ExportHistoryId, ExportRequest, Output, Repository,
    RepositoryFilter, RepositoryId, Result, Table, Task, TaskId, TaskRef,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Server state served by [`InMemoryApi`]
#[derive(Default)]
struct ServerState {
    tasks: HashMap<TaskId, Task>,
    histories: HashMap<ExportHistoryId, ExportHistory>,
    repositories: Vec<Repository>,
    next_task: Option<TaskId>,
    submitted: Vec<ExportRequest>,
    history_lookups: Vec<ExportHistoryId>,
    task_lookups: Vec<TaskId>,
}

/// Minimal stand-in for the content-management server
#[derive(Clone, Default)]
pub struct InMemoryApi {
    state: Arc<Mutex<ServerState>>,
}

impl InMemoryApi {
    /// Serve `task` from `fetch_task` and hand out its id on the next submission
    pub fn with_task(self, task: Task) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.next_task = Some(task.id.clone());
            state.tasks.insert(task.id.clone(), task);
        }
        self
    }

    pub fn with_history(self, history: ExportHistory) -> Self {
        self.state
            .lock()
            .unwrap()
            .histories
            .insert(history.id, history);
        self
    }

    pub fn with_repository(self, repo: Repository) -> Self {
        self.state.lock().unwrap().repositories.push(repo);
        self
    }

    pub fn submitted(&self) -> Vec<ExportRequest> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn history_lookups(&self) -> Vec<ExportHistoryId> {
        self.state.lock().unwrap().history_lookups.clone()
    }

    pub fn task_lookups(&self) -> Vec<TaskId> {
        self.state.lock().unwrap().task_lookups.clone()
    }
}

#[async_trait]
impl ExportApi for InMemoryApi {
    async fn submit_export(&self, request: &ExportRequest) -> Result<TaskRef> {
        let mut state = self.state.lock().unwrap();
        state.submitted.push(request.clone());
        state
            .next_task
            .clone()
            .map(TaskRef::Id)
            .ok_or_else(|| Error::Api("task system unavailable".into()))
    }

    async fn fetch_task(&self, id: &TaskId) -> Result<Task> {
        let mut state = self.state.lock().unwrap();
        state.task_lookups.push(id.clone());
        state
            .tasks
            .get(id)
            .cloned()
            .ok_or_else(|| Error::Api(format!("task {id} not found")))
    }

    async fn fetch_export_history(&self, id: ExportHistoryId) -> Result<Option<ExportHistory>> {
        let mut state = self.state.lock().unwrap();
        state.history_lookups.push(id);
        Ok(state.histories.get(&id).cloned())
    }

    async fn fetch_repository(&self, id: RepositoryId) -> Result<Repository> {
        self.state
            .lock()
            .unwrap()
            .repositories
            .iter()
            .find(|repo| repo.id == id)
            .cloned()
            .ok_or_else(|| Error::Api(format!("repository {id} not found")))
    }

    async fn list_repositories(&self, _filter: &RepositoryFilter) -> Result<Vec<Repository>> {
        // mimics the server-side "download_policy != immediate" search
        Ok(self
            .state
            .lock()
            .unwrap()
            .repositories
            .iter()
            .filter(|repo| !repo.download_policy.is_immediate())
            .cloned()
            .collect())
    }
}

/// Everything printed, in order, with its channel
#[derive(Clone, Debug, PartialEq)]
pub enum Printed {
    Message(String),
    Error(String),
    Table(Table),
}

/// `Output` that records what the user would have seen
#[derive(Clone, Default)]
pub struct CapturingOutput {
    printed: Arc<Mutex<Vec<Printed>>>,
}

impl CapturingOutput {
    pub fn printed(&self) -> Vec<Printed> {
        self.printed.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.printed()
            .into_iter()
            .filter_map(|p| match p {
                Printed::Message(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.printed()
            .into_iter()
            .filter_map(|p| match p {
                Printed::Error(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn tables(&self) -> Vec<Table> {
        self.printed()
            .into_iter()
            .filter_map(|p| match p {
                Printed::Table(t) => Some(t),
                _ => None,
            })
            .collect()
    }
}

impl Output for CapturingOutput {
    fn print_message(&self, message: &str) {
        self.printed
            .lock()
            .unwrap()
            .push(Printed::Message(message.to_string()));
    }

    fn print_error(&self, message: &str) {
        self.printed
            .lock()
            .unwrap()
            .push(Printed::Error(message.to_string()));
    }

    fn print_table(&self, table: &Table) {
        self.printed
            .lock()
            .unwrap()
            .push(Printed::Table(table.clone()));
    }
}
