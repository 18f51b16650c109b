//! Core types for export-reconcile

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Identifier of an asynchronous export task (a UUID in the host system)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Create a new TaskId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Get the inner i64 value
            pub fn get(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }
    };
}

numeric_id!(
    /// Identifier of an export history record
    ExportHistoryId
);
numeric_id!(
    /// Identifier of a repository
    RepositoryId
);
numeric_id!(
    /// Identifier of an organization
    OrganizationId
);
numeric_id!(
    /// Identifier of a content view version
    ContentViewVersionId
);

/// Result of an export task as reported by the task system
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskResult {
    /// Task finished without problems
    Success,
    /// Task finished but reported warnings
    Warning,
    /// Task failed
    Error,
    /// Task has not reached a terminal result yet (also used for unknown values)
    #[default]
    #[serde(other)]
    Pending,
}

impl TaskResult {
    /// Whether the result makes the task unusable for export history lookup
    pub fn is_failure(&self) -> bool {
        matches!(self, TaskResult::Error | TaskResult::Warning)
    }

    /// Lowercase name as used by the task system
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskResult::Success => "success",
            TaskResult::Warning => "warning",
            TaskResult::Error => "error",
            TaskResult::Pending => "pending",
        }
    }
}

impl std::fmt::Display for TaskResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn null_as_pending<'de, D>(deserializer: D) -> Result<TaskResult, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<TaskResult>::deserialize(deserializer)?.unwrap_or_default())
}

/// An asynchronous export task
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Task identifier
    pub id: TaskId,
    /// Terminal result (or pending)
    #[serde(default, deserialize_with = "null_as_pending")]
    pub result: TaskResult,
    /// Free-form execution state (e.g. "running", "stopped")
    #[serde(default)]
    pub state: Option<String>,
    /// Task output payload
    #[serde(default)]
    pub output: Map<String, Value>,
}

impl Task {
    /// Create a task with an empty output payload
    pub fn new(id: impl Into<TaskId>, result: TaskResult) -> Self {
        Self {
            id: id.into(),
            result,
            state: None,
            output: Map::new(),
        }
    }

    /// Attach the export history back-reference to the output payload
    pub fn with_export_history_id(mut self, id: ExportHistoryId) -> Self {
        self.output
            .insert("export_history_id".to_string(), Value::from(id.get()));
        self
    }

    /// Read the export history back-reference from the output payload
    ///
    /// Accepts both numeric and numeric-string values; anything else counts as absent.
    pub fn export_history_id(&self) -> Option<ExportHistoryId> {
        match self.output.get("export_history_id")? {
            Value::Number(n) => n.as_i64().map(ExportHistoryId),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Reference to a submitted task: either its id or the full task object
#[derive(Clone, Debug, PartialEq)]
pub enum TaskRef {
    /// Bare task identifier
    Id(TaskId),
    /// Full task object as returned at submission
    Task(Task),
}

impl TaskRef {
    /// The task identifier, regardless of representation
    pub fn id(&self) -> &TaskId {
        match self {
            TaskRef::Id(id) => id,
            TaskRef::Task(task) => &task.id,
        }
    }
}

impl From<TaskId> for TaskRef {
    fn from(id: TaskId) -> Self {
        TaskRef::Id(id)
    }
}

impl From<Task> for TaskRef {
    fn from(task: Task) -> Self {
        TaskRef::Task(task)
    }
}

/// Export output layout
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Layout for content-synchronization tooling, indexed with listing files
    Syncable,
    /// Archive layout consumed by the importer, described by a metadata document
    #[default]
    Importable,
}

impl ExportFormat {
    /// Whether this is the syncable layout
    pub fn is_syncable(&self) -> bool {
        matches!(self, ExportFormat::Syncable)
    }
}

/// Durable record describing a completed export
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportHistory {
    /// Record identifier
    pub id: ExportHistoryId,
    /// Export metadata; kept opaque so serialization preserves every field
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Location the exported content was written to
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Creation time, if reported
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ExportHistory {
    /// The raw `metadata.format` value, if present
    pub fn format_name(&self) -> Option<&str> {
        self.metadata.get("format").and_then(Value::as_str)
    }

    /// Declared format; anything other than `syncable` is treated as importable
    pub fn format(&self) -> ExportFormat {
        match self.format_name() {
            Some("syncable") => ExportFormat::Syncable,
            _ => ExportFormat::Importable,
        }
    }

    /// Export path, treating an empty path as absent
    pub fn path(&self) -> Option<&Path> {
        self.path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}

/// Repository download policy
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DownloadPolicy {
    /// All content is fetched during sync
    #[default]
    Immediate,
    /// Content is fetched lazily when first requested
    OnDemand,
    /// Content is fetched lazily in the background
    Background,
    /// Any other policy reported by the server
    Other(String),
}

impl DownloadPolicy {
    /// Only immediate repositories are fully exportable
    pub fn is_immediate(&self) -> bool {
        matches!(self, DownloadPolicy::Immediate)
    }

    /// Policy name as used by the server
    pub fn as_str(&self) -> &str {
        match self {
            DownloadPolicy::Immediate => "immediate",
            DownloadPolicy::OnDemand => "on_demand",
            DownloadPolicy::Background => "background",
            DownloadPolicy::Other(s) => s,
        }
    }
}

impl From<String> for DownloadPolicy {
    fn from(value: String) -> Self {
        match value.as_str() {
            "immediate" => DownloadPolicy::Immediate,
            "on_demand" => DownloadPolicy::OnDemand,
            "background" => DownloadPolicy::Background,
            _ => DownloadPolicy::Other(value),
        }
    }
}

impl From<&str> for DownloadPolicy {
    fn from(value: &str) -> Self {
        DownloadPolicy::from(value.to_string())
    }
}

impl From<DownloadPolicy> for String {
    fn from(policy: DownloadPolicy) -> Self {
        policy.as_str().to_string()
    }
}

impl std::fmt::Display for DownloadPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repository as seen by the eligibility check
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    /// Repository identifier
    pub id: RepositoryId,
    /// Repository name
    pub name: String,
    /// Owning product name
    #[serde(default)]
    pub product: Option<String>,
    /// Content type (e.g. "yum", "file")
    #[serde(default)]
    pub content_type: Option<String>,
    /// Upstream URL
    #[serde(default)]
    pub url: Option<String>,
    /// Download policy
    #[serde(default)]
    pub download_policy: DownloadPolicy,
}

impl Repository {
    /// Create a repository with the given policy and no display fields
    pub fn new(
        id: impl Into<RepositoryId>,
        name: impl Into<String>,
        download_policy: impl Into<DownloadPolicy>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            product: None,
            content_type: None,
            url: None,
            download_policy: download_policy.into(),
        }
    }

    /// Whether this repository cannot be fully exported
    pub fn is_unexportable(&self) -> bool {
        !self.download_policy.is_immediate()
    }
}

/// What an export command exports
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum ExportScope {
    /// A single repository
    Repository {
        /// Repository to export
        repository_id: RepositoryId,
    },
    /// The repositories of a content view version
    Version {
        /// Content view version to export
        content_view_version_id: ContentViewVersionId,
    },
    /// An organization's whole library environment
    Library {
        /// Organization whose library is exported
        organization_id: OrganizationId,
    },
}

impl ExportScope {
    /// Short scope name, used in logs and error codes
    pub fn name(&self) -> &'static str {
        match self {
            ExportScope::Repository { .. } => "repository",
            ExportScope::Version { .. } => "version",
            ExportScope::Library { .. } => "library",
        }
    }

    /// Message printed once the export task has been submitted
    pub fn success_message(&self, task_id: &TaskId) -> String {
        match self {
            ExportScope::Repository { .. } => {
                format!("Repository is being exported in task {task_id}.")
            }
            ExportScope::Version { .. } => {
                format!("Content view version is being exported in task {task_id}.")
            }
            ExportScope::Library { .. } => {
                format!("Library environment is being exported in task {task_id}.")
            }
        }
    }

    /// Message printed when the export task could not be submitted
    pub fn failure_message(&self) -> &'static str {
        match self {
            ExportScope::Repository { .. } => "Could not export the repository",
            ExportScope::Version { .. } => "Could not export the content view version",
            ExportScope::Library { .. } => "Could not export the library",
        }
    }
}

impl std::fmt::Display for ExportScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A complete export invocation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    /// What to export
    pub scope: ExportScope,
    /// Requested output layout
    #[serde(default)]
    pub format: ExportFormat,
    /// Abort when any repository in scope is unexportable
    #[serde(default)]
    pub fail_on_missing_content: bool,
    /// Submit and return without waiting for reconciliation
    #[serde(default)]
    pub async_mode: bool,
}

impl ExportRequest {
    /// Export a single repository
    pub fn repository(repository_id: impl Into<RepositoryId>) -> Self {
        Self::new(ExportScope::Repository {
            repository_id: repository_id.into(),
        })
    }

    /// Export a content view version
    pub fn version(content_view_version_id: impl Into<ContentViewVersionId>) -> Self {
        Self::new(ExportScope::Version {
            content_view_version_id: content_view_version_id.into(),
        })
    }

    /// Export an organization's library
    pub fn library(organization_id: impl Into<OrganizationId>) -> Self {
        Self::new(ExportScope::Library {
            organization_id: organization_id.into(),
        })
    }

    fn new(scope: ExportScope) -> Self {
        Self {
            scope,
            format: ExportFormat::default(),
            fail_on_missing_content: false,
            async_mode: false,
        }
    }

    /// Set the output layout
    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    /// Abort if any repository in scope is unexportable
    pub fn fail_on_missing_content(mut self, fail: bool) -> Self {
        self.fail_on_missing_content = fail;
        self
    }

    /// Return right after submission
    pub fn async_mode(mut self, async_mode: bool) -> Self {
        self.async_mode = async_mode;
        self
    }
}

/// Repository query used for multi-repository eligibility checks
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryFilter {
    /// Restrict to repositories in the library environment
    pub library: bool,
    /// Restrict to a content type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Server-side search expression
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Restrict to a content view version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_view_version_id: Option<ContentViewVersionId>,
    /// Restrict to an organization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<OrganizationId>,
}

impl RepositoryFilter {
    /// Non-immediate yum repositories in the library, without a scope restriction
    pub fn unexportable() -> Self {
        Self {
            library: true,
            content_type: Some("yum".to_string()),
            search: Some("download_policy != immediate".to_string()),
            content_view_version_id: None,
            organization_id: None,
        }
    }
}

/// How a follow-up command locates the export to finalize
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HistoryTarget {
    /// Via the export task's output payload
    Task(TaskId),
    /// Directly by export history id
    Id(ExportHistoryId),
}

/// Process exit status reported to the host framework (sysexits values)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitStatus {
    /// Command completed
    Ok,
    /// Internal software error, also used for eligibility hard stops
    Software,
    /// Output could not be created
    CantCreate,
}

impl ExitStatus {
    /// Numeric exit code
    pub fn code(&self) -> i32 {
        match self {
            ExitStatus::Ok => 0,
            ExitStatus::Software => 70,
            ExitStatus::CantCreate => 73,
        }
    }

    /// Whether this is a successful status
    pub fn is_ok(&self) -> bool {
        matches!(self, ExitStatus::Ok)
    }
}

impl From<ExitStatus> for i32 {
    fn from(status: ExitStatus) -> Self {
        status.code()
    }
}
