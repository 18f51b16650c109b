//! Export command orchestration
//!
//! Runs the steps of an export command strictly in order: eligibility check,
//! task submission, outcome resolution, output finalization. Also provides
//! the follow-up commands that finalize an export later, after an async
//! submission or a failed write.

use crate::api::ExportApi;
use crate::config::Config;
use crate::eligibility::EligibilityClassifier;
use crate::error::{Error, ExportError, Result, ToExitStatus};
use crate::finalizer::OutputFinalizer;
use crate::output::Output;
use crate::resolver::{ExportOutcomeResolver, Resolution};
use crate::types::{ExitStatus, ExportHistory, ExportRequest, HistoryTarget};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Runs export commands against a host API
///
/// # Example
///
/// ```no_run
/// use export_reconcile::{ConsoleOutput, Config, ContentExporter, ExportFormat, ExportRequest};
/// use export_reconcile::api::ExportApi;
/// use std::sync::Arc;
///
/// # async fn example(api: Arc<dyn ExportApi>) -> export_reconcile::Result<()> {
/// let exporter = ContentExporter::new(api, Arc::new(ConsoleOutput), Config::default())?;
///
/// let request = ExportRequest::library(1).with_format(ExportFormat::Syncable);
/// let status = exporter.run(&request).await;
/// std::process::exit(status.code());
/// # }
/// ```
pub struct ContentExporter {
    api: Arc<dyn ExportApi>,
    output: Arc<dyn Output>,
    classifier: EligibilityClassifier,
    resolver: ExportOutcomeResolver,
    finalizer: OutputFinalizer,
}

impl ContentExporter {
    /// Create an exporter after validating the configuration
    pub fn new(api: Arc<dyn ExportApi>, output: Arc<dyn Output>, config: Config) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);

        Ok(Self {
            classifier: EligibilityClassifier::new(api.clone(), output.clone(), config.clone()),
            resolver: ExportOutcomeResolver::new(api.clone(), output.clone(), config.clone()),
            finalizer: OutputFinalizer::new(output.clone(), config),
            api,
            output,
        })
    }

    /// Run an export end to end
    ///
    /// Hard stops, failed tasks, unresolvable history records and collaborator
    /// failures are errors; [`report`](Self::report) turns them into exit statuses.
    pub async fn export(&self, request: &ExportRequest) -> Result<ExitStatus> {
        info!(
            scope = %request.scope,
            format = ?request.format,
            async_mode = request.async_mode,
            "starting export"
        );

        self.classifier
            .check(&request.scope, request.fail_on_missing_content)
            .await?;

        let task = self.api.submit_export(request).await.map_err(|e| {
            Error::from(ExportError::SubmissionFailed {
                message: request.scope.failure_message(),
                reason: e.to_string(),
            })
        })?;
        info!(task_id = %task.id(), "export task submitted");
        self.output
            .print_message(&request.scope.success_message(task.id()));

        let resolution = self
            .resolver
            .resolve(&task, request.format, request.async_mode)
            .await?;

        match resolution {
            Resolution::Deferred { .. } => Ok(ExitStatus::Ok),
            Resolution::Resolved(history) => {
                self.finalizer.finalize(&history).await?;
                Ok(ExitStatus::Ok)
            }
            Resolution::Unresolvable {
                task_id,
                export_history_id,
            } => Err(ExportError::HistoryUnresolvable {
                task_id: Some(task_id),
                export_history_id,
            }
            .into()),
        }
    }

    /// Generate listing files for an already finished export
    pub async fn generate_listing(&self, target: &HistoryTarget) -> Result<ExitStatus> {
        let history = self.load_history(target).await?;
        self.finalizer.generate_listing(&history).await?;
        Ok(ExitStatus::Ok)
    }

    /// Generate the metadata document for an already finished export
    pub async fn generate_metadata(&self, target: &HistoryTarget) -> Result<ExitStatus> {
        let history = self.load_history(target).await?;
        self.finalizer.generate_metadata(&history).await?;
        Ok(ExitStatus::Ok)
    }

    /// [`export`](Self::export), reporting any error and returning the exit status
    pub async fn run(&self, request: &ExportRequest) -> ExitStatus {
        self.report(self.export(request).await)
    }

    /// Print an error result to the user and map it to an exit status
    pub fn report(&self, result: Result<ExitStatus>) -> ExitStatus {
        match result {
            Ok(status) => status,
            Err(e) => {
                let status = e.exit_status();
                error!(error = %e, code = e.error_code(), exit = status.code(), "export command failed");
                // the eligibility advisory has already been printed
                if !matches!(e, Error::Export(ExportError::Ineligible { .. })) {
                    self.output.print_error(&e.to_string());
                }
                status
            }
        }
    }

    async fn load_history(&self, target: &HistoryTarget) -> Result<ExportHistory> {
        let (task_id, export_history_id) = match target {
            HistoryTarget::Id(id) => match self.resolver.fetch_history(*id).await? {
                Some(history) => return Ok(history),
                None => (None, Some(*id)),
            },
            HistoryTarget::Task(task_id) => match self.resolver.resolve_task(task_id).await? {
                Resolution::Resolved(history) => return Ok(history),
                Resolution::Unresolvable {
                    export_history_id, ..
                } => (Some(task_id.clone()), export_history_id),
                Resolution::Deferred { .. } => (Some(task_id.clone()), None),
            },
        };

        warn!(?task_id, ?export_history_id, "export history not found");
        Err(ExportError::HistoryUnresolvable {
            task_id,
            export_history_id,
        }
        .into())
    }
}
