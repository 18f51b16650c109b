//! Pre-export eligibility check
//!
//! Repositories that do not use the `immediate` download policy only hold part
//! of their content locally and therefore cannot be fully exported. Before an
//! export task is submitted, the repositories in scope are checked and any
//! unexportable ones are reported to the user.

use crate::api::ExportApi;
use crate::config::Config;
use crate::error::{ExportError, Result};
use crate::output::{Output, Table};
use crate::types::{ExportScope, Repository, RepositoryFilter};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of an eligibility check that allows the export to proceed
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EligibilityReport {
    /// Repositories in scope that cannot be fully exported
    pub unexportable: Vec<Repository>,
}

impl EligibilityReport {
    /// Whether every repository in scope is fully exportable
    pub fn is_clean(&self) -> bool {
        self.unexportable.is_empty()
    }
}

/// Classifies the repositories of an export scope by download policy
pub struct EligibilityClassifier {
    api: Arc<dyn ExportApi>,
    output: Arc<dyn Output>,
    config: Arc<Config>,
}

impl EligibilityClassifier {
    /// Create a new classifier
    pub fn new(api: Arc<dyn ExportApi>, output: Arc<dyn Output>, config: Arc<Config>) -> Self {
        Self {
            api,
            output,
            config,
        }
    }

    /// Check the scope and report unexportable repositories
    ///
    /// Prints an advisory when any repository is unexportable. For a
    /// single-repository scope, or when `fail_on_missing_content` is set, the
    /// advisory is followed by [`ExportError::Ineligible`] and the export must
    /// not be submitted.
    pub async fn check(
        &self,
        scope: &ExportScope,
        fail_on_missing_content: bool,
    ) -> Result<EligibilityReport> {
        let unexportable = self.fetch_unexportable(scope).await?;

        if unexportable.is_empty() {
            debug!(%scope, "all repositories in scope are exportable");
            return Ok(EligibilityReport::default());
        }

        self.print_advisory(scope, &unexportable);

        let hard_stop = matches!(scope, ExportScope::Repository { .. }) || fail_on_missing_content;
        if hard_stop {
            warn!(
                %scope,
                count = unexportable.len(),
                fail_on_missing_content,
                "unexportable repositories in scope, refusing to export"
            );
            return Err(ExportError::Ineligible {
                scope: scope.name(),
                count: unexportable.len(),
            }
            .into());
        }

        info!(
            %scope,
            count = unexportable.len(),
            "unexportable repositories in scope, exporting anyway"
        );
        Ok(EligibilityReport { unexportable })
    }

    async fn fetch_unexportable(&self, scope: &ExportScope) -> Result<Vec<Repository>> {
        let repos = match *scope {
            ExportScope::Repository { repository_id } => {
                let repo = self.api.fetch_repository(repository_id).await?;
                vec![repo]
            }
            ExportScope::Version {
                content_view_version_id,
            } => {
                let filter = RepositoryFilter {
                    content_view_version_id: Some(content_view_version_id),
                    ..RepositoryFilter::unexportable()
                };
                self.api.list_repositories(&filter).await?
            }
            ExportScope::Library { organization_id } => {
                let filter = RepositoryFilter {
                    organization_id: Some(organization_id),
                    ..RepositoryFilter::unexportable()
                };
                self.api.list_repositories(&filter).await?
            }
        };

        // the server already filters multi-repository scopes; this keeps the
        // single-repository case and misbehaving servers consistent
        Ok(repos.into_iter().filter(Repository::is_unexportable).collect())
    }

    fn print_advisory(&self, scope: &ExportScope, repos: &[Repository]) {
        self.output.print_message(advisory_message(scope));
        self.output.print_message(
            "Use the following command to update the download policy of these repositories.",
        );
        self.output.print_message(&format!(
            "{} repository update --id=<REPOSITORY_ID> --download-policy='immediate'",
            self.config.commands.program
        ));
        self.output.print_message("");
        self.output.print_table(&Table::repositories(repos));
    }
}

fn advisory_message(scope: &ExportScope) -> &'static str {
    match scope {
        ExportScope::Version { .. } => {
            "NOTE: Unable to fully export this version because it contains repositories \
             without the 'immediate' download policy. Update the download policy and sync \
             affected repositories. Once synced republish the content view and export the \
             generated version."
        }
        ExportScope::Repository { .. } => {
            "NOTE: Unable to fully export this repository because it does not have the \
             'immediate' download policy. Update the download policy, sync the repository \
             and export."
        }
        ExportScope::Library { .. } => {
            "NOTE: Unable to fully export this organization's library because it contains \
             repositories without the 'immediate' download policy. Update the download policy \
             and sync affected repositories to include them in the export."
        }
    }
}
