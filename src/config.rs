//! Configuration types for export-reconcile

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Listing file generation settings
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Directory under the export path holding exported content (default: "content")
    #[serde(default = "default_content_dir")]
    pub content_dir: String,

    /// Name of the index file written into each directory (default: "listing")
    #[serde(default = "default_listing_file")]
    pub file_name: String,

    /// Name of package-repository metadata directories excluded from indexing (default: "repodata")
    #[serde(default = "default_metadata_dir")]
    pub metadata_dir_name: String,

    /// List entries whose names start with a dot (default: false)
    #[serde(default)]
    pub include_hidden: bool,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            file_name: default_listing_file(),
            metadata_dir_name: default_metadata_dir(),
            include_hidden: false,
        }
    }
}

/// Metadata document generation settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// File name written into the export path (default: "metadata.json")
    #[serde(default = "default_metadata_file")]
    pub file_name: String,

    /// Directory for `metadata-<id>.json` when the export path is not writable
    ///
    /// `None` means the current working directory.
    #[serde(default)]
    pub fallback_dir: Option<PathBuf>,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            file_name: default_metadata_file(),
            fallback_dir: None,
        }
    }
}

impl MetadataConfig {
    /// Resolve the fallback directory, defaulting to the working directory
    pub fn resolve_fallback_dir(&self) -> Result<PathBuf> {
        match &self.fallback_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }
}

/// How follow-up and remediation commands are printed
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Program name prefixed to printed commands (default: "hammer")
    #[serde(default = "default_program")]
    pub program: String,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
        }
    }
}

/// Main configuration for export reconciliation
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Listing file generation
    #[serde(default)]
    pub listing: ListingConfig,

    /// Metadata document generation
    #[serde(default)]
    pub metadata: MetadataConfig,

    /// Printed command formatting
    #[serde(default)]
    pub commands: CommandConfig,
}

impl Config {
    /// Parse a JSON configuration document and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that all configured names are usable as single path components
    pub fn validate(&self) -> Result<()> {
        check_file_name("listing.content_dir", &self.listing.content_dir)?;
        check_file_name("listing.file_name", &self.listing.file_name)?;
        check_file_name("listing.metadata_dir_name", &self.listing.metadata_dir_name)?;
        check_file_name("metadata.file_name", &self.metadata.file_name)?;

        if self.commands.program.trim().is_empty() {
            return Err(Error::Config {
                message: "program name must not be empty".to_string(),
                key: Some("commands.program".to_string()),
            });
        }

        Ok(())
    }
}

fn check_file_name(key: &str, value: &str) -> Result<()> {
    let reason = if value.is_empty() {
        Some("must not be empty")
    } else if value.contains(['/', '\\']) {
        Some("must not contain path separators")
    } else if value == "." || value == ".." {
        Some("must not be a relative path component")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::Config {
            message: format!("'{value}' {reason}"),
            key: Some(key.to_string()),
        }),
        None => Ok(()),
    }
}

// Default value functions
fn default_content_dir() -> String {
    "content".into()
}

fn default_listing_file() -> String {
    "listing".into()
}

fn default_metadata_dir() -> String {
    "repodata".into()
}

fn default_metadata_file() -> String {
    "metadata.json".into()
}

fn default_program() -> String {
    "hammer".into()
}
