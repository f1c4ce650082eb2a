//! Run configuration.
//!
//! Everything is optional: without a file the compiled-in base directory
//! and handler list are used.
//!
//! ```toml
//! base_dir = "fastly"
//! files = ["block_fastly_service_acl.go"]
//! anchor_policy = "exact"
//! verify_output = true
//!
//! [conventions]
//! client_type = "*fastly.Client"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use attrsplit_engine::{AnchorPolicy, Conventions, Refactorer};
use attrsplit_foundation::{Error, Result};

/// Directory the handler files are resolved against by default.
pub const DEFAULT_BASE_DIR: &str = "fastly";

/// The service attribute handlers migrated by default.
pub const DEFAULT_FILES: &[&str] = &[
    "block_fastly_service_acl.go",
    "block_fastly_service_backend.go",
    "block_fastly_service_cachesetting.go",
    "block_fastly_service_condition.go",
    "block_fastly_service_dictionary.go",
    "block_fastly_service_director.go",
    "block_fastly_service_domain.go",
    "block_fastly_service_dynamicsnippet.go",
    "block_fastly_service_gzip.go",
    "block_fastly_service_header.go",
    "block_fastly_service_healthcheck.go",
    "block_fastly_service_requestsetting.go",
    "block_fastly_service_responseobject.go",
    "block_fastly_service_snippet.go",
    "block_fastly_service_vcl.go",
];

/// Configuration for one run over a list of handler files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory the entries of `files` are relative to.
    pub base_dir: PathBuf,
    /// Handler files, processed and printed in this order.
    pub files: Vec<PathBuf>,
    /// How anchor declarations are matched by name.
    pub anchor_policy: AnchorPolicy,
    /// Re-parse every printed file before accepting it.
    pub verify_output: bool,
    /// Names and types used by the rewrites.
    pub conventions: Conventions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            files: DEFAULT_FILES.iter().map(PathBuf::from).collect(),
            anchor_policy: AnchorPolicy::default(),
            verify_output: false,
            conventions: Conventions::default(),
        }
    }
}

impl Config {
    /// Loads and validates a TOML configuration file.
    ///
    /// # Errors
    /// Returns a configuration error if the file cannot be read, is not
    /// valid TOML, or fails [`Config::validate`].
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|err| {
            Error::config(format!("failed to read {}: {err}", path.display()))
        })?;
        let config: Self = toml::from_str(&text)
            .map_err(|err| Error::config(format!("{}: {}", path.display(), err.message())))?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    /// Returns a configuration error for malformed TOML, unknown keys, or
    /// an invalid configuration.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|err| Error::config(err.message()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that there is something to do and that every configured type
    /// parses.
    ///
    /// # Errors
    /// Returns a configuration error describing the first problem.
    pub fn validate(&self) -> Result<()> {
        if self.files.is_empty() {
            return Err(Error::config("no input files configured"));
        }
        self.conventions.validate()
    }

    /// Returns the input paths in processing order.
    #[must_use]
    pub fn inputs(&self) -> Vec<PathBuf> {
        self.files.iter().map(|file| self.base_dir.join(file)).collect()
    }

    /// Builds the refactorer this configuration describes.
    #[must_use]
    pub fn refactorer(&self) -> Refactorer {
        Refactorer::new()
            .with_conventions(self.conventions.clone())
            .with_policy(self.anchor_policy)
    }
}
