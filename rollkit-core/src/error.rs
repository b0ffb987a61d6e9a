//! Error types and result aliases.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error in {context}: {error}")]
    Toml {
        error: toml::de::Error,
        context: String,
    },

    #[error("JSON error in {}: {error}", .path.display())]
    Json {
        error: serde_json::Error,
        path: PathBuf,
    },

    #[error("Manifest not found: {}. Expected 'package.json' in package directory.", .0.display())]
    ManifestNotFound(PathBuf),

    #[error("Target {partials} not found! Available targets: {available}")]
    TargetNotFound { partials: String, available: String },

    #[error("Invalid target pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Invalid format: \"{0}\". Supported formats: esm, cjs, global")]
    InvalidFormat(String),

    #[error("Invalid target version: {0}")]
    InvalidVersion(String),

    #[error("Invalid concurrency limit: {0}. Must be at least 1")]
    InvalidConcurrency(usize),

    #[error("Package directory already exists: {}", .0.display())]
    PackageExists(PathBuf),

    #[error("Tool '{tool}' not found in PATH")]
    ToolNotFound { tool: String },

    #[error("{tool} failed for {package} (exit code {code:?}){}", format_stderr(.stderr))]
    ToolFailed {
        tool: String,
        package: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Job panicked or was cancelled: {0}")]
    JobPanicked(String),

    #[error("Git error: {0}")]
    Git(String),

    #[error("Release error: {0}")]
    Release(String),
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}

impl Error {
    /// Returns `true` when a registry rejected a publish because the version already exists.
    pub fn is_previously_published(&self) -> bool {
        matches!(self, Error::ToolFailed { stderr, .. } if stderr.contains("previously published"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
