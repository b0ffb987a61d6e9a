use std::path::{Path, PathBuf};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use rollkit_core::adapter::{ExtractReport, TypeExtractor};
use rollkit_core::error::Result;
use rollkit_core::package::Package;
use tracing::{debug, warn};

use crate::process::ToolCommand;

static ERRORS_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(\d+) errors?").ok());
static WARNINGS_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(\d+) warnings?").ok());

/// Runs `api-extractor run --local --verbose` for a package.
pub struct ApiExtractor {
    root: PathBuf,
}

impl ApiExtractor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

fn count(re: &Lazy<Option<Regex>>, line: &str) -> Option<usize> {
    re.as_ref()?
        .captures(line)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}

/// Reads error and warning counts from the "API Extractor completed" line.
pub fn parse_report(success: bool, output: &str) -> ExtractReport {
    let summary = output
        .lines()
        .rev()
        .find(|line| line.contains("API Extractor completed"))
        .unwrap_or("");

    let error_count = count(&ERRORS_RE, summary).unwrap_or(if success { 0 } else { 1 });
    let warning_count = count(&WARNINGS_RE, summary).unwrap_or(0);

    ExtractReport {
        succeeded: success && error_count == 0,
        error_count,
        warning_count,
    }
}

#[async_trait]
impl TypeExtractor for ApiExtractor {
    async fn extract(&self, package: &Package, config_path: &Path) -> Result<ExtractReport> {
        let captured = ToolCommand::new("api-extractor", &self.root, &package.name)?
            .current_dir(&package.path)
            .args(["run", "--local", "--verbose", "--config"])
            .arg(config_path)
            .capture()
            .await?;

        for line in captured.stdout.lines().filter(|l| !l.trim().is_empty()) {
            debug!(package = %package.name, "{}", line);
        }
        for line in captured.stderr.lines().filter(|l| !l.trim().is_empty()) {
            warn!(package = %package.name, "{}", line);
        }

        let combined = format!("{}\n{}", captured.stdout, captured.stderr);
        Ok(parse_report(captured.success, &combined))
    }
}
