//! Traits for reporting build and release progress.
//!
//! These let the core library report what it is doing without writing to
//! stdout/stderr itself; the CLI supplies colored implementations.

use crate::adapter::ExtractReport;
use crate::build::BuildOutcome;

pub trait BuildReporter: Send + Sync {
    fn package_started(&self, target: &str);
    fn package_finished(&self, target: &str, outcome: &BuildOutcome);
    /// Called before declaration rollup for a package.
    fn types_started(&self, target: &str);
    fn types_finished(&self, target: &str, report: &ExtractReport);
}

pub trait ReleaseReporter: Send + Sync {
    /// Announces a release step ("Updating cross dependencies...").
    fn step(&self, message: &str);
    /// Supplementary line under the current step.
    fn note(&self, message: &str);
    /// Reports a rewritten internal dependency.
    ///
    /// # Arguments
    ///
    /// * `package` - Name of the manifest being updated
    /// * `dep_type` - `dependencies` or `peerDependencies`
    /// * `dependency` - The internal dependency that was pinned
    /// * `version` - The version it now points to
    fn dependency_updated(&self, package: &str, dep_type: &str, dependency: &str, version: &str);
    fn published(&self, package: &str, version: &str);
    fn already_published(&self, package: &str);
}

/// Reporter that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl BuildReporter for SilentReporter {
    fn package_started(&self, _target: &str) {}
    fn package_finished(&self, _target: &str, _outcome: &BuildOutcome) {}
    fn types_started(&self, _target: &str) {}
    fn types_finished(&self, _target: &str, _report: &ExtractReport) {}
}

impl ReleaseReporter for SilentReporter {
    fn step(&self, _message: &str) {}
    fn note(&self, _message: &str) {}
    fn dependency_updated(&self, _package: &str, _dep_type: &str, _dependency: &str, _version: &str) {}
    fn published(&self, _package: &str, _version: &str) {}
    fn already_published(&self, _package: &str) {}
}
