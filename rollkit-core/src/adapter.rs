//! Traits for the external tools the workspace drives.
//!
//! Core code never spawns processes itself. Bundling, declaration rollup,
//! publishing, lockfile and changelog maintenance, and version control are
//! delegated to implementations of these traits (see `rollkit-adapters`).

use std::path::Path;

use async_trait::async_trait;

use crate::build::BundleEnvironment;
use crate::dev::DevPlan;
use crate::error::Result;
use crate::package::Package;

/// Bundles one package.
#[async_trait]
pub trait Bundler: Send + Sync {
    fn name(&self) -> &'static str;
    async fn bundle(&self, package: &Package, env: &BundleEnvironment) -> Result<()>;
}

/// Outcome of a type-declaration rollup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractReport {
    pub succeeded: bool,
    pub error_count: usize,
    pub warning_count: usize,
}

/// Rolls up `.d.ts` declarations for one package.
///
/// A run that finishes with errors is reported through [`ExtractReport`];
/// `Err` is reserved for failures to run the tool at all.
#[async_trait]
pub trait TypeExtractor: Send + Sync {
    async fn extract(&self, package: &Package, config_path: &Path) -> Result<ExtractReport>;
}

/// Watch-mode bundler used by `dev`. Runs until stopped.
#[async_trait]
pub trait DevBundler: Send + Sync {
    async fn watch(&self, plan: &DevPlan) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Published,
    /// The registry already has this version.
    AlreadyPublished,
}

#[async_trait]
pub trait Registry: Send + Sync {
    async fn publish(
        &self,
        package: &Package,
        version: &str,
        tag: Option<&str>,
        access: &str,
    ) -> Result<PublishOutcome>;
}

/// Workspace package manager: changelog generation and lockfile refresh.
#[async_trait]
pub trait PackageManager: Send + Sync {
    async fn changelog(&self, root: &Path) -> Result<()>;
    async fn install(&self, root: &Path) -> Result<()>;
}

#[async_trait]
pub trait VersionControl: Send + Sync {
    /// First seven characters of the `HEAD` commit id.
    fn short_commit(&self, root: &Path) -> Result<String>;
    /// Whether the working tree differs from `HEAD`.
    fn has_changes(&self, root: &Path) -> Result<bool>;
    async fn commit_all(&self, root: &Path, message: &str) -> Result<()>;
    async fn tag(&self, root: &Path, tag: &str) -> Result<()>;
    async fn push_tag(&self, root: &Path, tag: &str) -> Result<()>;
    async fn push(&self, root: &Path) -> Result<()>;
}
