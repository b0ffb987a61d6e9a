//! Command implementations for the CLI.

mod build;
mod create;
mod dev;
mod list;
mod prompt;
mod release;
mod reporters;

use std::path::Path;

use anyhow::{Context, Result};
use rollkit_adapters::Git;
use rollkit_core::{SiblingPolicy, TaskPool, VersionControl, Workspace};
use tracing::warn;

pub use build::cmd_build;
pub use create::cmd_create;
pub use dev::cmd_dev;
pub use list::cmd_list;
pub use release::{cmd_release, ReleaseArgs};

fn open_workspace(root: &Path) -> Result<Workspace> {
    Workspace::discover(root)
        .with_context(|| format!("Failed to open workspace at {}", root.display()))
}

/// Short `HEAD` commit stamped into bundles; `unknown` outside a repository.
fn current_commit(workspace: &Workspace) -> String {
    match Git::new().short_commit(workspace.root()) {
        Ok(commit) => commit,
        Err(error) => {
            warn!(%error, "could not read HEAD commit");
            "unknown".to_string()
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("Failed to create tokio runtime")
}

/// Pool for CLI builds. The runtime is dropped as soon as a command returns,
/// so siblings of a failed build are aborted rather than detached.
fn build_pool(workspace: &Workspace, parallel: Option<usize>) -> Result<TaskPool> {
    let limit = workspace.config().concurrency(parallel)?;
    Ok(TaskPool::new(limit).with_sibling_policy(SiblingPolicy::Abort))
}
