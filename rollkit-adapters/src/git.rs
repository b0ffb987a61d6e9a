use std::path::Path;

use async_trait::async_trait;
use git2::{Repository, StatusOptions};
use rollkit_core::adapter::VersionControl;
use rollkit_core::error::{Error, Result};

use crate::process::ToolCommand;

/// Reads repository state with libgit2 and shells out to `git` for
/// commits, tags and pushes so the user's credentials and hooks apply.
pub struct Git {
    remote: String,
}

impl Default for Git {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
        }
    }
}

impl Git {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    fn open(root: &Path) -> Result<Repository> {
        Repository::discover(root).map_err(|e| Error::Git(e.message().to_string()))
    }
}

#[async_trait]
impl VersionControl for Git {
    fn short_commit(&self, root: &Path) -> Result<String> {
        let repo = Self::open(root)?;
        let head = repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .map_err(|e| Error::Git(format!("cannot resolve HEAD: {}", e.message())))?;
        let id = head.id().to_string();
        Ok(id.chars().take(7).collect())
    }

    fn has_changes(&self, root: &Path) -> Result<bool> {
        let repo = Self::open(root)?;
        let mut options = StatusOptions::new();
        options.include_untracked(false).include_ignored(false);
        let statuses = repo
            .statuses(Some(&mut options))
            .map_err(|e| Error::Git(e.message().to_string()))?;
        Ok(!statuses.is_empty())
    }

    async fn commit_all(&self, root: &Path, message: &str) -> Result<()> {
        ToolCommand::new("git", root, "repository")?
            .args(["add", "-A"])
            .status()
            .await?;
        ToolCommand::new("git", root, "repository")?
            .args(["commit", "-m", message])
            .status()
            .await
    }

    async fn tag(&self, root: &Path, tag: &str) -> Result<()> {
        ToolCommand::new("git", root, "repository")?
            .args(["tag", tag])
            .status()
            .await
    }

    async fn push_tag(&self, root: &Path, tag: &str) -> Result<()> {
        ToolCommand::new("git", root, "repository")?
            .arg("push")
            .arg(&self.remote)
            .arg(format!("refs/tags/{}", tag))
            .status()
            .await
    }

    async fn push(&self, root: &Path) -> Result<()> {
        ToolCommand::new("git", root, "repository")?
            .arg("push")
            .status()
            .await
    }
}
