use std::path::Path;

use async_trait::async_trait;
use rollkit_core::adapter::PackageManager;
use rollkit_core::error::Result;

use crate::process::ToolCommand;

pub struct Pnpm;

#[async_trait]
impl PackageManager for Pnpm {
    async fn changelog(&self, root: &Path) -> Result<()> {
        ToolCommand::new("pnpm", root, "workspace")?
            .args(["run", "changelog"])
            .status()
            .await
    }

    async fn install(&self, root: &Path) -> Result<()> {
        ToolCommand::new("pnpm", root, "workspace")?
            .args(["install", "--prefer-offline"])
            .status()
            .await
    }
}
