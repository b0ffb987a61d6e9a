use std::path::PathBuf;

use async_trait::async_trait;
use rollkit_core::adapter::DevBundler;
use rollkit_core::dev::DevPlan;
use rollkit_core::error::{Error, Result};
use tracing::info;

use crate::process::ToolCommand;

/// Watches one target with esbuild until interrupted.
pub struct EsbuildDevBundler {
    root: PathBuf,
}

impl EsbuildDevBundler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

/// Command-line arguments for a watch-mode esbuild run.
pub fn esbuild_args(plan: &DevPlan) -> Vec<String> {
    let mut args = vec![
        plan.entry.display().to_string(),
        "--bundle".to_string(),
        format!("--outfile={}", plan.outfile.display()),
        format!("--format={}", plan.output_format.as_str()),
        format!("--platform={}", plan.platform.as_str()),
    ];
    if plan.sourcemap {
        args.push("--sourcemap".to_string());
    }
    if let Some(name) = &plan.global_name {
        args.push(format!("--global-name={}", name));
    }
    for module in &plan.external {
        args.push(format!("--external:{}", module));
    }
    for (key, value) in &plan.defines {
        args.push(format!("--define:{}={}", key, value));
    }
    args.push("--watch".to_string());
    args
}

#[async_trait]
impl DevBundler for EsbuildDevBundler {
    async fn watch(&self, plan: &DevPlan) -> Result<()> {
        let mut child = ToolCommand::new("esbuild", &self.root, &plan.target)?
            .args(esbuild_args(plan))
            .spawn()?;
        info!(target = %plan.target, outfile = %plan.outfile.display(), "watching");

        tokio::select! {
            status = child.wait() => {
                let status = status?;
                if status.success() {
                    Ok(())
                } else {
                    Err(Error::ToolFailed {
                        tool: "esbuild".to_string(),
                        package: plan.target.clone(),
                        code: status.code(),
                        stderr: String::new(),
                    })
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!(target = %plan.target, "stopping watcher");
                child.kill().await?;
                Ok(())
            }
        }
    }
}
