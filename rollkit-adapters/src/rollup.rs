use std::path::PathBuf;

use async_trait::async_trait;
use rollkit_core::adapter::Bundler;
use rollkit_core::build::BundleEnvironment;
use rollkit_core::error::Result;
use rollkit_core::package::Package;

use crate::process::ToolCommand;

/// Runs `rollup -c` from the workspace root.
///
/// Build variables are exported as process environment variables so that
/// list values such as `FORMATS=esm,cjs` reach the config intact.
pub struct RollupBundler {
    root: PathBuf,
    config: Option<PathBuf>,
}

impl RollupBundler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: None,
        }
    }

    pub fn with_config(mut self, config: impl Into<PathBuf>) -> Self {
        self.config = Some(config.into());
        self
    }

    pub fn args(&self) -> Vec<String> {
        match &self.config {
            Some(config) => vec!["-c".to_string(), config.display().to_string()],
            None => vec!["-c".to_string()],
        }
    }
}

#[async_trait]
impl Bundler for RollupBundler {
    fn name(&self) -> &'static str {
        "rollup"
    }

    async fn bundle(&self, package: &Package, env: &BundleEnvironment) -> Result<()> {
        let mut command = ToolCommand::new("rollup", &self.root, &package.name)?.args(self.args());
        for (key, value) in env.vars() {
            command = command.env(key, value);
        }
        command.status().await
    }
}
