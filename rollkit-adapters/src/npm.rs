use std::path::PathBuf;

use async_trait::async_trait;
use rollkit_core::adapter::{PublishOutcome, Registry};
use rollkit_core::error::Result;
use rollkit_core::package::Package;
use tracing::debug;

use crate::process::ToolCommand;

/// Publishes packages with `npm publish`.
pub struct NpmRegistry {
    root: PathBuf,
}

impl NpmRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

pub fn publish_args(version: &str, tag: Option<&str>, access: &str) -> Vec<String> {
    let mut args = vec![
        "publish".to_string(),
        "--new-version".to_string(),
        version.to_string(),
    ];
    if let Some(tag) = tag {
        args.push("--tag".to_string());
        args.push(tag.to_string());
    }
    args.push("--access".to_string());
    args.push(access.to_string());
    args
}

#[async_trait]
impl Registry for NpmRegistry {
    async fn publish(
        &self,
        package: &Package,
        version: &str,
        tag: Option<&str>,
        access: &str,
    ) -> Result<PublishOutcome> {
        let result = ToolCommand::new("npm", &self.root, &package.name)?
            .current_dir(&package.path)
            .args(publish_args(version, tag, access))
            .output()
            .await;

        match result {
            Ok(_) => Ok(PublishOutcome::Published),
            Err(e) if e.is_previously_published() => {
                debug!(package = %package.name, version, "version already on registry");
                Ok(PublishOutcome::AlreadyPublished)
            }
            Err(e) => Err(e),
        }
    }
}
