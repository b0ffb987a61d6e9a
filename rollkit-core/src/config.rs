//! Workspace configuration loaded from `rollkit.toml`.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::package::Manifest;

pub const CONFIG_FILE: &str = "rollkit.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    workspace: WorkspaceConfig,
}

/// Workspace-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Package scope. Internal dependencies are named either `name` or `@name/<package>`.
    pub name: Option<String>,
    /// Directory holding the sub-packages, relative to the workspace root.
    #[serde(default = "default_packages_dir")]
    pub packages_dir: PathBuf,
    /// Default number of packages built at once.
    pub max_concurrency: Option<usize>,
    /// Access level passed to the registry on publish.
    #[serde(default = "default_registry_access")]
    pub registry_access: String,
}

fn default_packages_dir() -> PathBuf {
    PathBuf::from("packages")
}

fn default_registry_access() -> String {
    "public".to_string()
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            name: None,
            packages_dir: default_packages_dir(),
            max_concurrency: None,
            registry_access: default_registry_access(),
        }
    }
}

impl WorkspaceConfig {
    /// Parses the contents of a `rollkit.toml` file.
    pub fn parse(content: &str, context: &Path) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content).map_err(|error| Error::Toml {
            error,
            context: context.display().to_string(),
        })?;
        Ok(file.workspace)
    }

    /// Resolves the build concurrency: explicit override, then config, then CPU count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConcurrency`] if the chosen value is zero.
    pub fn concurrency(&self, override_value: Option<usize>) -> Result<NonZeroUsize> {
        match override_value.or(self.max_concurrency) {
            Some(n) => NonZeroUsize::new(n).ok_or(Error::InvalidConcurrency(n)),
            None => Ok(NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)),
        }
    }
}

/// A located workspace: its root directory, configuration and root manifest.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    config: WorkspaceConfig,
    manifest: Manifest,
}

impl Workspace {
    /// Locates the workspace containing `start`.
    ///
    /// Walks upward looking for `rollkit.toml`, stopping at the first
    /// directory that contains `.git`. Without a config file the workspace
    /// is rooted at `start` with default settings.
    ///
    /// A relative `start` is resolved against the current directory first.
    pub fn discover(start: impl AsRef<Path>) -> Result<Self> {
        let start = std::path::absolute(start.as_ref())?;
        let start = start.as_path();
        let mut current = start;

        loop {
            let config_path = current.join(CONFIG_FILE);
            if config_path.is_file() {
                let content = std::fs::read_to_string(&config_path)?;
                let config = WorkspaceConfig::parse(&content, &config_path)?;
                debug!(root = %current.display(), "loaded workspace config");
                return Self::load(current, config);
            }

            if current.join(".git").exists() {
                break;
            }

            match current.parent() {
                Some(parent) if parent != current => current = parent,
                _ => break,
            }
        }

        debug!(root = %start.display(), "no {} found, using defaults", CONFIG_FILE);
        Self::load(start, WorkspaceConfig::default())
    }

    /// Loads the root manifest of a workspace at `root` with the given config.
    pub fn load(root: impl Into<PathBuf>, config: WorkspaceConfig) -> Result<Self> {
        let root = root.into();
        let manifest = Manifest::load(&root)?;
        Ok(Self {
            root,
            config,
            manifest,
        })
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// The root `package.json`.
    #[inline]
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn packages_dir(&self) -> PathBuf {
        self.root.join(&self.config.packages_dir)
    }

    pub fn package_dir(&self, target: &str) -> PathBuf {
        self.packages_dir().join(target)
    }

    /// The workspace-wide version from the root manifest.
    pub fn current_version(&self) -> Result<&str> {
        self.manifest
            .version
            .as_deref()
            .ok_or_else(|| Error::Release("root package.json has no version".to_string()))
    }

    pub fn scope(&self) -> Option<&str> {
        self.config.name.as_deref()
    }
}
