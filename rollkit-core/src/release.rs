//! Workspace-wide release: version bump, build, changelog, publish.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use semver::{BuildMetadata, Prerelease, Version};
use serde_json::Value;
use tracing::{info, warn};

use crate::adapter::{PackageManager, PublishOutcome, Registry, VersionControl};
use crate::build::Builder;
use crate::config::Workspace;
use crate::error::{Error, Result};
use crate::package::{Package, MANIFEST_FILE};
use crate::reporter::ReleaseReporter;
use crate::scanner::Scanner;

/// Ways to derive the next version from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionIncrement {
    Patch,
    Minor,
    Major,
    Prepatch,
    Preminor,
    Premajor,
    Prerelease,
}

impl VersionIncrement {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionIncrement::Patch => "patch",
            VersionIncrement::Minor => "minor",
            VersionIncrement::Major => "major",
            VersionIncrement::Prepatch => "prepatch",
            VersionIncrement::Preminor => "preminor",
            VersionIncrement::Premajor => "premajor",
            VersionIncrement::Prerelease => "prerelease",
        }
    }

    /// Increments offered for a release. The `pre*` ones need a prerelease identifier.
    pub fn available(pre: Option<&str>) -> Vec<Self> {
        let mut increments = vec![
            VersionIncrement::Patch,
            VersionIncrement::Minor,
            VersionIncrement::Major,
        ];
        if pre.is_some() {
            increments.extend([
                VersionIncrement::Prepatch,
                VersionIncrement::Preminor,
                VersionIncrement::Premajor,
                VersionIncrement::Prerelease,
            ]);
        }
        increments
    }

    /// Computes the incremented version.
    ///
    /// A plain increment on a prerelease drops the prerelease when that
    /// already yields the requested release: `1.3.0-beta.2` becomes `1.3.0`
    /// for both `minor` and `patch`.
    pub fn apply(self, current: &Version, identifier: Option<&str>) -> Result<Version> {
        let mut next = current.clone();
        next.build = BuildMetadata::EMPTY;

        match self {
            VersionIncrement::Major => {
                if next.minor != 0 || next.patch != 0 || next.pre.is_empty() {
                    next.major += 1;
                }
                next.minor = 0;
                next.patch = 0;
                next.pre = Prerelease::EMPTY;
            }
            VersionIncrement::Minor => {
                if next.patch != 0 || next.pre.is_empty() {
                    next.minor += 1;
                }
                next.patch = 0;
                next.pre = Prerelease::EMPTY;
            }
            VersionIncrement::Patch => {
                if next.pre.is_empty() {
                    next.patch += 1;
                }
                next.pre = Prerelease::EMPTY;
            }
            VersionIncrement::Premajor => {
                next = Version::new(next.major + 1, 0, 0);
                bump_prerelease(&mut next, identifier)?;
            }
            VersionIncrement::Preminor => {
                next = Version::new(next.major, next.minor + 1, 0);
                bump_prerelease(&mut next, identifier)?;
            }
            VersionIncrement::Prepatch => {
                next = Version::new(next.major, next.minor, next.patch + 1);
                bump_prerelease(&mut next, identifier)?;
            }
            VersionIncrement::Prerelease => {
                if next.pre.is_empty() {
                    next.patch += 1;
                }
                bump_prerelease(&mut next, identifier)?;
            }
        }

        Ok(next)
    }
}

impl FromStr for VersionIncrement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "patch" => Ok(VersionIncrement::Patch),
            "minor" => Ok(VersionIncrement::Minor),
            "major" => Ok(VersionIncrement::Major),
            "prepatch" => Ok(VersionIncrement::Prepatch),
            "preminor" => Ok(VersionIncrement::Preminor),
            "premajor" => Ok(VersionIncrement::Premajor),
            "prerelease" => Ok(VersionIncrement::Prerelease),
            _ => Err(Error::Release(format!("unknown version increment: {}", s))),
        }
    }
}

impl fmt::Display for VersionIncrement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn bump_prerelease(version: &mut Version, identifier: Option<&str>) -> Result<()> {
    let mut parts: Vec<String> = if version.pre.is_empty() {
        Vec::new()
    } else {
        version.pre.as_str().split('.').map(str::to_string).collect()
    };

    if parts.is_empty() {
        parts.push("0".to_string());
    } else {
        match parts.iter().rposition(|p| p.parse::<u64>().is_ok()) {
            Some(i) => {
                let n: u64 = parts[i].parse().unwrap_or(0);
                parts[i] = (n + 1).to_string();
            }
            None => parts.push("0".to_string()),
        }
    }

    if let Some(id) = identifier {
        let keeps_counter =
            parts[0] == id && parts.get(1).is_some_and(|p| p.parse::<u64>().is_ok());
        if !keeps_counter {
            parts = vec![id.to_string(), "0".to_string()];
        }
    }

    version.pre = Prerelease::new(&parts.join("."))
        .map_err(|e| Error::InvalidVersion(format!("{}-{}: {}", version, parts.join("."), e)))?;
    Ok(())
}

/// Parses a target version, accepting a leading `v` or `=`.
pub fn parse_version(s: &str) -> Result<Version> {
    let trimmed = s.trim().trim_start_matches(['v', '=']);
    Version::parse(trimmed).map_err(|_| Error::InvalidVersion(s.to_string()))
}

/// The prerelease identifier to use: explicit, else the first component of
/// the current version's prerelease.
pub fn pre_identifier(current: &Version, explicit: Option<&str>) -> Option<String> {
    explicit.map(str::to_string).or_else(|| {
        current
            .pre
            .as_str()
            .split('.')
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// Registry dist-tag for a version: explicit, else alpha/beta/rc by name.
pub fn release_tag(explicit: Option<&str>, version: &str) -> Option<String> {
    if let Some(tag) = explicit {
        return Some(tag.to_string());
    }
    ["alpha", "beta", "rc"]
        .into_iter()
        .find(|tag| version.contains(tag))
        .map(str::to_string)
}

/// Whether `dependency` names a package of this workspace.
pub fn is_internal_dependency(dependency: &str, scope: Option<&str>, packages: &[String]) -> bool {
    let Some(scope) = scope else {
        return false;
    };
    if dependency == scope {
        return true;
    }
    dependency
        .strip_prefix(&format!("@{}/", scope))
        .is_some_and(|name| packages.iter().any(|p| p == name))
}

/// Sets `version` in `<dir>/package.json` and pins internal dependencies to it.
///
/// Key order and everything else in the manifest are preserved.
pub fn update_manifest(
    dir: &Path,
    version: &str,
    scope: Option<&str>,
    packages: &[String],
    reporter: &dyn ReleaseReporter,
) -> Result<()> {
    let path = dir.join(MANIFEST_FILE);
    let content = std::fs::read_to_string(&path)?;
    let mut json: Value = serde_json::from_str(&content).map_err(|error| Error::Json {
        error,
        path: path.clone(),
    })?;
    let manifest = json
        .as_object_mut()
        .ok_or_else(|| Error::Release(format!("{} is not a JSON object", path.display())))?;

    let package_name = manifest
        .get("name")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| dir.display().to_string());

    manifest.insert("version".to_string(), Value::String(version.to_string()));

    for dep_type in ["dependencies", "peerDependencies"] {
        let Some(Value::Object(deps)) = manifest.get_mut(dep_type) else {
            continue;
        };
        for (dependency, value) in deps.iter_mut() {
            if is_internal_dependency(dependency, scope, packages) {
                reporter.dependency_updated(&package_name, dep_type, dependency, version);
                *value = Value::String(version.to_string());
            }
        }
    }

    let mut output = serde_json::to_string_pretty(&json).map_err(|error| Error::Json {
        error,
        path: path.clone(),
    })?;
    output.push('\n');
    std::fs::write(&path, output)?;
    Ok(())
}

/// External tools used by a release.
pub struct ReleaseTools {
    pub vcs: Box<dyn VersionControl>,
    pub registry: Box<dyn Registry>,
    pub package_manager: Box<dyn PackageManager>,
}

#[derive(Debug, Clone, Default)]
pub struct ReleaseOptions {
    pub skip_build: bool,
    /// Explicit registry dist-tag.
    pub tag: Option<String>,
}

/// What a finished release did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseSummary {
    pub version: String,
    pub published: Vec<String>,
    pub already_published: Vec<String>,
    pub skipped_private: Vec<String>,
}

/// Drives a release across every package of the workspace.
pub struct ReleaseEngine {
    workspace: Workspace,
    packages: Vec<Package>,
    tools: ReleaseTools,
    builder: Option<Builder>,
    options: ReleaseOptions,
    reporter: Arc<dyn ReleaseReporter>,
}

impl ReleaseEngine {
    /// Creates an engine for `workspace`, scanning its packages.
    ///
    /// `builder` builds the workspace during the release; pass `None` (or
    /// set `skip_build`) to skip that step.
    pub fn new(
        workspace: Workspace,
        tools: ReleaseTools,
        builder: Option<Builder>,
        options: ReleaseOptions,
        reporter: Arc<dyn ReleaseReporter>,
    ) -> Result<Self> {
        let packages = Scanner::new(workspace.packages_dir()).all_packages()?;
        Ok(Self {
            workspace,
            packages,
            tools,
            builder,
            options,
            reporter,
        })
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    fn package_names(&self) -> Vec<String> {
        self.packages.iter().map(|p| p.name.clone()).collect()
    }

    /// Rewrites the root and every package manifest to `version`.
    pub fn update_versions(&self, version: &str) -> Result<()> {
        let names = self.package_names();
        let scope = self.workspace.scope();
        update_manifest(self.workspace.root(), version, scope, &names, self.reporter.as_ref())?;
        for package in &self.packages {
            update_manifest(&package.path, version, scope, &names, self.reporter.as_ref())?;
        }
        Ok(())
    }

    /// Runs the release. On failure every manifest is restored to the
    /// workspace's current version before the error is returned.
    pub async fn execute(&self, version: &Version) -> Result<ReleaseSummary> {
        let current = self.workspace.current_version()?.to_string();
        let target = version.to_string();

        match self.run_steps(&target).await {
            Ok(summary) => Ok(summary),
            Err(error) => {
                warn!(%error, version = %current, "release failed, restoring versions");
                if let Err(restore_error) = self.update_versions(&current) {
                    warn!(error = %restore_error, "failed to restore versions");
                }
                Err(error)
            }
        }
    }

    async fn run_steps(&self, version: &str) -> Result<ReleaseSummary> {
        let root = self.workspace.root();
        let mut summary = ReleaseSummary {
            version: version.to_string(),
            ..ReleaseSummary::default()
        };

        self.reporter.step("Updating cross dependencies...");
        self.update_versions(version)?;

        self.reporter.step("Building all packages...");
        match self.builder.as_ref().filter(|_| !self.options.skip_build) {
            Some(builder) => {
                let targets = Scanner::new(self.workspace.packages_dir()).target_names()?;
                let outcomes = builder.build_all(targets).await?;
                let failed: Vec<&str> = outcomes
                    .iter()
                    .filter(|o| o.types_failed())
                    .map(|o| o.target())
                    .collect();
                if !failed.is_empty() {
                    return Err(Error::Release(format!(
                        "type declaration rollup failed for {}",
                        failed.join(", ")
                    )));
                }
            }
            None => self.reporter.note("(skipped)"),
        }

        self.reporter.step("Generating changelog...");
        self.tools.package_manager.changelog(root).await?;

        self.reporter.step("Updating lockfile...");
        self.tools.package_manager.install(root).await?;

        if self.tools.vcs.has_changes(root)? {
            self.reporter.step("Committing changes...");
            self.tools
                .vcs
                .commit_all(root, &format!("release: v{}", version))
                .await?;
        } else {
            self.reporter.note("No changes to commit.");
        }

        self.reporter.step("Publishing packages...");
        let tag = release_tag(self.options.tag.as_deref(), version);
        for package in &self.packages {
            if package.manifest.private {
                summary.skipped_private.push(package.name.clone());
                continue;
            }
            self.reporter.step(&format!("Publishing {}...", package.name));
            let outcome = self
                .tools
                .registry
                .publish(
                    package,
                    version,
                    tag.as_deref(),
                    &self.workspace.config().registry_access,
                )
                .await?;
            match outcome {
                PublishOutcome::Published => {
                    info!(package = %package.name, version, "published");
                    self.reporter.published(&package.name, version);
                    summary.published.push(package.name.clone());
                }
                PublishOutcome::AlreadyPublished => {
                    self.reporter.already_published(&package.name);
                    summary.already_published.push(package.name.clone());
                }
            }
        }

        self.reporter.step("Pushing to remote...");
        let git_tag = format!("v{}", version);
        self.tools.vcs.tag(root, &git_tag).await?;
        self.tools.vcs.push_tag(root, &git_tag).await?;
        self.tools.vcs.push(root).await?;

        Ok(summary)
    }
}
