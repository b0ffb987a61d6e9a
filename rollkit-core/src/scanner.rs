//! Package discovery and target resolution.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::package::{Manifest, Package, MANIFEST_FILE};

/// Scans the packages directory for sub-packages.
///
/// Every immediate sub-directory holding a `package.json` is a package.
/// Hidden directories are ignored.
pub struct Scanner {
    packages_dir: PathBuf,
}

impl Scanner {
    pub fn new(packages_dir: impl AsRef<Path>) -> Self {
        Self {
            packages_dir: packages_dir.as_ref().to_path_buf(),
        }
    }

    /// Every package, private or not, sorted by name.
    pub fn all_packages(&self) -> Result<Vec<Package>> {
        let package_dirs: Vec<PathBuf> = WalkDir::new(&self.packages_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
            .map(|e| e.into_path())
            .filter(|dir| {
                let has_manifest = dir.join(MANIFEST_FILE).is_file();
                if !has_manifest {
                    debug!(dir = %dir.display(), "skipping directory without package.json");
                }
                has_manifest
            })
            .collect();

        let packages: Result<Vec<Package>> = package_dirs
            .into_par_iter()
            .map(|dir| {
                let manifest = Manifest::load(&dir)?;
                let name = dir
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .ok_or_else(|| Error::ManifestNotFound(dir.clone()))?;
                Ok(Package::new(name, dir, manifest))
            })
            .collect();

        let mut packages = packages?;
        packages.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(packages)
    }

    /// Packages that take part in builds.
    ///
    /// A package is excluded when it is private and has no `buildOptions`.
    pub fn targets(&self) -> Result<Vec<Package>> {
        let targets: Vec<Package> = self
            .all_packages()?
            .into_iter()
            .filter(|p| p.manifest.is_build_target())
            .collect();
        debug!(count = targets.len(), "resolved build targets");
        Ok(targets)
    }

    pub fn target_names(&self) -> Result<Vec<String>> {
        Ok(self.targets()?.into_iter().map(|p| p.name).collect())
    }

    /// Resolves partial target names against the discovered targets.
    pub fn fuzzy_match(&self, partials: &[String], include_all_matching: bool) -> Result<Vec<String>> {
        fuzzy_match(&self.target_names()?, partials, include_all_matching)
    }
}

/// Resolves each partial name, treated as an unanchored regular expression,
/// against `targets`.
///
/// Only the first match per partial is kept unless `include_all_matching`
/// is set. A target matched by several partials appears once, at its first
/// position.
///
/// # Errors
///
/// Returns [`Error::TargetNotFound`] when nothing matched, or
/// [`Error::InvalidPattern`] for a malformed pattern.
pub fn fuzzy_match(
    targets: &[String],
    partials: &[String],
    include_all_matching: bool,
) -> Result<Vec<String>> {
    let mut matched: Vec<String> = Vec::new();

    for partial in partials {
        let pattern = Regex::new(partial).map_err(|e| Error::InvalidPattern {
            pattern: partial.clone(),
            message: e.to_string(),
        })?;

        for target in targets {
            if pattern.is_match(target) {
                if !matched.contains(target) {
                    matched.push(target.clone());
                }
                if !include_all_matching {
                    break;
                }
            }
        }
    }

    if matched.is_empty() {
        return Err(Error::TargetNotFound {
            partials: partials.join(", "),
            available: targets.join(", "),
        });
    }

    Ok(matched)
}
