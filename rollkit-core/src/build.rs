//! Build orchestration: one bundler run (plus optional declaration rollup) per package.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::adapter::{Bundler, ExtractReport, TypeExtractor};
use crate::config::Workspace;
use crate::error::Result;
use crate::package::{Format, Manifest, Package};
use crate::pool::TaskPool;
use crate::reporter::BuildReporter;

pub const EXTRACTOR_CONFIG: &str = "api-extractor.json";

/// Flags controlling a build run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSettings {
    /// Only build these formats; `None` builds what each package declares.
    pub formats: Option<Vec<Format>>,
    pub dev_only: bool,
    pub prod_only: bool,
    pub sourcemap: bool,
    /// Release builds skip private packages and always emit declarations.
    pub release: bool,
    pub types: bool,
    /// Keep every target matching a partial name, not just the first.
    pub all_matching: bool,
}

impl BuildSettings {
    /// Settings used by the release flow.
    pub fn for_release() -> Self {
        Self {
            release: true,
            ..Self::default()
        }
    }

    #[inline]
    pub fn prod_only(&self) -> bool {
        !self.dev_only && self.prod_only
    }

    #[inline]
    pub fn build_types(&self) -> bool {
        self.types || self.release
    }

    #[inline]
    pub fn node_env(&self) -> &'static str {
        if self.dev_only {
            "development"
        } else {
            "production"
        }
    }
}

/// Everything a build job needs, passed explicitly to each job.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub root: PathBuf,
    pub packages_dir: PathBuf,
    /// Short commit id stamped into bundles.
    pub commit: String,
    pub settings: BuildSettings,
    /// True when no explicit targets were given.
    pub full_build: bool,
}

impl BuildContext {
    pub fn new(
        workspace: &Workspace,
        commit: impl Into<String>,
        settings: BuildSettings,
        full_build: bool,
    ) -> Self {
        Self {
            root: workspace.root().to_path_buf(),
            packages_dir: workspace.packages_dir(),
            commit: commit.into(),
            settings,
            full_build,
        }
    }
}

/// Variables handed to the bundler for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEnvironment {
    vars: Vec<(&'static str, String)>,
}

impl BundleEnvironment {
    pub fn new(ctx: &BuildContext, target: &str) -> Self {
        let settings = &ctx.settings;
        let mut vars = vec![
            ("NODE_ENV", settings.node_env().to_string()),
            ("COMMIT", ctx.commit.clone()),
            ("TARGET", target.to_string()),
        ];
        if let Some(formats) = settings.formats.as_deref() {
            if !formats.is_empty() {
                vars.push(("FORMATS", Format::join(formats)));
            }
        }
        if settings.build_types() {
            vars.push(("TYPES", "true".to_string()));
        }
        if settings.prod_only() {
            vars.push(("PROD_ONLY", "true".to_string()));
        }
        if settings.sourcemap {
            vars.push(("SOURCE_MAP", "true".to_string()));
        }
        Self { vars }
    }

    #[inline]
    pub fn vars(&self) -> &[(&'static str, String)] {
        &self.vars
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// `KEY:value` pairs joined by commas.
    pub fn render(&self) -> String {
        self.vars
            .iter()
            .map(|(k, v)| format!("{}:{}", k, v))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Result of building one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Built {
        target: String,
        /// Declaration rollup report, when declarations were requested and declared.
        types: Option<ExtractReport>,
    },
    /// Private package left out of a release or full build.
    Skipped { target: String },
}

impl BuildOutcome {
    pub fn target(&self) -> &str {
        match self {
            BuildOutcome::Built { target, .. } | BuildOutcome::Skipped { target } => target,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, BuildOutcome::Skipped { .. })
    }

    /// Whether the declaration rollup ran and reported errors.
    pub fn types_failed(&self) -> bool {
        matches!(
            self,
            BuildOutcome::Built {
                types: Some(report),
                ..
            } if !report.succeeded
        )
    }
}

struct BuildJob {
    ctx: BuildContext,
    bundler: Arc<dyn Bundler>,
    extractor: Arc<dyn TypeExtractor>,
    reporter: Arc<dyn BuildReporter>,
}

impl BuildJob {
    async fn run(&self, target: &str) -> Result<BuildOutcome> {
        let settings = &self.ctx.settings;
        let dir = self.ctx.packages_dir.join(target);
        let manifest = Manifest::load(&dir)?;
        let package = Package::new(target, dir, manifest);

        if (settings.release || self.ctx.full_build) && package.manifest.private {
            debug!(target, "skipping private package");
            let outcome = BuildOutcome::Skipped {
                target: target.to_string(),
            };
            self.reporter.package_finished(target, &outcome);
            return Ok(outcome);
        }

        self.reporter.package_started(target);

        // Building selected formats leaves the other artifacts in place.
        if settings.formats.is_none() {
            remove_dir_if_exists(&package.dist_dir()).await?;
        }

        let env = BundleEnvironment::new(&self.ctx, target);
        info!(target, bundler = self.bundler.name(), env = %env.render(), "bundling");
        self.bundler.bundle(&package, &env).await?;

        let types = if settings.build_types() && package.manifest.types.is_some() {
            self.reporter.types_started(target);
            let config_path = package.path.join(EXTRACTOR_CONFIG);
            let report = self.extractor.extract(&package, &config_path).await?;
            self.reporter.types_finished(target, &report);
            remove_dir_if_exists(&package.dist_dir().join("packages")).await?;
            Some(report)
        } else {
            None
        };

        let outcome = BuildOutcome::Built {
            target: target.to_string(),
            types,
        };
        self.reporter.package_finished(target, &outcome);
        Ok(outcome)
    }
}

async fn remove_dir_if_exists(path: &Path) -> Result<()> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Builds targets through a [`TaskPool`].
pub struct Builder {
    job: Arc<BuildJob>,
    pool: TaskPool,
}

impl Builder {
    pub fn new(
        ctx: BuildContext,
        bundler: Arc<dyn Bundler>,
        extractor: Arc<dyn TypeExtractor>,
        reporter: Arc<dyn BuildReporter>,
        pool: TaskPool,
    ) -> Self {
        Self {
            job: Arc::new(BuildJob {
                ctx,
                bundler,
                extractor,
                reporter,
            }),
            pool,
        }
    }

    pub async fn build_package(&self, target: &str) -> Result<BuildOutcome> {
        self.job.run(target).await
    }

    /// Builds every target, at most `max_concurrency` at a time.
    ///
    /// Outcomes are in the order of `targets`. The first bundler failure
    /// fails the whole run.
    pub async fn build_all(&self, targets: Vec<String>) -> Result<Vec<BuildOutcome>> {
        info!(
            count = targets.len(),
            max_concurrency = self.pool.max_concurrency(),
            "building targets"
        );
        self.pool
            .run(targets, |target, _all| {
                let job = Arc::clone(&self.job);
                async move { job.run(&target).await }
            })
            .await
    }
}
