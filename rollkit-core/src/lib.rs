//! Core library for monorepo build and release orchestration.

pub mod adapter;
pub mod build;
pub mod config;
pub mod dev;
pub mod error;
pub mod package;
pub mod pool;
pub mod release;
pub mod reporter;
pub mod scaffold;
pub mod scanner;
pub mod size;

pub use adapter::{
    Bundler, DevBundler, ExtractReport, PackageManager, PublishOutcome, Registry, TypeExtractor,
    VersionControl,
};
pub use build::{BuildContext, BuildOutcome, BuildSettings, Builder, BundleEnvironment};
pub use config::{Workspace, WorkspaceConfig};
pub use dev::DevPlan;
pub use error::{Error, Result};
pub use package::{BundleOptions, Format, Manifest, Package};
pub use pool::{SiblingPolicy, TaskPool};
pub use release::{ReleaseEngine, ReleaseOptions, ReleaseSummary, ReleaseTools, VersionIncrement};
pub use reporter::{BuildReporter, ReleaseReporter, SilentReporter};
pub use scaffold::Scaffold;
pub use scanner::Scanner;
pub use size::SizeReport;
