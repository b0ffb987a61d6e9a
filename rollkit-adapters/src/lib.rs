pub mod api_extractor;
pub mod esbuild;
pub mod git;
pub mod npm;
pub mod pnpm;
pub mod process;
pub mod rollup;

pub use api_extractor::ApiExtractor;
pub use esbuild::EsbuildDevBundler;
pub use git::Git;
pub use npm::NpmRegistry;
pub use pnpm::Pnpm;
pub use rollup::RollupBundler;

use std::path::Path;

use rollkit_core::release::ReleaseTools;

/// The standard release toolchain: git, npm and pnpm.
pub fn release_tools(root: &Path) -> ReleaseTools {
    ReleaseTools {
        vcs: Box::new(Git::new()),
        registry: Box::new(NpmRegistry::new(root)),
        package_manager: Box::new(Pnpm),
    }
}
