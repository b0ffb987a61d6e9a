//! `rollkit release`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use rollkit_adapters::{release_tools, ApiExtractor, RollupBundler};
use rollkit_core::release::{parse_version, pre_identifier};
use rollkit_core::{
    BuildContext, BuildSettings, Builder, ReleaseEngine, ReleaseOptions, SilentReporter,
    VersionIncrement,
};

use crate::formatting::{
    format_duration, print_section_header, print_separator_with_spacing, print_summary_box,
    print_warning, SectionStyle,
};

use super::prompt::{confirm, select_version};
use super::reporters::CliReleaseReporter;
use super::{build_pool, current_commit, open_workspace, runtime};

pub struct ReleaseArgs {
    pub version: Option<String>,
    pub bump: Option<VersionIncrement>,
    pub pre: Option<String>,
    pub tag: Option<String>,
    pub skip_build: bool,
    pub yes: bool,
    pub parallel: Option<usize>,
}

pub fn cmd_release(root: PathBuf, args: ReleaseArgs) -> Result<()> {
    let start = Instant::now();
    let workspace = open_workspace(&root)?;
    let current = parse_version(workspace.current_version()?)?;
    let pre = pre_identifier(&current, args.pre.as_deref());

    let target = match (args.version.as_deref(), args.bump) {
        (Some(version), _) => parse_version(version)?,
        (None, Some(increment)) => increment.apply(&current, pre.as_deref())?,
        (None, None) => select_version(&current, pre.as_deref())?,
    };

    if !args.yes && !confirm(&format!("Releasing v{}. Confirm?", target))? {
        print_warning("Release cancelled");
        return Ok(());
    }

    let builder = if args.skip_build {
        None
    } else {
        let pool = build_pool(&workspace, args.parallel)?;
        let ctx = BuildContext::new(
            &workspace,
            current_commit(&workspace),
            BuildSettings::for_release(),
            true,
        );
        Some(Builder::new(
            ctx,
            Arc::new(RollupBundler::new(workspace.root())),
            Arc::new(ApiExtractor::new(workspace.root())),
            Arc::new(SilentReporter),
            pool,
        ))
    };

    let engine = ReleaseEngine::new(
        workspace.clone(),
        release_tools(workspace.root()),
        builder,
        ReleaseOptions {
            skip_build: args.skip_build,
            tag: args.tag,
        },
        Arc::new(CliReleaseReporter),
    )?;

    print_section_header(&format!("Releasing v{}", target), SectionStyle::Primary);
    let summary = runtime()?.block_on(engine.execute(&target))?;

    if !summary.already_published.is_empty() {
        println!();
        print_section_header(
            &format!(
                "The following packages are skipped and NOT published: {}",
                summary.already_published.join(", ")
            ),
            SectionStyle::Warning,
        );
    }

    let elapsed = format_duration(start.elapsed().as_secs_f64());
    print_separator_with_spacing();
    print_summary_box(
        "Release Summary",
        &[
            ("Version:", &format!("v{}", summary.version)),
            ("Published:", &summary.published.len().to_string()),
            ("Already published:", &summary.already_published.len().to_string()),
            ("Private:", &summary.skipped_private.len().to_string()),
            ("Time:", &elapsed),
        ],
    );
    println!();
    print_section_header("Release complete", SectionStyle::Success);

    Ok(())
}
