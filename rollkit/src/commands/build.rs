//! `rollkit build`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use rollkit_adapters::{ApiExtractor, RollupBundler};
use rollkit_core::size::check_sizes;
use rollkit_core::{BuildContext, BuildSettings, Builder, Scanner};

use crate::formatting::{
    create_progress_bar, format_duration, print_build_table, print_section_header,
    print_separator_with_spacing, print_size_table, print_summary_box, print_warning,
    SectionStyle,
};

use super::reporters::CliBuildReporter;
use super::{build_pool, current_commit, open_workspace, runtime};

pub fn cmd_build(
    root: PathBuf,
    targets: Vec<String>,
    settings: BuildSettings,
    parallel: Option<usize>,
) -> Result<()> {
    let start = Instant::now();
    let workspace = open_workspace(&root)?;
    let scanner = Scanner::new(workspace.packages_dir());

    let full_build = targets.is_empty();
    let resolved = if full_build {
        scanner.target_names()?
    } else {
        scanner.fuzzy_match(&targets, settings.all_matching)?
    };

    if resolved.is_empty() {
        print_warning("No build targets found");
        return Ok(());
    }

    let pool = build_pool(&workspace, parallel)?;
    let ctx = BuildContext::new(&workspace, current_commit(&workspace), settings, full_build);
    let dev_only = ctx.settings.dev_only;

    print_section_header(
        &format!(
            "Building {} package(s), {} at a time",
            resolved.len(),
            pool.max_concurrency()
        ),
        SectionStyle::Primary,
    );

    let pb = create_progress_bar(resolved.len() as u64);
    let builder = Builder::new(
        ctx,
        Arc::new(RollupBundler::new(workspace.root())),
        Arc::new(ApiExtractor::new(workspace.root())),
        Arc::new(CliBuildReporter::new(pb.clone())),
        pool,
    );

    let outcomes = runtime()?.block_on(builder.build_all(resolved.clone()));
    pb.finish_and_clear();
    let outcomes = outcomes?;

    println!();
    print_build_table(&outcomes);

    if !dev_only {
        println!();
        print_section_header("Bundle sizes", SectionStyle::Primary);
        print_size_table(&check_sizes(&workspace.packages_dir(), &resolved)?);
    }

    let failed: Vec<&str> = outcomes
        .iter()
        .filter(|o| o.types_failed())
        .map(|o| o.target())
        .collect();
    let built = outcomes.iter().filter(|o| !o.is_skipped()).count();
    let elapsed = format_duration(start.elapsed().as_secs_f64());

    print_separator_with_spacing();
    print_summary_box(
        "Build Summary",
        &[
            ("Built:", &built.to_string()),
            ("Skipped:", &(outcomes.len() - built).to_string()),
            ("Declaration failures:", &failed.len().to_string()),
            ("Time:", &elapsed),
        ],
    );

    if !failed.is_empty() {
        println!();
        print_section_header(
            &format!("Declaration rollup failed for {}", failed.join(", ")),
            SectionStyle::Error,
        );
        std::process::exit(1);
    }

    Ok(())
}
