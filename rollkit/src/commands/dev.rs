//! `rollkit dev`.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use rollkit_adapters::EsbuildDevBundler;
use rollkit_core::{DevBundler, DevPlan, Format};

use crate::formatting::{print_key_value, print_section_header, SectionStyle};

use super::{open_workspace, runtime};

pub fn cmd_dev(root: PathBuf, target: Option<String>, format: &str) -> Result<()> {
    let workspace = open_workspace(&root)?;
    let target = target
        .or_else(|| workspace.scope().map(str::to_string))
        .ok_or_else(|| anyhow!("No target given and rollkit.toml has no workspace name"))?;
    let format: Format = format.parse()?;

    let plan = DevPlan::new(&workspace, &target, format)?;

    print_section_header(&format!("Watching {}", target), SectionStyle::Primary);
    print_key_value("Format:", plan.output_format.as_str());
    print_key_value("Entry:", &plan.entry.display().to_string());
    print_key_value("Output:", &plan.outfile.display().to_string());
    println!();

    runtime()?.block_on(EsbuildDevBundler::new(workspace.root()).watch(&plan))?;
    Ok(())
}
