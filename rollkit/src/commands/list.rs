//! `rollkit list`.

use std::path::PathBuf;

use anyhow::Result;
use rollkit_core::{Format, Scanner};
use serde_json::json;

use crate::formatting::{print_section_header, print_target_table, SectionStyle, TargetRow};

use super::open_workspace;

pub fn cmd_list(root: PathBuf, json_output: bool) -> Result<()> {
    let workspace = open_workspace(&root)?;
    let targets = Scanner::new(workspace.packages_dir()).targets()?;

    if json_output {
        let entries: Vec<_> = targets
            .iter()
            .map(|p| {
                json!({
                    "name": p.name,
                    "version": p.manifest.version,
                    "private": p.manifest.private,
                    "formats": p.manifest.declared_formats(),
                    "types": p.manifest.types.is_some(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    print_section_header(
        &format!("Build targets ({})", targets.len()),
        SectionStyle::Primary,
    );
    let rows: Vec<TargetRow> = targets
        .into_iter()
        .map(|p| TargetRow {
            formats: Format::join(p.manifest.declared_formats()),
            version: p.manifest.version.clone().unwrap_or_default(),
            private: p.manifest.private,
            types: p.manifest.types.is_some(),
            name: p.name,
        })
        .collect();
    print_target_table(&rows);
    Ok(())
}
