//! `rollkit create`.

use std::path::PathBuf;

use anyhow::Result;
use rollkit_core::Scaffold;

use crate::formatting::{print_key_value, print_success};

use super::open_workspace;

pub fn cmd_create(
    root: PathBuf,
    package_name: String,
    scope: Option<String>,
    url: Option<String>,
    author: Option<String>,
    license: String,
) -> Result<()> {
    let workspace = open_workspace(&root)?;
    let scaffold = Scaffold {
        package_name,
        scope,
        url,
        author,
        license,
    };

    let dir = scaffold.create(&workspace)?;
    print_success(&format!("Created {}", scaffold.full_name(&workspace)));
    print_key_value("Location:", &dir.display().to_string());
    Ok(())
}
