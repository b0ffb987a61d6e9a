//! Scaffolding for new packages.

use std::path::PathBuf;

use serde_json::json;
use tracing::debug;

use crate::config::Workspace;
use crate::error::{Error, Result};

/// Parameters for a new package.
#[derive(Debug, Clone)]
pub struct Scaffold {
    pub package_name: String,
    /// Overrides the workspace scope.
    pub scope: Option<String>,
    pub url: Option<String>,
    pub author: Option<String>,
    pub license: String,
}

impl Scaffold {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            scope: None,
            url: None,
            author: None,
            license: "MIT".to_string(),
        }
    }

    /// Full npm name, e.g. `@scope/name`.
    pub fn full_name(&self, workspace: &Workspace) -> String {
        match self.scope.as_deref().or(workspace.scope()) {
            Some(scope) if !scope.is_empty() => format!("@{}/{}", scope, self.package_name),
            _ => self.package_name.clone(),
        }
    }

    fn repository_url(&self, workspace: &Workspace) -> String {
        self.url
            .clone()
            .or_else(|| {
                workspace
                    .manifest()
                    .homepage
                    .as_deref()
                    .map(|h| strip_readme_anchor(h).to_string())
            })
            .unwrap_or_default()
    }

    /// File names and contents of the new package, in write order.
    pub fn render(&self, workspace: &Workspace) -> Result<Vec<(&'static str, String)>> {
        let name = self.full_name(workspace);
        let pkg = &self.package_name;
        let url = self.repository_url(workspace);
        let author = self
            .author
            .clone()
            .or_else(|| workspace.manifest().author_name().map(str::to_string))
            .unwrap_or_default();
        let version = workspace.manifest().version.clone().unwrap_or_default();

        let manifest = json!({
            "name": name,
            "version": version,
            "description": name,
            "main": "index.js",
            "module": format!("dist/{}.esm.js", pkg),
            "types": format!("dist/{}.d.ts", pkg),
            "unpkg": format!("dist/{}.global.js", pkg),
            "jsdelivr": format!("dist/{}.global.js", pkg),
            "repository": {
                "type": "git",
                "url": format!("git+{}.git", url),
                "directory": format!("packages/{}", pkg),
            },
            "keywords": [],
            "author": author,
            "license": self.license,
            "bugs": {
                "url": format!("{}/issues", url),
            },
            "homepage": format!("{}/tree/master/packages/{}#readme", url, pkg),
            "files": ["index.js", "dist"],
        });

        let extractor = json!({
            "extends": "../../api-extractor.json",
            "mainEntryPointFilePath": format!("./dist/packages/{}/src/index.d.ts", pkg),
            "dtsRollup": {
                "publicTrimmedFilePath": format!("./dist/{}.d.ts", pkg),
            },
        });

        let index = format!(
            "'use strict';\n\n\
             if (process.env.NODE_ENV === 'production') {{\n  \
             module.exports = require('./dist/{pkg}.cjs.prod.js')\n\
             }} else {{\n  \
             module.exports = require('./dist/{pkg}.cjs.js')\n\
             }}\n",
        );

        Ok(vec![
            ("README.md", format!("# {}", name)),
            ("package.json", to_pretty_json(&manifest)?),
            ("index.js", index),
            ("api-extractor.json", to_pretty_json(&extractor)?),
        ])
    }

    /// Writes the package under the workspace's packages directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PackageExists`] if the directory is already there.
    pub fn create(&self, workspace: &Workspace) -> Result<PathBuf> {
        let dir = workspace.package_dir(&self.package_name);
        if dir.exists() {
            return Err(Error::PackageExists(dir));
        }
        let files = self.render(workspace)?;
        std::fs::create_dir_all(&dir)?;
        for (file, content) in files {
            debug!(file, dir = %dir.display(), "writing scaffold file");
            std::fs::write(dir.join(file), content)?;
        }
        Ok(dir)
    }
}

fn strip_readme_anchor(homepage: &str) -> &str {
    let lower = homepage.to_ascii_lowercase();
    if lower.ends_with("#readme") {
        &homepage[..homepage.len() - "#readme".len()]
    } else {
        homepage
    }
}

fn to_pretty_json(value: &serde_json::Value) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|error| Error::Json {
        error,
        path: PathBuf::from(crate::package::MANIFEST_FILE),
    })
}
