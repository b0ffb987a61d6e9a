//! Watch-mode development build planning.

use std::path::PathBuf;

use crate::config::Workspace;
use crate::error::Result;
use crate::package::{Format, Manifest};

/// Module format emitted by the dev bundler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Iife,
    Cjs,
    Esm,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Iife => "iife",
            OutputFormat::Cjs => "cjs",
            OutputFormat::Esm => "esm",
        }
    }
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Global => OutputFormat::Iife,
            Format::Cjs => OutputFormat::Cjs,
            Format::Esm => OutputFormat::Esm,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Node,
    Browser,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Node => "node",
            Platform::Browser => "browser",
        }
    }
}

/// Everything the dev bundler needs to watch one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevPlan {
    pub target: String,
    pub format: Format,
    pub entry: PathBuf,
    pub outfile: PathBuf,
    pub output_format: OutputFormat,
    pub platform: Platform,
    /// Modules left unbundled; only set for node builds.
    pub external: Vec<String>,
    pub global_name: Option<String>,
    /// Compile-time constants, in insertion order.
    pub defines: Vec<(String, String)>,
    pub sourcemap: bool,
}

impl DevPlan {
    pub fn new(workspace: &Workspace, target: &str, format: Format) -> Result<Self> {
        let package_dir = workspace.package_dir(target);
        let manifest = Manifest::load(&package_dir)?;
        Ok(Self::from_manifest(target, &package_dir, &manifest, format))
    }

    pub fn from_manifest(
        target: &str,
        package_dir: &std::path::Path,
        manifest: &Manifest,
        format: Format,
    ) -> Self {
        let is_node_build = format == Format::Cjs;
        let external = if is_node_build {
            manifest.external_names()
        } else {
            Vec::new()
        };
        let version = manifest.version.as_deref().unwrap_or("0.0.0");

        let defines = vec![
            ("__COMMIT__".to_string(), "\"dev\"".to_string()),
            ("__VERSION__".to_string(), format!("\"{}\"", version)),
            ("__DEV__".to_string(), "true".to_string()),
            ("__BROWSER__".to_string(), (!is_node_build).to_string()),
            ("__GLOBAL__".to_string(), (format == Format::Global).to_string()),
            ("__ESM__".to_string(), (format == Format::Esm).to_string()),
            ("__NODE_JS__".to_string(), is_node_build.to_string()),
        ];

        Self {
            target: target.to_string(),
            format,
            entry: package_dir.join("src").join("index.ts"),
            outfile: package_dir
                .join("dist")
                .join(format!("{}.{}.js", target, format)),
            output_format: format.into(),
            platform: if is_node_build {
                Platform::Node
            } else {
                Platform::Browser
            },
            external,
            global_name: manifest
                .build_options
                .as_ref()
                .and_then(|o| o.name.clone()),
            defines,
            sourcemap: true,
        }
    }
}
