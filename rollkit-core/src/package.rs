//! Package data models: manifests, output formats and discovered packages.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const MANIFEST_FILE: &str = "package.json";

/// Bundle output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Format {
    Esm,
    Cjs,
    Global,
}

impl Format {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Esm => "esm",
            Format::Cjs => "cjs",
            Format::Global => "global",
        }
    }

    /// Parses a comma-separated list such as `"esm,cjs"`.
    pub fn parse_list(s: &str) -> Result<Vec<Self>> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Self::from_str)
            .collect()
    }

    pub fn join(formats: &[Format]) -> String {
        formats
            .iter()
            .map(Format::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "esm" => Ok(Format::Esm),
            "cjs" => Ok(Format::Cjs),
            "global" => Ok(Format::Global),
            _ => Err(Error::InvalidFormat(s.to_string())),
        }
    }
}

impl TryFrom<String> for Format {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `buildOptions` block of a package manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleOptions {
    /// Global variable name for `global` builds.
    pub name: Option<String>,
    #[serde(default)]
    pub formats: Vec<Format>,
}

/// Typed view of a `package.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub name: Option<String>,
    pub version: Option<String>,
    #[serde(default)]
    pub private: bool,
    pub types: Option<String>,
    pub build_options: Option<BundleOptions>,
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,
    #[serde(default)]
    pub peer_dependencies: IndexMap<String, String>,
    #[serde(default)]
    pub dev_dependencies: IndexMap<String, String>,
    pub homepage: Option<String>,
    /// Either a string or a `{ "name": ... }` object.
    pub author: Option<serde_json::Value>,
}

impl Manifest {
    /// Reads `package.json` from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        if !path.is_file() {
            return Err(Error::ManifestNotFound(path));
        }
        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content, &path)
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        serde_json::from_str(content).map_err(|error| Error::Json {
            error,
            path: path.to_path_buf(),
        })
    }

    /// Whether the package takes part in builds.
    ///
    /// Private packages are skipped unless they declare `buildOptions`.
    #[inline]
    pub fn is_build_target(&self) -> bool {
        !(self.private && self.build_options.is_none())
    }

    /// Formats declared in `buildOptions`, if any.
    pub fn declared_formats(&self) -> &[Format] {
        self.build_options
            .as_ref()
            .map(|o| o.formats.as_slice())
            .unwrap_or(&[])
    }

    pub fn author_name(&self) -> Option<&str> {
        match self.author.as_ref()? {
            serde_json::Value::String(s) => Some(s.as_str()),
            serde_json::Value::Object(map) => map.get("name").and_then(|v| v.as_str()),
            _ => None,
        }
    }

    /// Names of runtime and peer dependencies, in declaration order.
    pub fn external_names(&self) -> Vec<String> {
        self.dependencies
            .keys()
            .chain(self.peer_dependencies.keys())
            .cloned()
            .collect()
    }
}

/// A package discovered under the packages directory.
#[derive(Debug, Clone)]
pub struct Package {
    /// Directory name; this is the build target name.
    pub name: String,
    pub path: PathBuf,
    pub manifest: Manifest,
}

impl Package {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, manifest: Manifest) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            manifest,
        }
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.path.join("dist")
    }
}
