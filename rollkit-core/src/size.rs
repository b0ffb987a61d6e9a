//! Bundle size reporting.

use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::Result;

/// Raw and gzip-compressed size of a production bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeReport {
    pub file: PathBuf,
    pub min_bytes: usize,
    pub gzip_bytes: usize,
}

impl SizeReport {
    /// Measures `file`. Returns `Ok(None)` when it does not exist.
    pub fn measure(file: &Path) -> Result<Option<Self>> {
        if !file.is_file() {
            return Ok(None);
        }
        let bytes = std::fs::read(file)?;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&bytes)?;
        let gzipped = encoder.finish()?;

        Ok(Some(Self {
            file: file.to_path_buf(),
            min_bytes: bytes.len(),
            gzip_bytes: gzipped.len(),
        }))
    }

    pub fn file_name(&self) -> String {
        self.file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn min_size(&self) -> String {
        format_kb(self.min_bytes)
    }

    pub fn gzip_size(&self) -> String {
        format_kb(self.gzip_bytes)
    }
}

/// Formats a byte count as kilobytes with two decimals, e.g. `1.50kb`.
pub fn format_kb(bytes: usize) -> String {
    format!("{:.2}kb", bytes as f64 / 1024.0)
}

/// Measures `<packages_dir>/<target>/dist/<target>.prod.js` for each target.
pub fn check_sizes(packages_dir: &Path, targets: &[String]) -> Result<Vec<SizeReport>> {
    let mut reports = Vec::new();
    for target in targets {
        let file = packages_dir
            .join(target)
            .join("dist")
            .join(format!("{}.prod.js", target));
        if let Some(report) = SizeReport::measure(&file)? {
            reports.push(report);
        }
    }
    Ok(reports)
}
