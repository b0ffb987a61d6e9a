//! Colored reporters for build and release progress.

use indicatif::ProgressBar;
use owo_colors::OwoColorize;
use rollkit_core::{BuildOutcome, BuildReporter, ExtractReport, ReleaseReporter};

use crate::formatting::Status;

/// Reports build progress above the progress bar.
pub struct CliBuildReporter {
    pb: ProgressBar,
}

impl CliBuildReporter {
    pub fn new(pb: ProgressBar) -> Self {
        Self { pb }
    }
}

impl BuildReporter for CliBuildReporter {
    fn package_started(&self, target: &str) {
        self.pb.set_message(target.to_string());
    }

    fn package_finished(&self, target: &str, outcome: &BuildOutcome) {
        if outcome.is_skipped() {
            self.pb
                .println(format!("  {} {}", Status::Info.colored_symbol(), target.bright_black()));
        } else {
            self.pb.println(format!("  {}", Status::Success.format(target)));
        }
        self.pb.inc(1);
    }

    fn types_started(&self, target: &str) {
        self.pb.println(format!(
            "  {}",
            format!("Rolling up type definitions for {}...", target)
                .yellow()
                .bold()
        ));
    }

    fn types_finished(&self, target: &str, report: &ExtractReport) {
        if report.succeeded {
            self.pb.println(format!(
                "  {}",
                Status::Success.format(&format!("{}: API Extractor completed successfully.", target))
            ));
        } else {
            self.pb.println(format!(
                "  {}",
                Status::Error.format(&format!(
                    "{}: API Extractor completed with {} errors and {} warnings",
                    target, report.error_count, report.warning_count
                ))
            ));
        }
    }
}

pub struct CliReleaseReporter;

impl ReleaseReporter for CliReleaseReporter {
    fn step(&self, message: &str) {
        println!("{}", message.cyan());
    }

    fn note(&self, message: &str) {
        println!("  {}", message.bright_black());
    }

    fn dependency_updated(&self, package: &str, dep_type: &str, dependency: &str, version: &str) {
        println!(
            "  {}",
            format!("{} -> {} -> {}@{}", package, dep_type, dependency, version).yellow()
        );
    }

    fn published(&self, package: &str, version: &str) {
        println!(
            "  {}",
            Status::Success.format(&format!("Successfully published {}@{}", package, version))
        );
    }

    fn already_published(&self, package: &str) {
        println!(
            "  {}",
            Status::Warning.format(&format!("Skipping already published: {}", package))
        );
    }
}
