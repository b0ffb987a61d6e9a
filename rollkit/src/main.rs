mod commands;
mod formatting;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rollkit_core::build::BuildSettings;
use rollkit_core::package::Format;
use rollkit_core::release::VersionIncrement;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::formatting::print_error;

#[derive(Parser)]
#[command(name = "rollkit")]
#[command(about = "Build and release orchestration for JavaScript library monorepos")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory inside the workspace; `rollkit.toml` is searched upward from here.
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[arg(short, long, action, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Bundle packages (all build targets when none are given).
    Build {
        /// Partial target names, matched as regular expressions.
        targets: Vec<String>,
        /// Comma-separated formats to build: esm, cjs, global.
        #[arg(short, long)]
        formats: Option<String>,
        #[arg(short, long, action)]
        dev_only: bool,
        #[arg(short, long, action)]
        prod_only: bool,
        #[arg(short, long, action)]
        sourcemap: bool,
        /// Release build: skip private packages and emit declarations.
        #[arg(long, action)]
        release: bool,
        /// Roll up `.d.ts` declarations.
        #[arg(short, long, action)]
        types: bool,
        /// Build every target matching each partial name.
        #[arg(short, long, action)]
        all: bool,
        #[arg(short = 'j', long)]
        parallel: Option<usize>,
    },
    /// Watch one package and rebuild on change.
    Dev {
        target: Option<String>,
        #[arg(short, long, default_value = "global")]
        format: String,
    },
    /// Bump versions, build, generate the changelog and publish.
    Release {
        /// Exact target version; prompted for when neither this nor --bump is given.
        version: Option<String>,
        #[arg(long, value_enum)]
        bump: Option<IncrementArg>,
        /// Prerelease identifier, e.g. alpha.
        #[arg(long)]
        pre: Option<String>,
        /// Registry dist-tag.
        #[arg(long)]
        tag: Option<String>,
        #[arg(long, action)]
        skip_build: bool,
        /// Do not ask for confirmation.
        #[arg(short, long, action)]
        yes: bool,
        #[arg(short = 'j', long)]
        parallel: Option<usize>,
    },
    /// Scaffold a new package.
    Create {
        package_name: String,
        #[arg(long)]
        scope: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long, default_value = "MIT")]
        license: String,
    },
    /// List build targets.
    List {
        #[arg(long, action)]
        json: bool,
    },
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum IncrementArg {
    Patch,
    Minor,
    Major,
    Prepatch,
    Preminor,
    Premajor,
    Prerelease,
}

impl From<IncrementArg> for VersionIncrement {
    fn from(arg: IncrementArg) -> Self {
        match arg {
            IncrementArg::Patch => VersionIncrement::Patch,
            IncrementArg::Minor => VersionIncrement::Minor,
            IncrementArg::Major => VersionIncrement::Major,
            IncrementArg::Prepatch => VersionIncrement::Prepatch,
            IncrementArg::Preminor => VersionIncrement::Preminor,
            IncrementArg::Premajor => VersionIncrement::Premajor,
            IncrementArg::Prerelease => VersionIncrement::Prerelease,
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let log_level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Build {
            targets,
            formats,
            dev_only,
            prod_only,
            sourcemap,
            release,
            types,
            all,
            parallel,
        } => {
            let settings = BuildSettings {
                formats: formats.as_deref().map(Format::parse_list).transpose()?,
                dev_only,
                prod_only,
                sourcemap,
                release,
                types,
                all_matching: all,
            };
            commands::cmd_build(cli.root, targets, settings, parallel)?
        }
        Commands::Dev { target, format } => commands::cmd_dev(cli.root, target, &format)?,
        Commands::Release {
            version,
            bump,
            pre,
            tag,
            skip_build,
            yes,
            parallel,
        } => commands::cmd_release(
            cli.root,
            commands::ReleaseArgs {
                version,
                bump: bump.map(Into::into),
                pre,
                tag,
                skip_build,
                yes,
                parallel,
            },
        )?,
        Commands::Create {
            package_name,
            scope,
            url,
            author,
            license,
        } => commands::cmd_create(cli.root, package_name, scope, url, author, license)?,
        Commands::List { json } => commands::cmd_list(cli.root, json)?,
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(error) = run(cli) {
        println!();
        print_error(&format!("{:#}", error));
        println!();
        std::process::exit(1);
    }
}
