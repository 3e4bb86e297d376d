//! CLI entry point: detect (or take) board revisions, generate the default
//! configuration and write it out.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use cape_defaults::board::FixedRevisions;
use cape_defaults::config::{self, OutputFormat, Settings};
use cape_defaults::{generator, writer};

/// Default configuration generator
#[derive(Parser, Debug)]
#[command(name = "cape-defaults", version, about = "Generate the default configuration for the installed Replicape/Reach boards.")]
struct Cli {
    /// Replicape (main board) revision, e.g. 0B3A
    #[arg(long)]
    replicape: Option<String>,

    /// Reach (expansion board) revision, e.g. 00A0
    #[arg(long)]
    reach: Option<String>,

    /// Path to a TOML settings file
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Output file (overrides settings)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (overrides settings)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Print the document to stdout instead of writing a file
    #[arg(long)]
    stdout: bool,

    /// Print the derived board parameters instead of the document
    #[arg(long)]
    summary: bool,

    /// Debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Warnings and errors only
    #[arg(short, long)]
    quiet: bool,
}

fn load_settings(cli: &Cli) -> Result<Settings, config::ConfigError> {
    let mut settings = match &cli.settings {
        Some(path) => config::load_settings(&path.to_string_lossy())?,
        None => Settings::default(),
    };
    if let Some(output) = &cli.output {
        settings.output.path = output.clone();
    }
    if let Some(format) = cli.format {
        settings.output.format = format;
    }
    Ok(settings)
}

fn run(cli: &Cli, settings: &Settings) -> cape_defaults::Result<()> {
    let resolver = FixedRevisions::new(cli.replicape.as_deref(), cli.reach.as_deref());

    if cli.summary {
        let generated = generator::generate(&resolver, &settings.revisions)?;
        println!("{generated}");
        return Ok(());
    }

    if cli.stdout {
        let generated = generator::generate(&resolver, &settings.revisions)?;
        print!("{}", writer::render(&generated.document, settings.output.format)?);
        return Ok(());
    }

    generator::generate_default_config(&resolver, settings)?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Settings are read before logging is up; failures are reported on stderr.
    let settings = match load_settings(&cli) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to load settings: {e}");
            return ExitCode::FAILURE;
        }
    };

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else if cli.quiet {
        tracing::Level::WARN
    } else {
        settings.logging.tracing_level()
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Default config generation failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
