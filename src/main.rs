//! depurar CLI - runs the student records cleaning pipeline.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![allow(clippy::uninlined_format_args)]

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use depurar::{Pipeline, PipelineConfig, PipelineReport};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// depurar - generate, clean and export student records
#[derive(Parser)]
#[command(name = "depurar")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Output CSV path
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Number of students to generate
    #[arg(short = 'n', long)]
    rows: Option<usize>,
    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn load_config(&self) -> depurar::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "depurar=info",
        1 => "depurar=debug",
        _ => "depurar=trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn run(cli: &Cli) -> depurar::Result<PipelineReport> {
    let config = cli.load_config()?;
    Pipeline::new(config)?.run()
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(report) => {
            println!(
                "Cleaned {} rows ({} duplicates removed, {} values filled)",
                report.clean.rows_in,
                report.clean.duplicates_removed,
                report.clean.total_filled()
            );
            println!(
                "Wrote {} rows to {}",
                report.rows_written,
                report.output.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
