/*!
 * Command-line interface for CodeForias
 */

use std::io;
use std::process::ExitCode;
use std::time::Duration;

use chrono::Local;
use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use codeforias::config::{Args, Config};
use codeforias::exporter::export_repository;
use codeforias::report::{ExportReport, ReportFormat, Reporter};

fn main() -> ExitCode {
    // Parse command line arguments
    let args = Args::parse();

    if let Some(shell) = args.generate {
        clap_complete::generate(shell, &mut Args::command(), "codeforias", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    init_logging(args.verbose);

    // Create configuration
    let config = Config::from_args(args);

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        eprintln!("{}", e.hint());
        return ExitCode::from(e.exit_code());
    }

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} ⏱️  {elapsed_precise}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress.set_prefix("📦 Exporting");

    // Timestamped status log, one line per message
    let log_status = |message: &str| {
        progress.println(format!("[{}] {}", Local::now().format("%H:%M:%S"), message));
        progress.set_message(message.to_string());
    };

    log_status("Starting export...");
    let outcome = export_repository(&config, &log_status);
    progress.finish_and_clear();

    match outcome {
        Ok(summary) => {
            let reporter = Reporter::new(ReportFormat::ConsoleTable);
            reporter.print_report(&ExportReport::from(&summary));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error ({} stage): {}", e.stage(), e);
            eprintln!("{}", e.hint());
            ExitCode::from(e.exit_code())
        }
    }
}

/// Diagnostics go to stderr; RUST_LOG overrides the verbosity flag
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}
