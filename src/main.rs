//! `framestat` CLI: analyze mobile rendering traces from the command line.

mod cli_logger;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use framestat::{AnalysisConfig, AnalyzeOptions, TargetFpsMode, analyze_trace, parse_trace};

use std::path::{Path, PathBuf};

use crate::cli_logger::CliLogger;

#[derive(Debug, Parser)]
#[command(name = "framestat", version, about = "Frame-pacing metrics from mobile rendering traces")]
struct Cli {
    /// Emit machine-readable JSON instead of pretty text.
    #[arg(long, global = true)]
    json: bool,

    #[arg(long, global = true)]
    no_color: bool,

    /// Thresholds and target-FPS candidates, loaded if the file exists.
    #[arg(long, global = true, default_value = "framestat.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a trace and print its full analysis record.
    Analyze {
        trace: PathBuf,
        /// Overrides the app name resolved from the trace.
        #[arg(long)]
        app_name: Option<String>,
        #[arg(long, default_value_t = 0)]
        upload_index: usize,
        /// Compute jank thresholds against the detected target frame rate
        /// instead of the display refresh rate.
        #[arg(long)]
        detect_target: bool,
        /// Compute jank thresholds against a fixed target frame rate.
        #[arg(long, conflicts_with = "detect_target")]
        target_fps: Option<f64>,
    },
    /// Print the pre-aggregated FPS histogram from a trace's summary line.
    Buckets { trace: PathBuf },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let logger = CliLogger::new(cli.json, cli.no_color);
    if let Err(err) = run(&cli, &logger) {
        logger.print_error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

fn run(cli: &Cli, logger: &CliLogger) -> Result<()> {
    let cfg = AnalysisConfig::load_optional(&cli.config);
    match &cli.command {
        Command::Analyze {
            trace,
            app_name,
            upload_index,
            detect_target,
            target_fps,
        } => {
            let content = read_trace(trace)?;
            let target_mode = match (*detect_target, target_fps) {
                (true, _) => TargetFpsMode::Detected,
                (false, Some(fps)) => TargetFpsMode::Fixed(*fps),
                (false, None) => TargetFpsMode::RefreshRate,
            };
            let options = AnalyzeOptions {
                file_name: trace
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned()),
                app_name_override: app_name.clone(),
                upload_index: *upload_index,
                target_mode,
            };
            let analysis = analyze_trace(&content, &options, &cfg)?;
            logger.print_analysis(&analysis)
        }
        Command::Buckets { trace } => {
            let content = read_trace(trace)?;
            let parsed = parse_trace(&content, None)?;
            match &parsed.session.fps_buckets {
                Some(buckets) => logger.print_buckets(buckets),
                None => {
                    logger.print_warning("trace has no summary histogram line");
                    Ok(())
                }
            }
        }
    }
}

fn read_trace(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading trace {}", path.display()))
}
