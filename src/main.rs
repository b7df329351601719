// Command-line entry point for rev-callgraph.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use rev_callgraph::config::Config;
use rev_callgraph::infrastructure::{Cancellation, HeuristicCallerResolver};
use rev_callgraph::logging;
use rev_callgraph::ports::exporters::{exporter_for, JsonStyle, OutputFormat};
use rev_callgraph::ReverseCallUsecase;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Target symbol: `pkg/path.Func` or `pkg/path.Type#Method`
    target: String,

    /// Workspace root to scan for go.mod files (defaults to the current directory)
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// JSON layout when --format json
    #[arg(long, value_enum)]
    json_style: Option<JsonStyle>,

    /// Maximum reverse search depth (0 = unlimited)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Give up after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Config file (defaults to <dir>/rev-callgraph.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log search progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn run(cli: Cli) -> Result<()> {
    let dir = cli.dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let dir = std::path::absolute(&dir)
        .with_context(|| format!("Cannot resolve workspace path {}", dir.display()))?;

    let config = Config::discover(cli.config.as_deref(), &dir)?;
    let format = cli.format.or(config.format).unwrap_or_default();
    let json_style = cli.json_style.or(config.json_style).unwrap_or_default();
    let max_depth = cli.max_depth.or(config.max_depth).unwrap_or(0);

    let mut cancel = Cancellation::new();
    if let Some(secs) = cli.timeout.or(config.timeout_secs) {
        cancel = cancel.with_timeout(Duration::from_secs(secs));
    }
    let token = cancel.token().clone();
    ctrlc::set_handler(move || token.cancel()).context("Failed to install Ctrl-C handler")?;

    let usecase = ReverseCallUsecase {
        resolver: &HeuristicCallerResolver,
    };
    let tree = usecase
        .run(&cli.target, &dir, max_depth, &cancel)
        .with_context(|| format!("Failed to resolve callers of {}", cli.target))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    exporter_for(format, json_style)
        .export(&tree, &mut out)
        .context("Failed to write output")?;
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
