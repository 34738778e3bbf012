use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use togif::{convert_files, progress_channel, resolve_patterns, ConversionReport, ConvertConfig, PaletteStrategy};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod display;

use display::ProgressDisplay;

/// Events buffered between the converter and the terminal display
const PROGRESS_BUFFER: usize = 64;

#[derive(Parser, Debug)]
#[command(name = "togif", version)]
#[command(about = "Convert a sequence of PNG images into an animated GIF")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert PNG images to GIF.
    ///
    /// Inputs may be glob patterns ("frames/*.png") or regular expressions
    /// matched against file names ("frames/^frame.*\.png$").
    Convert(ConvertArgs),
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Input PNG pattern; repeat the flag to add more
    #[arg(short = 'i', long = "input", value_name = "PATTERN", required = true)]
    inputs: Vec<String>,

    /// Output GIF file path
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Delay between frames in milliseconds
    #[arg(short, long, value_name = "MS", default_value_t = togif::DEFAULT_DELAY_MS, allow_negative_numbers = true)]
    delay: i64,

    /// Show detailed progress and list processed files
    #[arg(long)]
    debug: bool,

    /// Use the fixed 9-color palette instead of the input's own colors
    #[arg(long)]
    legacy_palette: bool,

    /// Write a JSON conversion report to this file
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

impl ConvertArgs {
    fn config(&self) -> ConvertConfig {
        let palette = if self.legacy_palette {
            PaletteStrategy::Legacy
        } else {
            PaletteStrategy::FrequencyRanked
        };
        ConvertConfig::default()
            .with_delay_ms(self.delay)
            .with_palette_strategy(palette)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Convert(args) => run_convert(args),
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    std::panic::set_hook(Box::new(|info| {
        error!(
            code = "E_PANIC",
            location = info.location().map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column())),
            "{}",
            info
        );
    }));
}

fn run_convert(args: ConvertArgs) -> Result<()> {
    init_tracing(args.debug);

    let inputs = resolve_patterns(&args.inputs)
        .with_context(|| format!("error expanding pattern {}", args.inputs.join(", ")))?;
    info!(files = inputs.len(), output = %args.output.display(), "Inputs resolved");

    let (sink, receiver) = progress_channel(PROGRESS_BUFFER);
    let files = inputs.iter().map(|p| p.display().to_string()).collect();
    let display = ProgressDisplay::new(args.debug, files);
    let display_thread = thread::spawn(move || display.run(receiver, &mut std::io::stderr()));

    let result = convert_files(&inputs, &args.output, args.config(), &sink);
    drop(sink);
    let display = display_thread
        .join()
        .map_err(|_| anyhow!("progress display thread panicked"))?;

    let report = result.with_context(|| format!("failed to create {}", args.output.display()))?;
    print!("{}", display.summary(&report.output_path));

    if let Some(path) = &args.report {
        write_report(&report, path)?;
    }
    Ok(())
}

fn write_report(report: &ConversionReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    std::fs::write(path, json).with_context(|| format!("failed to write report {}", path.display()))?;
    info!(path = %path.display(), "Report written");
    Ok(())
}
