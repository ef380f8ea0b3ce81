//! CLI module for the bgmatte library
//!
//! This module is only available when the "cli" feature is enabled.

use crate::{
    config::{Quality, SeparationConfig},
    processor::ForegroundSeparator,
    services::ConsoleProgressReporter,
};
use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Quality levels accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliQuality {
    /// Fast, minimal cleanup
    Standard,
    /// Balanced cleanup
    High,
    /// Maximum cleanup
    Ultra,
}

impl From<CliQuality> for Quality {
    fn from(value: CliQuality) -> Self {
        match value {
            CliQuality::Standard => Quality::Standard,
            CliQuality::High => Quality::High,
            CliQuality::Ultra => Quality::Ultra,
        }
    }
}

/// Remove the background from a still image
#[derive(Debug, Parser)]
#[command(name = "bgmatte", version, about)]
pub struct Cli {
    /// Input image (PNG or JPEG)
    pub input: PathBuf,

    /// Output PNG path (defaults to "<input stem>-matte.png")
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Quality profile
    #[arg(short, long, value_enum, default_value = "high")]
    pub quality: CliQuality,

    /// Longest-edge cap; larger inputs are downscaled proportionally
    #[arg(long, default_value_t = 4096)]
    pub max_edge: u32,

    /// Also write the final coverage mask as a grayscale PNG
    #[arg(long)]
    pub save_mask: Option<PathBuf>,

    /// Verbose output: debug logging and metadata as JSON
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let stem = self
                .input
                .file_stem()
                .map_or_else(|| "output".into(), |s| s.to_string_lossy().into_owned());
            self.input.with_file_name(format!("{}-matte.png", stem))
        })
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// CLI entry point
///
/// # Errors
/// Returns any error from decoding, processing, or encoding; exit status is
/// non-zero in that case.
pub fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = SeparationConfig::builder()
        .quality(cli.quality.into())
        .max_edge(cli.max_edge)
        .debug(cli.verbose)
        .build()?;

    let separator =
        ForegroundSeparator::new(config)?.with_reporter(Box::new(ConsoleProgressReporter));

    let input_bytes = std::fs::read(&cli.input)
        .with_context(|| format!("failed to read '{}'", cli.input.display()))?;
    let result = separator
        .process_bytes(&input_bytes)
        .with_context(|| format!("failed to process '{}'", cli.input.display()))?;

    let output_path = cli.output_path();
    result
        .save_png(&output_path)
        .with_context(|| format!("failed to write '{}'", output_path.display()))?;

    if let Some(mask_path) = &cli.save_mask {
        result
            .mask
            .save_png(mask_path)
            .with_context(|| format!("failed to write '{}'", mask_path.display()))?;
    }

    tracing::info!(
        "{} -> {} ({})",
        cli.input.display(),
        output_path.display(),
        result.timings().summary()
    );

    if cli.verbose {
        println!("{}", serde_json::to_string_pretty(&result.metadata)?);
    }

    Ok(())
}
