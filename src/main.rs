use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use meterscan::{Configurations, MeterReader, batch};

#[derive(Parser)]
#[command(name = "meterscan")]
#[command(about = "Read seven-segment meter displays from photographs")]
struct Cli {
    /// Input image file, or a directory of images for batch mode
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Path to the JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// CSV destination for batch mode (must not already exist)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Worker threads for batch mode
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    // Configuration problems are fatal before any image is touched.
    let config = Configurations::load(&args.config)
        .with_context(|| format!("loading configuration {}", args.config.display()))?;
    let reader = MeterReader::new(config)?;

    if args.input.is_dir() {
        let output = args
            .output
            .context("--output <FILE> is required in batch mode")?;
        let files = batch::list_images(&args.input)?;
        if files.is_empty() {
            anyhow::bail!("no images found in {}", args.input.display());
        }
        let summary = batch::run_batch(&reader, &files, &output, args.jobs)?;

        println!(
            "decoded {} image(s), skipped {}",
            summary.decoded,
            summary.skipped.len()
        );
        for (file, err) in &summary.skipped {
            println!("  skipped {file}: {err}");
        }
    } else {
        let img = image::open(&args.input)
            .with_context(|| format!("loading image {}", args.input.display()))?
            .to_luma8();
        let digits = reader.read(&img)?;
        println!("{digits}");
    }

    Ok(())
}
