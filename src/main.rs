use clap::Parser;
use env_logger::Env;
use indicatif::ProgressBar;
use log::info;

mod cli;
mod discover;
mod error;
mod merge;
mod plan;
mod scan;

use cli::Args;
use error::Result;

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logger
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    info!("=== DTM Tile Mosaic ===");

    merge::validate_compression(&args.compression)?;

    let planned = merge::plan_merge(&args.input)?;
    info!("Using {} compression", args.compression);

    let bar = ProgressBar::new(planned.tile_count() as u64);
    planned.write(&args.output, &args.compression, |_| bar.inc(1))?;
    bar.finish();

    info!("=== Done! ===");
    Ok(())
}
