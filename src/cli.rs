use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dtm-mosaic")]
#[command(about = "Merge DTM tiles into a single streamable BigTIFF mosaic")]
#[command(version)]
pub struct Args {
    /// Directory searched recursively for .tif tiles
    #[arg(short, long, value_name = "DIR")]
    pub input: PathBuf,

    /// Output mosaic path (an existing file is replaced)
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Compression for the output (LZW, DEFLATE, ZSTD, NONE)
    #[arg(long, value_name = "TYPE", default_value = "LZW")]
    pub compression: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
