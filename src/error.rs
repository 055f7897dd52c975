use gdal::raster::GdalDataType;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MosaicError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no .tif tiles found under {0}")]
    EmptyInput(PathBuf),

    #[error("{0} has no coordinate reference system")]
    NoCrs(PathBuf),

    #[error("inconsistent tile {path}: {reason}")]
    InconsistentTile { path: PathBuf, reason: String },

    #[error("failed to read tile {path}: {source}")]
    TileRead {
        path: PathBuf,
        source: gdal::errors::GdalError,
    },

    #[error("failed to write mosaic {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        source: gdal::errors::GdalError,
    },

    #[error("tile {0} has invalid dimensions: {1}x{2}")]
    InvalidDimensions(PathBuf, usize, usize),

    #[error("pixel size is non-positive: {0}")]
    InvalidPixelSize(f64),

    #[error("unsupported raster data type: {0:?}")]
    UnsupportedDataType(GdalDataType),

    #[error("invalid compression type: {0}")]
    InvalidCompression(String),
}

pub type Result<T> = std::result::Result<T, MosaicError>;
