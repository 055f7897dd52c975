use crate::error::{MosaicError, Result};
use crate::scan::{RasterProfile, TileExtent};
use log::debug;
use std::path::Path;

pub const MIN_BLOCK: usize = 16;
pub const MAX_BLOCK: usize = 512;

/// Mosaic geometry derived from the tile footprints before any pixel I/O.
///
/// Width and height are the pixel dimensions of the union of all tile
/// bounding boxes, rounded to the nearest whole pixel. Rounding (rather than
/// ceiling) can drop a fractional final pixel at the mosaic edge; inputs on a
/// shared grid are unaffected.
#[derive(Debug, Clone)]
pub struct MosaicPlan {
    pub left: f64,
    pub top: f64,
    pub width: usize,
    pub height: usize,
    pub block_size: usize,
    pub profile: RasterProfile,
}

impl MosaicPlan {
    /// GDAL geotransform for the mosaic (north-up, so dy is negative).
    pub fn geo_transform(&self) -> [f64; 6] {
        [
            self.left,
            self.profile.pixel_width,
            0.0,
            self.top,
            0.0,
            -self.profile.pixel_height,
        ]
    }
}

/// Placement of one tile within the mosaic, in output pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub col_off: isize,
    pub row_off: isize,
    pub width: usize,
    pub height: usize,
}

/// Largest multiple of 16 that fits the smaller raster dimension, clamped to
/// [16, 512]. GeoTIFF requires tile dimensions that are multiples of 16; the
/// clamp keeps tiny mosaics (e.g. a single small tile) valid.
pub fn block_size(width: usize, height: usize) -> usize {
    let min_dim = width.min(height);
    (min_dim / 16 * 16).clamp(MIN_BLOCK, MAX_BLOCK)
}

/// Derive the mosaic geometry covering every tile's bounding box.
pub fn plan_mosaic(
    tile_dir: &Path,
    tiles: &[TileExtent],
    profile: &RasterProfile,
) -> Result<MosaicPlan> {
    if tiles.is_empty() {
        return Err(MosaicError::EmptyInput(tile_dir.to_path_buf()));
    }

    let left = tiles.iter().map(|t| t.left).fold(f64::INFINITY, f64::min);
    let bottom = tiles
        .iter()
        .map(|t| t.bottom)
        .fold(f64::INFINITY, f64::min);
    let right = tiles
        .iter()
        .map(|t| t.right)
        .fold(f64::NEG_INFINITY, f64::max);
    let top = tiles.iter().map(|t| t.top).fold(f64::NEG_INFINITY, f64::max);

    let width = ((right - left) / profile.pixel_width).round() as usize;
    let height = ((top - bottom) / profile.pixel_height).round() as usize;
    let block_size = block_size(width, height);

    debug!(
        "Mosaic plan: extent=({}, {})-({}, {}), {}x{} px, block size {}",
        left, bottom, right, top, width, height, block_size
    );

    Ok(MosaicPlan {
        left,
        top,
        width,
        height,
        block_size,
        profile: profile.clone(),
    })
}

/// Invert the mosaic geotransform against a tile's bounds. The window's
/// dimensions are the tile's own pixel dimensions; only the offsets are
/// computed, so a tile on the shared grid lands exactly on its pixels.
pub fn tile_window(plan: &MosaicPlan, tile: &TileExtent) -> Window {
    let col_off = ((tile.left - plan.left) / plan.profile.pixel_width).round() as isize;
    let row_off = ((plan.top - tile.top) / plan.profile.pixel_height).round() as isize;
    Window {
        col_off,
        row_off,
        width: tile.width,
        height: tile.height,
    }
}
