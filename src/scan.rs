use crate::error::{MosaicError, Result};
use gdal::raster::GdalDataType;
use gdal::Dataset;
use log::debug;
use std::path::{Path, PathBuf};

/// Tolerance when comparing tile pixel sizes against the reference grid.
const PIXEL_EPSILON: f64 = 1e-9;

/// Geospatial footprint of one input tile, read from metadata only.
#[derive(Debug, Clone)]
pub struct TileExtent {
    pub path: PathBuf,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
    /// Pixel dimensions of the tile itself.
    pub width: usize,
    pub height: usize,
}

/// Grid parameters shared by every tile, taken from the reference tile.
#[derive(Debug, Clone)]
pub struct RasterProfile {
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub data_type: GdalDataType,
    pub band_count: usize,
    pub nodata: Option<f64>,
    pub projection: String,
}

fn open_tile(path: &Path) -> Result<Dataset> {
    Dataset::open(path).map_err(|e| MosaicError::TileRead {
        path: path.to_path_buf(),
        source: e,
    })
}

fn read_extent(dataset: &Dataset, path: &Path) -> Result<TileExtent> {
    let (width, height) = dataset.raster_size();
    if width == 0 || height == 0 {
        return Err(MosaicError::InvalidDimensions(
            path.to_path_buf(),
            width,
            height,
        ));
    }

    let gt = dataset.geo_transform()?;
    let left = gt[0];
    let top = gt[3];
    let right = left + width as f64 * gt[1];
    // gt[5] is negative for north-up rasters
    let bottom = top + height as f64 * gt[5];

    Ok(TileExtent {
        path: path.to_path_buf(),
        left,
        bottom,
        right,
        top,
        width,
        height,
    })
}

fn read_profile(dataset: &Dataset, path: &Path) -> Result<RasterProfile> {
    let gt = dataset.geo_transform()?;
    if gt[2] != 0.0 || gt[4] != 0.0 {
        return Err(MosaicError::InconsistentTile {
            path: path.to_path_buf(),
            reason: format!(
                "geotransform has rotation terms ({}, {}); only north-up tiles are supported",
                gt[2], gt[4]
            ),
        });
    }
    let pixel_width = gt[1].abs();
    let pixel_height = gt[5].abs();

    if pixel_width <= 0.0 || pixel_height <= 0.0 {
        return Err(MosaicError::InvalidPixelSize(pixel_width.min(pixel_height)));
    }

    let projection = dataset.projection();
    if projection.is_empty() {
        return Err(MosaicError::NoCrs(path.to_path_buf()));
    }

    let band = dataset.rasterband(1)?;

    Ok(RasterProfile {
        pixel_width,
        pixel_height,
        data_type: band.band_type(),
        band_count: dataset.raster_count(),
        nodata: band.no_data_value(),
        projection,
    })
}

fn nodata_matches(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => x == y || (x.is_nan() && y.is_nan()),
        _ => false,
    }
}

/// Compare a tile's grid parameters against the reference profile, returning
/// a description of the first mismatch if any.
fn uniformity_mismatch(reference: &RasterProfile, tile: &RasterProfile) -> Option<String> {
    if (reference.pixel_width - tile.pixel_width).abs() > PIXEL_EPSILON
        || (reference.pixel_height - tile.pixel_height).abs() > PIXEL_EPSILON
    {
        return Some(format!(
            "pixel size {}x{} differs from reference {}x{}",
            tile.pixel_width, tile.pixel_height, reference.pixel_width, reference.pixel_height
        ));
    }
    if tile.data_type != reference.data_type {
        return Some(format!(
            "data type {:?} differs from reference {:?}",
            tile.data_type, reference.data_type
        ));
    }
    if tile.band_count != reference.band_count {
        return Some(format!(
            "band count {} differs from reference {}",
            tile.band_count, reference.band_count
        ));
    }
    if !nodata_matches(reference.nodata, tile.nodata) {
        return Some(format!(
            "nodata value {:?} differs from reference {:?}",
            tile.nodata, reference.nodata
        ));
    }
    if tile.projection != reference.projection {
        return Some("coordinate reference system differs from reference".to_string());
    }
    None
}

/// Read every tile's bounding box and validate that all tiles share the
/// reference tile's grid. No pixel data is touched.
pub fn scan_tiles(tile_dir: &Path, paths: &[PathBuf]) -> Result<(Vec<TileExtent>, RasterProfile)> {
    let Some(first) = paths.first() else {
        return Err(MosaicError::EmptyInput(tile_dir.to_path_buf()));
    };

    let mut tiles = Vec::with_capacity(paths.len());

    // Reference tile is opened once; its extent goes into the list like any
    // other tile's.
    let reference = open_tile(first)?;
    let profile = read_profile(&reference, first)?;
    tiles.push(read_extent(&reference, first)?);
    drop(reference);
    debug!(
        "Reference tile {}: pixel size {}x{}, {:?}, {} band(s), nodata {:?}",
        first.display(),
        profile.pixel_width,
        profile.pixel_height,
        profile.data_type,
        profile.band_count,
        profile.nodata
    );

    for path in &paths[1..] {
        let dataset = open_tile(path)?;
        let tile_profile = read_profile(&dataset, path)?;
        if let Some(reason) = uniformity_mismatch(&profile, &tile_profile) {
            return Err(MosaicError::InconsistentTile {
                path: path.clone(),
                reason,
            });
        }
        tiles.push(read_extent(&dataset, path)?);
    }

    Ok((tiles, profile))
}
