use crate::discover::discover_tiles;
use crate::error::{MosaicError, Result};
use crate::plan::{plan_mosaic, tile_window, MosaicPlan};
use crate::scan::{scan_tiles, TileExtent};
use gdal::cpl::CslStringList;
use gdal::raster::{Buffer, GdalDataType, GdalType};
use gdal::{Dataset, DriverManager};
use log::{debug, info};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Compression types the GTiff driver accepts for the mosaic.
pub const COMPRESSIONS: [&str; 4] = ["LZW", "DEFLATE", "ZSTD", "NONE"];

pub fn validate_compression(compression: &str) -> Result<()> {
    if !COMPRESSIONS.contains(&compression) {
        return Err(MosaicError::InvalidCompression(compression.to_string()));
    }
    Ok(())
}

/// Remove a leftover output from an earlier crash; a missing file is fine.
/// A half-written mosaic must never be appended to or repaired in place.
pub fn remove_stale_output(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed stale output {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// GTiff creation options for a tiled, losslessly compressed BigTIFF.
pub fn creation_options(compression: &str, block_size: usize) -> Vec<String> {
    vec![
        format!("COMPRESS={}", compression),
        "TILED=YES".to_string(),
        format!("BLOCKXSIZE={}", block_size),
        format!("BLOCKYSIZE={}", block_size),
        "BIGTIFF=YES".to_string(),
    ]
}

fn create_mosaic_dataset<T: GdalType>(
    out_path: &Path,
    plan: &MosaicPlan,
    compression: &str,
) -> Result<Dataset> {
    info!("Creating output mosaic: {}", out_path.display());

    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let mut options = CslStringList::new();
    for opt in creation_options(compression, plan.block_size) {
        options.add_string(&opt)?;
    }

    let mut dataset = driver.create_with_band_type_with_options::<T, _>(
        out_path,
        plan.width,
        plan.height,
        plan.profile.band_count,
        &options,
    )?;

    dataset.set_geo_transform(&plan.geo_transform())?;
    dataset.set_projection(&plan.profile.projection)?;

    if plan.profile.nodata.is_some() {
        for band_index in 1..=plan.profile.band_count {
            dataset
                .rasterband(band_index)?
                .set_no_data_value(plan.profile.nodata)?;
        }
    }

    Ok(dataset)
}

/// Copy one tile into its window of the mosaic, all bands. The tile dataset
/// and its pixel buffer are dropped before the function returns, so peak
/// memory stays bounded by a single tile.
fn copy_tile<T: GdalType + Copy>(
    dst: &mut Dataset,
    out_path: &Path,
    plan: &MosaicPlan,
    tile: &TileExtent,
) -> Result<()> {
    let src = Dataset::open(&tile.path).map_err(|e| MosaicError::TileRead {
        path: tile.path.clone(),
        source: e,
    })?;

    let window = tile_window(plan, tile);
    debug!(
        "Writing {} at ({}, {}) size {}x{}",
        tile.path.display(),
        window.col_off,
        window.row_off,
        window.width,
        window.height
    );

    for band_index in 1..=plan.profile.band_count {
        let mut buffer: Buffer<T> = src
            .rasterband(band_index)
            .and_then(|band| {
                band.read_as::<T>(
                    (0, 0),
                    (tile.width, tile.height),
                    (tile.width, tile.height),
                    None,
                )
            })
            .map_err(|e| MosaicError::TileRead {
                path: tile.path.clone(),
                source: e,
            })?;

        dst.rasterband(band_index)?
            .write(
                (window.col_off, window.row_off),
                (window.width, window.height),
                &mut buffer,
            )
            .map_err(|e| MosaicError::OutputWrite {
                path: out_path.to_path_buf(),
                source: e,
            })?;
    }

    Ok(())
}

fn write_mosaic<T, F>(
    out_path: &Path,
    plan: &MosaicPlan,
    tiles: &[TileExtent],
    compression: &str,
    on_tile: &mut F,
) -> Result<()>
where
    T: GdalType + Copy,
    F: FnMut(&Path),
{
    let mut dst = create_mosaic_dataset::<T>(out_path, plan, compression)?;

    for tile in tiles {
        copy_tile::<T>(&mut dst, out_path, plan, tile)?;
        on_tile(&tile.path);
    }

    dst.flush_cache().map_err(|e| MosaicError::OutputWrite {
        path: out_path.to_path_buf(),
        source: e,
    })?;

    info!(
        "Mosaic written to {} ({} tiles)",
        out_path.display(),
        tiles.len()
    );
    Ok(())
}

/// Stream every tile into the mosaic, one at a time. `on_tile` is invoked
/// once per written tile for progress reporting; it plays no part in
/// correctness.
pub fn merge_tiles<F>(
    out_path: &Path,
    plan: &MosaicPlan,
    tiles: &[TileExtent],
    compression: &str,
    mut on_tile: F,
) -> Result<()>
where
    F: FnMut(&Path),
{
    remove_stale_output(out_path)?;

    match plan.profile.data_type {
        GdalDataType::UInt8 => write_mosaic::<u8, F>(out_path, plan, tiles, compression, &mut on_tile),
        GdalDataType::UInt16 => write_mosaic::<u16, F>(out_path, plan, tiles, compression, &mut on_tile),
        GdalDataType::Int16 => write_mosaic::<i16, F>(out_path, plan, tiles, compression, &mut on_tile),
        GdalDataType::UInt32 => write_mosaic::<u32, F>(out_path, plan, tiles, compression, &mut on_tile),
        GdalDataType::Int32 => write_mosaic::<i32, F>(out_path, plan, tiles, compression, &mut on_tile),
        GdalDataType::Float32 => write_mosaic::<f32, F>(out_path, plan, tiles, compression, &mut on_tile),
        GdalDataType::Float64 => write_mosaic::<f64, F>(out_path, plan, tiles, compression, &mut on_tile),
        other => Err(MosaicError::UnsupportedDataType(other)),
    }
}

/// A planned merge: geometry fixed and tiles scanned, nothing written yet.
pub struct PlannedMerge {
    plan: MosaicPlan,
    tiles: Vec<TileExtent>,
}

impl PlannedMerge {
    pub fn plan(&self) -> &MosaicPlan {
        &self.plan
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Stream every planned tile into the mosaic at `out_path`.
    pub fn write<F>(&self, out_path: &Path, compression: &str, on_tile: F) -> Result<()>
    where
        F: FnMut(&Path),
    {
        validate_compression(compression)?;
        merge_tiles(out_path, &self.plan, &self.tiles, compression, on_tile)
    }
}

/// Discover, scan, and plan the mosaic beneath `tile_dir` without writing
/// anything. The returned handle exposes the tile count so callers can size
/// progress reporting before the write begins.
pub fn plan_merge(tile_dir: &Path) -> Result<PlannedMerge> {
    let paths = discover_tiles(tile_dir)?;
    if paths.is_empty() {
        return Err(MosaicError::EmptyInput(tile_dir.to_path_buf()));
    }
    info!("Found {} tiles under {}", paths.len(), tile_dir.display());

    let (tiles, profile) = scan_tiles(tile_dir, &paths)?;
    let plan = plan_mosaic(tile_dir, &tiles, &profile)?;
    info!(
        "Mosaic: {}x{} px, {} band(s), block size {}",
        plan.width, plan.height, plan.profile.band_count, plan.block_size
    );

    Ok(PlannedMerge { plan, tiles })
}

/// Merge all DTM tiles beneath `tile_dir` into one BigTIFF at `out_path`.
///
/// Streams tile-by-tile so RAM stays constant, picks a block size that obeys
/// GeoTIFF tiling rules even for small mosaics, and overwrites any
/// half-written output from an earlier crash.
pub fn merge_streaming<F>(
    tile_dir: &Path,
    out_path: &Path,
    compression: &str,
    on_tile: F,
) -> Result<()>
where
    F: FnMut(&Path),
{
    validate_compression(compression)?;
    plan_merge(tile_dir)?.write(out_path, compression, on_tile)
}
