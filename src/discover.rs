use crate::error::Result;
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn is_tile(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("tif") || ext.eq_ignore_ascii_case("tiff"))
        .unwrap_or(false)
}

/// Recursively collect every GeoTIFF beneath `tile_dir`, sorted so the
/// processing order is deterministic across runs.
pub fn discover_tiles(tile_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(tile_dir) {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() && is_tile(entry.path()) {
            paths.push(entry.path().to_path_buf());
        }
    }
    paths.sort();
    debug!("Discovered {} tiles under {}", paths.len(), tile_dir.display());
    Ok(paths)
}
