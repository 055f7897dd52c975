// Library exports for testing and reuse

pub mod cli;
pub mod discover;
pub mod error;
pub mod merge;
pub mod plan;
pub mod scan;

// Re-export commonly used types
pub use error::{MosaicError, Result};
pub use merge::{merge_streaming, merge_tiles, plan_merge, PlannedMerge};
pub use plan::{block_size, plan_mosaic, tile_window, MosaicPlan, Window};
pub use scan::{scan_tiles, RasterProfile, TileExtent};
