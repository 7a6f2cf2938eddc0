//! GridShot: a monthly rasterizer for spaceborne LiDAR shot tables
//!
//! This library turns monthly collections of irregularly-located LiDAR shot
//! records into one fixed-grid multi-band raster per spatial tile. It owns
//! the aggregation semantics: validating that a batch manifest belongs to the
//! claimed month, selecting the best shot per output pixel by sensitivity,
//! assembling a mixed-type band stack, and packaging the export request for
//! the external execution system.

pub mod core;
pub mod io;
pub mod pipeline;
pub mod types;

// Re-export main types and functions for easier access
pub use types::{
    BandData, BandKind, BoundingBox, ExportParameters, GridError, GridResult, MonthWindow,
    ProductMetadata, RasterBand, RasterProduct, ShotBatch, ShotRecord, Tile, TileGeometry,
    INTEGER_NODATA,
};

pub use crate::core::{create_export, start_export, ExportBackend, ExportTask};
pub use io::{ManifestReader, ShotSource, TileCatalog};
pub use pipeline::{rasterize_tile, run, PipelineConfig};
