//! Per-tile orchestration and the batch driver over the tile grid

use crate::core::{assemble, dispatch};
use crate::io::{ManifestReader, ShotSource, TileCatalog};
use crate::types::{GridResult, ShotBatch, Tile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Driver configuration for a monthly rasterization run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of grid cells to process, ids 1..=num_grid_cells
    pub num_grid_cells: u32,
    /// Whether exported assets may replace existing ones
    pub allow_overwrite: bool,
    /// Parent collection for destination asset ids
    pub raster_collection: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            num_grid_cells: 389,
            allow_overwrite: false,
            raster_collection: "LARSE/GEDI/GEDI02_B_002_MONTHLY".to_string(),
        }
    }
}

/// Rasterize one tile for one month and submit the export.
///
/// Loads every batch in the manifest, assembles the product, and dispatches
/// it. Returns the backend's job id. Any validation failure aborts this tile
/// before an export request is issued.
pub fn rasterize_tile(
    source: &dyn ShotSource,
    backend: &dyn dispatch::ExportBackend,
    asset_ids: &[String],
    raster_asset_id: &str,
    tile: &Tile,
    month: DateTime<Utc>,
    overwrite: bool,
) -> GridResult<String> {
    let batches: Vec<ShotBatch> = asset_ids
        .iter()
        .map(|id| source.load_batch(id))
        .collect::<GridResult<_>>()?;

    let params = assemble::create_export(&batches, raster_asset_id, tile, month, overwrite)?;
    dispatch::start_export(backend, params)
}

/// Run the monthly rasterization over every tile in the configured grid.
///
/// The manifest is read once and reused for all tiles. Errors propagate and
/// abort the run; callers wanting per-tile continuation drive
/// `rasterize_tile` themselves.
pub fn run<P: AsRef<Path>>(
    catalog: &dyn TileCatalog,
    source: &dyn ShotSource,
    backend: &dyn dispatch::ExportBackend,
    manifest_path: P,
    month: DateTime<Utc>,
    config: &PipelineConfig,
) -> GridResult<Vec<String>> {
    let asset_ids = ManifestReader::read_manifest(manifest_path)?;
    log::info!(
        "rasterizing {} grid cells for {} from {} batches",
        config.num_grid_cells,
        month.format("%Y-%m"),
        asset_ids.len()
    );

    let mut job_ids = Vec::with_capacity(config.num_grid_cells as usize);
    for grid_cell_id in 1..=config.num_grid_cells {
        let tile = catalog.tile(grid_cell_id)?;
        let raster_asset_id = format!("{}/{:03}", config.raster_collection, grid_cell_id);
        let job_id = rasterize_tile(
            source,
            backend,
            &asset_ids,
            &raster_asset_id,
            &tile,
            month,
            config.allow_overwrite,
        )?;
        job_ids.push(job_id);
    }
    Ok(job_ids)
}
