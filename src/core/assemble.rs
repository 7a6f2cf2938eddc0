use crate::core::{bands, extract, temporal, window};
use crate::types::{
    BandData, BoundingBox, ExportParameters, GridError, GridResult, MonthWindow, ProductMetadata,
    RasterBand, RasterProduct, ShotBatch, ShotRecord, Tile, INTEGER_NODATA,
};
use chrono::{DateTime, Utc};
use ndarray::Array2;
use std::collections::HashMap;

/// Ground sample distance of the monthly product, in projected units
pub const GRID_RESOLUTION: f64 = 25.0;

/// Fixed version tag carried in product metadata
pub const PRODUCT_VERSION: u32 = 1;

/// Build the export job definition for one (tile, month) invocation.
///
/// Validates the batch manifest against the month, selects the surviving
/// shots, reduces them first-wins onto a fixed 25-unit grid over the buffered
/// tile bounds, applies the integer-band casts, and packages the result with
/// its provenance metadata. Any failure leaves no partial product behind.
pub fn create_export(
    batches: &[ShotBatch],
    raster_asset_id: &str,
    tile: &Tile,
    month: DateTime<Utc>,
    overwrite: bool,
) -> GridResult<ExportParameters> {
    if batches.is_empty() {
        return Err(GridError::InvalidArgument(
            "no table asset ids specified".to_string(),
        ));
    }

    let stamps = batches
        .iter()
        .map(|batch| temporal::parse_acquisition_time(&batch.asset_id))
        .collect::<GridResult<Vec<_>>>()?;

    let month_window = MonthWindow::containing(month)?;
    window::validate_coverage(&month_window, &stamps)?;

    let band_names = bands::raster_bands();
    let bounds = extract::buffered_bounds(
        &tile.geometry,
        extract::BUFFER_MARGIN,
        extract::BUFFER_SEGMENTS,
    );
    let shots = extract::select_shots(batches, &bounds, &month_window);
    log::info!(
        "assembling tile {} for {}-{:02}: {} shots, {} bands",
        tile.grid_id,
        month_window.year(),
        month_window.month(),
        shots.len(),
        band_names.len()
    );

    let layers = rasterize_first(&shots, &band_names, &bounds, GRID_RESOLUTION);
    let typed = apply_band_types(layers);

    let metadata = ProductMetadata {
        month: month_window.month(),
        year: month_window.year(),
        version: PRODUCT_VERSION,
        time_start_ms: temporal::metadata_timestamp_ms(month_window.start),
        time_end_ms: temporal::metadata_timestamp_ms(month_window.end),
        table_asset_ids: batches.iter().map(|b| b.asset_id.clone()).collect(),
    };

    let product = RasterProduct {
        bands: typed,
        bounds,
        crs: tile.crs.clone(),
        scale: GRID_RESOLUTION,
        metadata,
    };

    let mut pyramiding_policy = HashMap::new();
    pyramiding_policy.insert(".default".to_string(), "sample".to_string());

    Ok(ExportParameters {
        asset_id: raster_asset_id.to_string(),
        product,
        pyramiding_policy,
        crs: tile.crs.clone(),
        region: bounds,
        overwrite,
    })
}

/// Reduce an ordered shot stream onto the grid, first record per pixel wins.
///
/// `shots` must already be sorted by descending sensitivity; the reduction
/// never averages, it keeps the first surviving record and drops the rest.
/// Pixels no shot touches stay NaN. The grid spans exactly `bounds`, so the
/// output is clipped by construction.
fn rasterize_first(
    shots: &[ShotRecord],
    band_names: &[String],
    bounds: &BoundingBox,
    scale: f64,
) -> Vec<RasterBand> {
    let cols = ((bounds.width() / scale).ceil() as usize).max(1);
    let rows = ((bounds.height() / scale).ceil() as usize).max(1);

    let mut layers: Vec<Array2<f64>> = band_names
        .iter()
        .map(|_| Array2::from_elem((rows, cols), f64::NAN))
        .collect();
    let mut claimed = Array2::from_elem((rows, cols), false);

    for shot in shots {
        let col = (((shot.x - bounds.min_x) / scale) as usize).min(cols - 1);
        let row = (((bounds.max_y - shot.y) / scale) as usize).min(rows - 1);
        if claimed[[row, col]] {
            continue;
        }
        claimed[[row, col]] = true;
        for (layer, name) in layers.iter_mut().zip(band_names) {
            if let Some(value) = shot.band_value(name) {
                layer[[row, col]] = value;
            }
        }
    }

    band_names
        .iter()
        .zip(layers)
        .map(|(name, data)| RasterBand {
            name: name.clone(),
            data: BandData::Continuous(data),
        })
        .collect()
}

/// Apply the mixed numeric typing to an all-continuous band stack.
///
/// Every band starts continuous; the integer-classified subset is overwritten
/// in place with truncating i32 casts. Overwriting by name keeps the original
/// band order and count. NaN pixels become the integer nodata value.
fn apply_band_types(bands: Vec<RasterBand>) -> Vec<RasterBand> {
    bands
        .into_iter()
        .map(|band| {
            if !bands::is_integer_band(&band.name) {
                return band;
            }
            let data = match band.data {
                BandData::Continuous(layer) => {
                    let cast = layer.mapv(|v| {
                        if v.is_nan() {
                            INTEGER_NODATA
                        } else {
                            v as i32
                        }
                    });
                    BandData::Integer(cast)
                }
                already_integer => already_integer,
            };
            RasterBand {
                name: band.name,
                data,
            }
        })
        .collect()
}
