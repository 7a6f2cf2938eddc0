use crate::core::temporal;
use crate::types::{BoundingBox, MonthWindow, ShotBatch, ShotRecord, TileGeometry};
use std::cmp::Ordering;
use std::f64::consts::TAU;

/// Outward margin applied to the tile geometry, in ground units
pub const BUFFER_MARGIN: f64 = 2500.0;

/// Segment budget for the circular-offset approximation
pub const BUFFER_SEGMENTS: usize = 25;

/// Buffer the tile geometry outward and reduce it to a bounding box.
///
/// The circular offset is discretized by sampling `segments` directions
/// around every exterior vertex, the same polygon-segment budget the
/// reference engine uses. A pure function of the geometry: identical input
/// yields an identical box.
pub fn buffered_bounds(geometry: &TileGeometry, margin: f64, segments: usize) -> BoundingBox {
    let mut bbox = BoundingBox::empty();
    for &(x, y) in &geometry.exterior {
        for k in 0..segments {
            let theta = TAU * k as f64 / segments as f64;
            bbox.expand(x + margin * theta.cos(), y + margin * theta.sin());
        }
    }
    bbox
}

/// Filter the union of all batch records to the processing boundary and the
/// month window, then order by descending sensitivity.
///
/// The time filter compares `delta_time` against the window bounds converted
/// with the mission-epoch convention, so records and window land on the same
/// scale. The ordering is load-bearing: the per-pixel reduction keeps the
/// first record it encounters, so the highest-sensitivity record must come
/// first within any pixel. Ties keep manifest order (stable sort).
pub fn select_shots(
    batches: &[ShotBatch],
    bounds: &BoundingBox,
    window: &MonthWindow,
) -> Vec<ShotRecord> {
    let t_start = temporal::mission_epoch_seconds(window.start);
    let t_end = temporal::mission_epoch_seconds(window.end);

    let mut shots: Vec<ShotRecord> = batches
        .iter()
        .flat_map(|batch| batch.records.iter())
        .filter(|r| bounds.contains(r.x, r.y) && r.delta_time >= t_start && r.delta_time < t_end)
        .cloned()
        .collect();

    shots.sort_by(|a, b| {
        b.sensitivity
            .partial_cmp(&a.sensitivity)
            .unwrap_or(Ordering::Equal)
    });

    log::debug!(
        "selected {} shots inside x[{:.1}, {:.1}] y[{:.1}, {:.1}], delta_time [{:.1}, {:.1})",
        shots.len(),
        bounds.min_x,
        bounds.max_x,
        bounds.min_y,
        bounds.max_y,
        t_start,
        t_end
    );
    shots
}
