use chrono::{DateTime, Datelike, Months, TimeZone, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Nodata value for integer-typed raster layers
pub const INTEGER_NODATA: i32 = i32::MIN;

/// One geolocated LiDAR shot with its named scalar attributes.
///
/// Coordinates are in the projected ground units of the tile grid.
/// `delta_time` is seconds since the mission epoch; `sensitivity` is the
/// continuous quality score used to rank shots within a pixel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShotRecord {
    pub x: f64,
    pub y: f64,
    pub delta_time: f64,
    pub sensitivity: f64,
    pub attrs: HashMap<String, f64>,
}

impl ShotRecord {
    /// Resolve a band name against this record.
    ///
    /// `delta_time` and `sensitivity` are rasterized like any other band, so
    /// they resolve to the dedicated fields rather than the attribute map.
    pub fn band_value(&self, name: &str) -> Option<f64> {
        match name {
            "delta_time" => Some(self.delta_time),
            "sensitivity" => Some(self.sensitivity),
            _ => self.attrs.get(name).copied(),
        }
    }
}

/// One table asset: the batch identifier plus its expanded shot records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShotBatch {
    pub asset_id: String,
    pub records: Vec<ShotRecord>,
}

/// Half-open UTC interval [start, end) covering exactly one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MonthWindow {
    /// Build the month window containing `moment`.
    ///
    /// `start` is always day 1 at 00:00 UTC; `end` is start plus one calendar
    /// month, so the December window rolls over into January of the next year.
    pub fn containing(moment: DateTime<Utc>) -> GridResult<MonthWindow> {
        let first_day = moment
            .date_naive()
            .with_day(1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(|| {
                GridError::InvalidArgument(format!("cannot normalize month start for {}", moment))
            })?;
        let start = Utc.from_utc_datetime(&first_day);
        let end = start.checked_add_months(Months::new(1)).ok_or_else(|| {
            GridError::InvalidArgument(format!("cannot compute month end for {}", moment))
        })?;
        Ok(MonthWindow { start, end })
    }

    /// True if `moment` falls inside [start, end)
    pub fn contains(&self, moment: DateTime<Utc>) -> bool {
        moment >= self.start && moment < self.end
    }

    pub fn month(&self) -> u32 {
        self.start.month()
    }

    pub fn year(&self) -> i32 {
        self.start.year()
    }
}

/// Exterior ring of a tile polygon in projected ground units
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGeometry {
    pub exterior: Vec<(f64, f64)>,
}

/// One cell of the processing grid: native geometry plus its CRS
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub grid_id: u32,
    pub geometry: TileGeometry,
    pub crs: String,
}

/// Axis-aligned bounding box in projected ground units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// An empty box that any call to `expand` will snap onto
    pub fn empty() -> Self {
        BoundingBox {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    /// Grow the box to include the point (x, y)
    pub fn expand(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Numeric kind of a raster band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandKind {
    Integer,
    Continuous,
}

/// Pixel data for one band; the variant carries the numeric typing
#[derive(Debug, Clone)]
pub enum BandData {
    /// f64 layer, nodata = NaN
    Continuous(Array2<f64>),
    /// i32 layer, nodata = INTEGER_NODATA
    Integer(Array2<i32>),
}

/// One named layer of the output raster
#[derive(Debug, Clone)]
pub struct RasterBand {
    pub name: String,
    pub data: BandData,
}

impl RasterBand {
    pub fn kind(&self) -> BandKind {
        match self.data {
            BandData::Continuous(_) => BandKind::Continuous,
            BandData::Integer(_) => BandKind::Integer,
        }
    }
}

/// Provenance metadata attached to every raster product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductMetadata {
    pub month: u32,
    pub year: i32,
    pub version: u32,
    /// Window start as epoch milliseconds (metadata convention, see core::temporal)
    pub time_start_ms: i64,
    /// Window end as epoch milliseconds
    pub time_end_ms: i64,
    pub table_asset_ids: Vec<String>,
}

/// The assembled multi-band image for one (tile, month) invocation
#[derive(Debug, Clone)]
pub struct RasterProduct {
    /// Ordered band layers; order and count match the canonical band schema
    pub bands: Vec<RasterBand>,
    pub bounds: BoundingBox,
    pub crs: String,
    /// Ground sample distance in projected units
    pub scale: f64,
    pub metadata: ProductMetadata,
}

impl RasterProduct {
    pub fn band(&self, name: &str) -> Option<&RasterBand> {
        self.bands.iter().find(|b| b.name == name)
    }

    pub fn band_names(&self) -> Vec<&str> {
        self.bands.iter().map(|b| b.name.as_str()).collect()
    }

    /// Map a ground coordinate to its (row, col) pixel index, if inside bounds.
    /// Row 0 is the top (max_y) edge.
    pub fn pixel_index(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        if !self.bounds.contains(x, y) {
            return None;
        }
        let (rows, cols) = match &self.bands.first()?.data {
            BandData::Continuous(a) => a.dim(),
            BandData::Integer(a) => a.dim(),
        };
        let col = (((x - self.bounds.min_x) / self.scale) as usize).min(cols.saturating_sub(1));
        let row = (((self.bounds.max_y - y) / self.scale) as usize).min(rows.saturating_sub(1));
        Some((row, col))
    }
}

/// Arguments for starting an export job
#[derive(Debug, Clone)]
pub struct ExportParameters {
    pub asset_id: String,
    pub product: RasterProduct,
    pub pyramiding_policy: HashMap<String, String>,
    pub crs: String,
    pub region: BoundingBox,
    pub overwrite: bool,
}

/// Error types for the rasterization pipeline
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid batch id format: {0}")]
    Format(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Out of range: {0}")]
    OutOfRange(String),

    #[error("Insufficient coverage: {0}")]
    InsufficientCoverage(String),

    #[error("Export backend error: {0}")]
    Backend(String),
}

/// Result type for pipeline operations
pub type GridResult<T> = Result<T, GridError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_window_normalizes_to_day_one() {
        let moment = Utc.with_ymd_and_hms(2019, 6, 17, 13, 45, 12).unwrap();
        let window = MonthWindow::containing(moment).unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2019, 6, 1, 0, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2019, 7, 1, 0, 0, 0).unwrap());
        assert!(window.contains(moment));
        assert_eq!(window.month(), 6);
        assert_eq!(window.year(), 2019);
    }

    #[test]
    fn test_month_window_december_rollover() {
        let moment = Utc.with_ymd_and_hms(2021, 12, 31, 23, 59, 59).unwrap();
        let window = MonthWindow::containing(moment).unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2021, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_month_window_is_half_open() {
        let window =
            MonthWindow::containing(Utc.with_ymd_and_hms(2019, 6, 1, 0, 0, 0).unwrap()).unwrap();
        assert!(window.contains(window.start));
        assert!(!window.contains(window.end));
    }

    #[test]
    fn test_bounding_box_expand_and_contains() {
        let mut bbox = BoundingBox::empty();
        bbox.expand(10.0, -5.0);
        bbox.expand(-3.0, 20.0);
        assert_eq!(bbox.min_x, -3.0);
        assert_eq!(bbox.max_y, 20.0);
        assert!(bbox.contains(0.0, 0.0));
        assert!(!bbox.contains(11.0, 0.0));
        assert_eq!(bbox.width(), 13.0);
        assert_eq!(bbox.height(), 25.0);
    }

    #[test]
    fn test_band_value_resolves_special_fields() {
        let mut attrs = HashMap::new();
        attrs.insert("pai".to_string(), 2.5);
        let record = ShotRecord {
            x: 0.0,
            y: 0.0,
            delta_time: 1234.5,
            sensitivity: 0.9,
            attrs,
        };
        assert_eq!(record.band_value("delta_time"), Some(1234.5));
        assert_eq!(record.band_value("sensitivity"), Some(0.9));
        assert_eq!(record.band_value("pai"), Some(2.5));
        assert_eq!(record.band_value("cover"), None);
    }
}
