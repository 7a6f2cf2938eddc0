//! Core aggregation pipeline modules

pub mod assemble;
pub mod bands;
pub mod dispatch;
pub mod extract;
pub mod temporal;
pub mod window;

// Re-export main entry points
pub use assemble::{create_export, GRID_RESOLUTION, PRODUCT_VERSION};
pub use bands::{is_integer_band, raster_bands, BandExpander, PROFILE_LEVELS};
pub use dispatch::{start_export, ExportBackend, ExportTask, EXPORT_SCALE, MAX_PIXELS};
pub use extract::{buffered_bounds, select_shots, BUFFER_MARGIN, BUFFER_SEGMENTS};
pub use temporal::{metadata_timestamp_ms, mission_epoch_seconds, parse_acquisition_time};
pub use window::{validate_coverage, MIN_COVERAGE};
