use crate::types::{GridResult, ShotBatch, Tile};

/// External catalog of processing tiles, queried by integer grid id.
///
/// Tiles must expose a native geometry and a CRS string; ids outside the
/// catalog are an error the caller decides how to handle.
pub trait TileCatalog {
    fn tile(&self, grid_id: u32) -> GridResult<Tile>;
}

/// External store that expands a batch identifier into its shot records
pub trait ShotSource {
    fn load_batch(&self, asset_id: &str) -> GridResult<ShotBatch>;
}
