//! External boundary: manifest files and backing-store traits

pub mod manifest;
pub mod sources;

pub use manifest::ManifestReader;
pub use sources::{ShotSource, TileCatalog};
