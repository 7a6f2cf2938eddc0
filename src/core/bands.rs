use std::collections::HashMap;

/// Number of vertical profile levels per band family
pub const PROFILE_LEVELS: usize = 30;

/// Table properties rasterized as integer bands.
///
/// All known integer properties of the L2B product are listed for safety,
/// even ones this schema does not currently rasterize. Any name absent from
/// this set is treated as continuous.
const INTEGER_PROPS: &[&str] = &[
    "algorithmrun_flag",
    "algorithmrun_flag_aN",
    "channel",
    "degrade_flag",
    "l2a_quality_flag",
    "l2b_quality_flag",
    "landsat_water_persistence",
    "leaf_off_flag",
    "leaf_on_cycle",
    "master_int",
    "num_detectedmodes",
    "pft_class",
    "region_class",
    "rg_eg_constraint_center_buffer",
    "rg_eg_flag_aN",
    "rg_eg_niter_aN",
    "selected_l2a_algorithm",
    "selected_mode",
    "selected_mode_flag",
    "selected_rg_algorithm",
    // Note that 'shot_number' is a long ingested as a string, so
    // we don't rasterize it.
    "stale_return_flag",
    "surface_flag",
    "urban_focal_window_size",
    "urban_proportion",
    // Fields added by splitting shot_number
    "minor_frame_number",
    "orbit_number",
    "shot_number_within_beam",
];

/// True if `name` is rasterized with an integer type
pub fn is_integer_band(name: &str) -> bool {
    INTEGER_PROPS.contains(&name)
}

/// Expands per-level band families, memoizing each prefix.
///
/// Expansion is a pure function of the prefix, so the cache is a plain
/// lookup-or-compute table with no invalidation.
#[derive(Debug, Default)]
pub struct BandExpander {
    cache: HashMap<String, Vec<String>>,
}

impl BandExpander {
    pub fn new() -> Self {
        Self::default()
    }

    /// `prefix` expanded to `prefix0..prefix29`, in numeric order
    pub fn profile_bands(&mut self, prefix: &str) -> Vec<String> {
        if let Some(cached) = self.cache.get(prefix) {
            return cached.clone();
        }
        let expanded: Vec<String> = (0..PROFILE_LEVELS)
            .map(|level| format!("{}{}", prefix, level))
            .collect();
        self.cache.insert(prefix.to_string(), expanded.clone());
        expanded
    }
}

/// The canonical ordered band list for the monthly product.
///
/// A subset of all available table properties: scalar bands interleaved with
/// the three per-level families (canopy cover, photosynthetically active
/// radiation fraction, and plant area volume density).
pub fn raster_bands() -> Vec<String> {
    let mut expander = BandExpander::new();
    let mut bands: Vec<String> = Vec::new();

    bands.extend(["algorithmrun_flag", "beam", "cover"].map(String::from));
    bands.extend(expander.profile_bands("cover_z"));
    bands.extend(
        [
            "degrade_flag",
            "delta_time",
            "fhd_normal",
            "l2b_quality_flag",
            "local_beam_azimuth",
            "local_beam_elevation",
            "pai",
        ]
        .map(String::from),
    );
    bands.extend(expander.profile_bands("pai_z"));
    bands.extend(expander.profile_bands("pavd_z"));
    bands.extend(
        [
            "pgap_theta",
            "selected_l2a_algorithm",
            "selected_rg_algorithm",
            "sensitivity",
            "solar_azimuth",
            "solar_elevation",
            "minor_frame_number",
            "orbit_number",
            "shot_number_within_beam",
        ]
        .map(String::from),
    );

    bands
}
