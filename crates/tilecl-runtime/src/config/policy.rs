/// Overrides of the execution policy resolved from the hardware properties.
///
/// Every field left to `None` falls back to the value derived from
/// [HardwareProperties::query](crate::HardwareProperties::query).
#[derive(Default, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PolicyConfig {
    /// Number of lanes per tile.
    #[serde(default)]
    pub tile_width: Option<u32>,
    /// Maximum number of tiles in a launch.
    #[serde(default)]
    pub max_tile_count: Option<u32>,
    /// Capacity of the tile-local storage, in elements.
    #[serde(default)]
    pub shared_memory_elems: Option<usize>,
    /// Number of worker threads executing tiles. Uses the global rayon pool when unset.
    #[serde(default)]
    pub num_workers: Option<usize>,
}
