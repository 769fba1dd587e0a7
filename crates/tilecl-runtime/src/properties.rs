/// Capabilities of the execution target, resolved once when a client is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HardwareProperties {
    /// Native SIMD lane width, in 32-bit lanes.
    pub plane_size: u32,
    /// Number of cores available to run tiles concurrently.
    pub num_cores: u32,
    /// Maximum number of tiles in a single launch.
    pub max_tile_count: u32,
    /// Maximum number of lanes in a tile.
    pub max_tile_width: u32,
}

impl HardwareProperties {
    /// Number of planes grouped in a tile when the tile width isn't configured.
    pub const PLANES_PER_TILE: u32 = 32;
    /// Tiles scheduled per core when the tile count ceiling isn't configured.
    const TILES_PER_CORE: u32 = 64;

    /// Queries the capabilities of the current machine.
    pub fn query() -> Self {
        let num_cores = std::thread::available_parallelism()
            .map(|cores| cores.get() as u32)
            .unwrap_or(1);

        let properties = Self {
            plane_size: native_plane_size(),
            num_cores,
            max_tile_count: (num_cores * Self::TILES_PER_CORE).clamp(16, 65_535),
            max_tile_width: 1024,
        };
        log::debug!("Hardware properties {properties:?}");

        properties
    }
}

fn native_plane_size() -> u32 {
    if cfg!(target_feature = "avx512f") {
        16
    } else if cfg!(target_feature = "avx2") {
        8
    } else {
        // SSE2 and NEON both provide 128-bit registers.
        4
    }
}
