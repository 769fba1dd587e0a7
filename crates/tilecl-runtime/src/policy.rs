use core::ops::Range;

use serde::{Deserialize, Serialize};

use crate::{HardwareProperties, config::PolicyConfig};

/// Number of lanes in a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileDim {
    /// The number of lanes executing in lock-step.
    pub width: u32,
}

impl TileDim {
    /// Creates a new tile dim, a tile always has at least one lane.
    pub const fn new(width: u32) -> Self {
        Self {
            width: if width == 0 { 1 } else { width },
        }
    }

    /// Total number of lanes per tile.
    pub const fn num_lanes(&self) -> u32 {
        self.width
    }
}

/// Determines how a problem is split into tiles.
///
/// The policy is total over every problem size: a problem of size `0` maps to a domain without
/// tiles. Sizes that would need more than `max_tile_count` tiles of the largest work quantum
/// are a caller contract violation and are not checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExecutionPolicy {
    tile_dim: TileDim,
    max_tile_count: u32,
    shared_memory_elems: usize,
}

impl Default for ExecutionPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TILE_WIDTH, Self::DEFAULT_MAX_TILE_COUNT)
    }
}

impl ExecutionPolicy {
    /// Tile width used when neither the configuration nor the hardware provide one.
    pub const DEFAULT_TILE_WIDTH: u32 = 256;
    /// Tile count ceiling used when neither the configuration nor the hardware provide one.
    pub const DEFAULT_MAX_TILE_COUNT: u32 = 1024;
    /// Number of elements that fit in the tile-local storage of one tile.
    pub const DEFAULT_SHARED_MEMORY_ELEMS: usize = 4096;

    /// Creates a policy with the given tile width and tile count ceiling.
    pub fn new(tile_width: u32, max_tile_count: u32) -> Self {
        Self {
            tile_dim: TileDim::new(tile_width),
            max_tile_count: max_tile_count.max(1),
            shared_memory_elems: Self::DEFAULT_SHARED_MEMORY_ELEMS,
        }
    }

    /// Resolves the policy from the hardware capabilities, overridden by the configuration.
    pub fn from_properties(properties: &HardwareProperties, config: &PolicyConfig) -> Self {
        let tile_width = config
            .tile_width
            .unwrap_or(properties.plane_size * HardwareProperties::PLANES_PER_TILE)
            .min(properties.max_tile_width);
        let max_tile_count = config
            .max_tile_count
            .unwrap_or(properties.max_tile_count);
        let shared_memory_elems = config
            .shared_memory_elems
            .unwrap_or(Self::DEFAULT_SHARED_MEMORY_ELEMS);

        Self::new(tile_width, max_tile_count).with_shared_memory_elems(shared_memory_elems)
    }

    /// Sets the capacity of the tile-local storage, in elements.
    pub fn with_shared_memory_elems(mut self, elems: usize) -> Self {
        // A bitonic merge needs room for at least one pair.
        self.shared_memory_elems = elems.max(2);
        self
    }

    /// The number of lanes per tile.
    pub fn tile_width(&self) -> u32 {
        self.tile_dim.width
    }

    /// The tile dimension.
    pub fn tile_dim(&self) -> TileDim {
        self.tile_dim
    }

    /// The maximum number of tiles a single launch may use.
    pub fn max_tile_count(&self) -> u32 {
        self.max_tile_count
    }

    /// The capacity of the tile-local storage, in elements.
    pub fn shared_memory_elems(&self) -> usize {
        self.shared_memory_elems
    }

    /// Number of elements handled by each tile for a problem of size `len`.
    ///
    /// The quantum is always a multiple of the tile width and is chosen to use as few tiles as
    /// possible under the tile count ceiling, not to minimize the work per lane.
    pub fn work_per_tile(&self, len: usize) -> usize {
        let width = self.tile_dim.width as usize;
        if len == 0 {
            return width;
        }

        let lanes = len.div_ceil(width);
        let tiles = lanes.min(self.max_tile_count as usize);

        lanes.div_ceil(tiles) * width
    }

    /// Number of tiles used for a problem of size `len`.
    pub fn tile_count(&self, len: usize) -> u32 {
        if len == 0 {
            return 0;
        }

        len.div_ceil(self.work_per_tile(len)) as u32
    }

    /// The launch descriptor covering a problem of size `len`.
    pub fn tiled_domain(&self, len: usize) -> TiledDomain {
        TiledDomain {
            len,
            tile_count: self.tile_count(len),
            tile_dim: self.tile_dim,
            work_per_tile: self.work_per_tile(len),
        }
    }

    /// A launch descriptor where a single tile covers the whole problem.
    ///
    /// Used to finalize per-tile partials, whose count is bounded by the tile count ceiling.
    pub fn single_tile(&self, len: usize) -> TiledDomain {
        TiledDomain {
            len,
            tile_count: u32::from(len > 0),
            tile_dim: self.tile_dim,
            work_per_tile: len.max(1),
        }
    }
}

/// Launch descriptor: the index space `[0, len)` split into contiguous tile ranges.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TiledDomain {
    /// The problem size.
    pub len: usize,
    /// The number of tiles to launch.
    pub tile_count: u32,
    /// The number of lanes in each tile.
    pub tile_dim: TileDim,
    /// The number of elements owned by every tile but the last one.
    pub work_per_tile: usize,
}

impl TiledDomain {
    /// Whether the domain launches no tile at all.
    pub fn is_empty(&self) -> bool {
        self.tile_count == 0
    }

    /// The half-open range of indices owned by the tile at `pos`.
    pub fn tile_range(&self, pos: u32) -> Range<usize> {
        let start = (pos as usize * self.work_per_tile).min(self.len);
        let end = (start + self.work_per_tile).min(self.len);
        start..end
    }

    /// The ranges owned by every tile, in tile order.
    pub fn tile_ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        (0..self.tile_count).map(|pos| self.tile_range(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn work_per_tile_uses_one_lane_per_element_under_the_ceiling() {
        let policy = ExecutionPolicy::new(32, 8);

        assert_eq!(policy.work_per_tile(1), 32);
        assert_eq!(policy.work_per_tile(32), 32);
        assert_eq!(policy.work_per_tile(33), 32);
        assert_eq!(policy.tile_count(33), 2);
        assert_eq!(policy.tile_count(256), 8);
    }

    #[test_log::test]
    fn work_per_tile_grows_once_the_ceiling_is_reached() {
        let policy = ExecutionPolicy::new(32, 8);

        // 257 elements need 9 lanes of work, spread over at most 8 tiles.
        assert_eq!(policy.work_per_tile(257), 64);
        assert_eq!(policy.tile_count(257), 5);
        assert_eq!(policy.work_per_tile(10_000), 32 * 40);
        assert!(policy.tile_count(10_000) <= 8);
    }

    #[test_log::test]
    fn empty_problem_launches_no_tile() {
        let policy = ExecutionPolicy::new(16, 4);
        let domain = policy.tiled_domain(0);

        assert!(domain.is_empty());
        assert_eq!(domain.tile_ranges().count(), 0);
        assert!(policy.single_tile(0).is_empty());
    }

    #[test_log::test]
    fn tile_ranges_partition_the_index_space() {
        for width in [1, 3, 4, 32] {
            for max_tiles in [1, 2, 7, 64] {
                let policy = ExecutionPolicy::new(width, max_tiles);
                for len in [1, 2, 5, 31, 32, 33, 100, 1000] {
                    let domain = policy.tiled_domain(len);
                    let mut expected_start = 0;
                    for range in domain.tile_ranges() {
                        assert_eq!(range.start, expected_start);
                        assert!(!range.is_empty());
                        expected_start = range.end;
                    }
                    assert_eq!(expected_start, len);
                    assert!(domain.tile_count <= max_tiles);
                    assert_eq!(domain.work_per_tile % width as usize, 0);
                }
            }
        }
    }

    #[test_log::test]
    fn zero_width_is_clamped_to_one_lane() {
        let policy = ExecutionPolicy::new(0, 0);

        assert_eq!(policy.tile_width(), 1);
        assert_eq!(policy.max_tile_count(), 1);
        assert_eq!(policy.tile_count(5), 1);
        assert_eq!(policy.work_per_tile(5), 5);
    }

    #[test_log::test]
    fn policy_from_properties_prefers_the_config() {
        let properties = HardwareProperties {
            plane_size: 8,
            num_cores: 4,
            max_tile_count: 64,
            max_tile_width: 1024,
        };
        let policy = ExecutionPolicy::from_properties(&properties, &PolicyConfig::default());
        assert_eq!(policy.tile_width(), 8 * HardwareProperties::PLANES_PER_TILE);
        assert_eq!(policy.max_tile_count(), 64);

        let config = PolicyConfig {
            tile_width: Some(4096),
            max_tile_count: Some(3),
            shared_memory_elems: Some(128),
            num_workers: None,
        };
        let policy = ExecutionPolicy::from_properties(&properties, &config);
        assert_eq!(policy.tile_width(), 1024);
        assert_eq!(policy.max_tile_count(), 3);
        assert_eq!(policy.shared_memory_elems(), 128);
    }
}
