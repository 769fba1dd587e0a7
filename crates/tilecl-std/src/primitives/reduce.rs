use core::ops::Range;

use tilecl_runtime::{SharedMemory, Tile, View};

/// Reduces `range` of `input` within one tile.
///
/// Every lane folds a contiguous block of the range, then the lane partials are combined by a
/// tree reduction in tile-local storage. Elements are combined in index order, so `op` only
/// needs to be associative. Returns `None` for an empty range.
pub fn tile_reduce<V, F>(tile: &Tile, input: &V, range: Range<usize>, op: &F) -> Option<V::Item>
where
    V: View + ?Sized,
    F: Fn(V::Item, V::Item) -> V::Item,
{
    let len = range.len();
    if len == 0 {
        return None;
    }

    let active = tile.active_lanes(len);
    let mut partials = SharedMemory::from_fn(tile, active, |lane| {
        let block = tile.lane_block(lane as u32, len);
        let mut acc = input.read(range.start + block.start);
        for index in block.start + 1..block.end {
            acc = op(acc, input.read(range.start + index));
        }
        acc
    });

    partials.reduce(tile, active, op)
}
