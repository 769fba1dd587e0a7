use tilecl_runtime::{Element, SharedMemory, Tile};

/// Inclusive scan of `values` in place within one tile, seeded with `carry`.
///
/// After the scan, `values[i] = carry ⊕ v0 ⊕ … ⊕ vi`. Lanes scan contiguous blocks, the lane
/// totals are scanned with a double-buffered Hillis-Steele network, then every lane applies
/// the prefix of the lanes before it. Returns the last scanned value, or `carry` when `values`
/// is empty.
pub fn tile_inclusive_scan<T, F>(tile: &Tile, values: &mut [T], carry: Option<T>, op: &F) -> Option<T>
where
    T: Element,
    F: Fn(T, T) -> T,
{
    let len = values.len();
    if len == 0 {
        return carry;
    }

    tile.for_each_lane(|lane| {
        let block = tile.lane_block(lane.pos(), len);
        for index in block.start + 1..block.end {
            values[index] = op(values[index - 1], values[index]);
        }
    });
    tile.sync_units();

    let active = tile.active_lanes(len);
    let mut totals =
        SharedMemory::from_fn(tile, active, |lane| values[tile.lane_block(lane as u32, len).end - 1]);
    let mut scratch = SharedMemory::filled(tile, active, totals[0]);

    let mut offset = 1;
    while offset < active {
        tile.for_each_lane(|lane| {
            for slot in tile.lane_stride(lane.pos(), active) {
                scratch[slot] = match slot >= offset {
                    true => op(totals[slot - offset], totals[slot]),
                    false => totals[slot],
                };
            }
        });
        tile.sync_units();
        core::mem::swap(&mut totals, &mut scratch);
        offset *= 2;
    }

    tile.for_each_lane(|lane| {
        let pos = lane.pos() as usize;
        let block = tile.lane_block(lane.pos(), len);
        if block.is_empty() {
            return;
        }

        let lane_prefix = (pos > 0).then(|| totals[pos - 1]);
        let prefix = match (carry, lane_prefix) {
            (Some(carry), Some(lane_prefix)) => Some(op(carry, lane_prefix)),
            (carry, None) => carry,
            (None, lane_prefix) => lane_prefix,
        };

        if let Some(prefix) = prefix {
            for index in block {
                values[index] = op(prefix, values[index]);
            }
        }
    });
    tile.sync_units();

    Some(values[len - 1])
}
