use core::ops::Range;

use tilecl_runtime::{Element, SharedMemory, Tile};

/// Per-lane digit counts of the keys owned by one tile, stored lane-major.
///
/// Only as many lanes as fit `lanes * radix` counters in the tile-local storage take part,
/// each counting a contiguous block of the keys.
#[derive(Debug)]
pub struct DigitCounts {
    counts: SharedMemory<usize>,
    lanes: usize,
    per_lane: usize,
    radix: usize,
    len: usize,
}

/// Counts the digits of `keys` per lane within one tile.
///
/// `digit` maps a key to its digit in `[0, radix)`. `capacity` is the number of counters the
/// tile-local storage can hold.
pub fn tile_digit_counts<K, D>(
    tile: &Tile,
    keys: &[K],
    radix: usize,
    capacity: usize,
    digit: &D,
) -> DigitCounts
where
    K: Element,
    D: Fn(K) -> usize,
{
    let len = keys.len();
    let lanes = tile.active_lanes(len).min(capacity / radix).max(1);
    let per_lane = len.div_ceil(lanes);

    let mut digits = DigitCounts {
        counts: SharedMemory::filled(tile, lanes * radix, 0),
        lanes,
        per_lane,
        radix,
        len,
    };

    tile.for_each_lane(|lane| {
        let pos = lane.pos() as usize;
        if pos >= lanes {
            return;
        }
        for index in digits.block(pos) {
            digits.counts[pos * radix + digit(keys[index])] += 1;
        }
    });
    tile.sync_units();

    digits
}

impl DigitCounts {
    /// Number of lanes holding counters.
    pub fn lanes(&self) -> usize {
        self.lanes
    }

    /// The contiguous block of keys counted by `lane`.
    pub fn block(&self, lane: usize) -> Range<usize> {
        let start = (lane * self.per_lane).min(self.len);
        let end = (start + self.per_lane).min(self.len);
        start..end
    }

    /// The number of keys with `digit` counted by `lane`.
    pub fn count(&self, lane: usize, digit: usize) -> usize {
        self.counts[lane * self.radix + digit]
    }

    /// Total count of every digit over the lanes.
    pub fn totals(&self, tile: &Tile) -> Vec<usize> {
        let mut totals = vec![0; self.radix];
        tile.for_each_lane(|lane| {
            for digit in tile.lane_stride(lane.pos(), self.radix) {
                totals[digit] = (0..self.lanes).map(|lane| self.count(lane, digit)).sum();
            }
        });
        tile.sync_units();

        totals
    }

    /// Replaces every count by the number of keys with the same digit counted by the lanes
    /// before it, which is the rank of the lane's first key within its digit.
    pub fn exclusive_lane_prefix(&mut self, tile: &Tile) {
        let (lanes, radix) = (self.lanes, self.radix);
        let counts = &mut self.counts;

        tile.for_each_lane(|lane| {
            for digit in tile.lane_stride(lane.pos(), radix) {
                let mut running = 0;
                for owner in 0..lanes {
                    let slot = owner * radix + digit;
                    let count = counts[slot];
                    counts[slot] = running;
                    running += count;
                }
            }
        });
        tile.sync_units();
    }

    /// Returns the current rank of `digit` for `lane` and increments it.
    pub fn next_rank(&mut self, lane: usize, digit: usize) -> usize {
        let slot = &mut self.counts[lane * self.radix + digit];
        let rank = *slot;
        *slot += 1;
        rank
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilecl_runtime::{ComputeClient, ExecutionPolicy};

    #[test_log::test]
    fn counts_digits_per_lane() {
        let client = ComputeClient::new(ExecutionPolicy::new(4, 1));
        let keys = (0..30u32).map(|i| (i * 7) % 10).collect::<Vec<_>>();
        let digit = |key: u32| (key % 4) as usize;

        let outputs = client.launch("histogram", client.policy().tiled_domain(30), |tile| {
            let counts = tile_digit_counts(tile, &keys, 4, 4096, &digit);
            let per_lane = (0..counts.lanes())
                .map(|lane| (0..4).map(|d| counts.count(lane, d)).collect::<Vec<_>>())
                .collect::<Vec<_>>();
            (counts.lanes(), per_lane, counts.totals(tile))
        });

        let (lanes, per_lane, totals) = &outputs[0];
        assert_eq!(*lanes, 4);
        let mut expected = vec![0; 4];
        keys.iter().for_each(|key| expected[digit(*key)] += 1);
        assert_eq!(*totals, expected);
        assert_eq!(per_lane[0], vec![3, 3, 1, 1]);
    }

    #[test_log::test]
    fn lanes_are_limited_by_the_capacity() {
        let client = ComputeClient::new(ExecutionPolicy::new(8, 1));
        let keys = vec![3u8; 64];

        let outputs = client.launch("histogram", client.policy().tiled_domain(64), |tile| {
            let mut counts = tile_digit_counts(tile, &keys, 16, 40, &|key: u8| key as usize);
            counts.exclusive_lane_prefix(tile);
            (counts.lanes(), counts.next_rank(1, 3), counts.next_rank(1, 3))
        });

        assert_eq!(outputs, vec![(2, 32, 33)]);
    }
}
