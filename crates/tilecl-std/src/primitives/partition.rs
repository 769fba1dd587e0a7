use tilecl_runtime::{AtomicCell, Element, SharedMemory, Tile};

/// Partitions `values` in place within one tile and returns the number of elements satisfying
/// `pred`, which are moved before the others.
///
/// Lanes claim destination slots from two tile-local cursors, the front one for elements
/// satisfying `pred` and the back one for the others. The order within each side isn't
/// preserved.
pub fn tile_partition<T, P>(tile: &Tile, values: &mut [T], pred: &P) -> usize
where
    T: Element,
    P: Fn(&T) -> bool,
{
    let len = values.len();
    if len == 0 {
        return 0;
    }

    let front = AtomicCell::<usize>::new(0);
    let back = AtomicCell::<usize>::new(len);
    let mut scratch = SharedMemory::filled(tile, len, values[0]);

    tile.for_each_lane(|lane| {
        for index in tile.lane_block(lane.pos(), len) {
            let value = values[index];
            let slot = match pred(&value) {
                true => front.fetch_add(1),
                false => back.fetch_sub(1) - 1,
            };
            scratch[slot] = value;
        }
    });
    tile.sync_units();

    tile.for_each_lane(|lane| {
        for index in tile.lane_stride(lane.pos(), len) {
            values[index] = scratch[index];
        }
    });
    tile.sync_units();

    front.load()
}

/// Rotates `values` left by `shift` positions within one tile.
pub fn tile_rotate_left<T: Element>(tile: &Tile, values: &mut [T], shift: usize) {
    let len = values.len();
    if len == 0 || shift % len == 0 {
        return;
    }

    let shift = shift % len;
    let scratch = SharedMemory::from_fn(tile, len, |index| values[(index + shift) % len]);

    tile.for_each_lane(|lane| {
        for index in tile.lane_stride(lane.pos(), len) {
            values[index] = scratch[index];
        }
    });
    tile.sync_units();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilecl_runtime::{ComputeClient, ExecutionPolicy};

    #[test_log::test]
    fn partitions_every_tile() {
        let client = ComputeClient::new(ExecutionPolicy::new(3, 4));
        let mut values = (0..50u32).map(|i| (i * 37) % 50).collect::<Vec<_>>();
        let original = values.clone();
        let domain = client.policy().tiled_domain(values.len());

        let counts = client.launch_mut("partition", domain, &mut values, |tile, chunk| {
            tile_partition(tile, chunk, &|value: &u32| value % 3 == 0)
        });

        for (range, count) in domain.tile_ranges().zip(counts) {
            let chunk = &values[range.clone()];
            assert!(chunk[..count].iter().all(|value| value % 3 == 0));
            assert!(chunk[count..].iter().all(|value| value % 3 != 0));

            let mut actual = chunk.to_vec();
            let mut expected = original[range].to_vec();
            actual.sort();
            expected.sort();
            assert_eq!(actual, expected);
        }
    }

    #[test_log::test]
    fn rotates_segments() {
        let client = ComputeClient::new(ExecutionPolicy::new(2, 4));
        let mut values = (0..7u32).collect::<Vec<_>>();

        client.launch_segments("rotate", vec![&mut values[..]], |tile, segment| {
            tile_rotate_left(tile, segment, 3)
        });

        assert_eq!(values, vec![3, 4, 5, 6, 0, 1, 2]);
    }
}
