use tilecl_runtime::{Element, SharedMemory, Tile};

/// An element of a sorting network, tagged with its position for stability.
///
/// Padding slots are invalid and compare greater than every valid element.
#[derive(Debug, Clone, Copy)]
struct Keyed<T> {
    value: T,
    tag: usize,
    valid: bool,
}

impl<T: Element> Keyed<T> {
    fn valid(value: T, tag: usize) -> Self {
        Self {
            value,
            tag,
            valid: true,
        }
    }

    fn padding(value: T) -> Self {
        Self {
            value,
            tag: usize::MAX,
            valid: false,
        }
    }

    // Strict total order: by value, then by tag, padding last.
    fn precedes<F: Fn(&T, &T) -> bool>(&self, other: &Self, less: &F) -> bool {
        match (self.valid, other.valid) {
            (false, _) => false,
            (true, false) => true,
            (true, true) => {
                if less(&self.value, &other.value) {
                    true
                } else if less(&other.value, &self.value) {
                    false
                } else {
                    self.tag < other.tag
                }
            }
        }
    }
}

/// Sorts `values` within one tile with a bitonic sorting network.
///
/// The network runs over the next power of two of the length, padded with slots ordered after
/// every element. Elements are tagged with their index, so equal elements keep their order.
pub fn tile_bitonic_sort<T, F>(tile: &Tile, values: &mut [T], less: &F)
where
    T: Element,
    F: Fn(&T, &T) -> bool,
{
    let len = values.len();
    if len <= 1 {
        return;
    }

    let size = len.next_power_of_two();
    let mut keys = SharedMemory::from_fn(tile, size, |index| match index < len {
        true => Keyed::valid(values[index], index),
        false => Keyed::padding(values[0]),
    });

    bitonic_stages(tile, &mut keys, 2, less);
    write_back(tile, &keys, values);
}

/// Merges the sorted `lhs` and `rhs` into `output` within one tile.
///
/// `reverse(lhs) ++ rhs` is a bitonic sequence, so only the last stage of the network is
/// needed. Elements of `lhs` come before equal elements of `rhs`.
pub fn tile_bitonic_merge<T, F>(tile: &Tile, lhs: &[T], rhs: &[T], output: &mut [T], less: &F)
where
    T: Element,
    F: Fn(&T, &T) -> bool,
{
    let (n1, n2) = (lhs.len(), rhs.len());
    let len = n1 + n2;
    debug_assert_eq!(output.len(), len, "The output must fit both inputs");

    if n1 == 0 || n2 == 0 {
        let source = if n1 == 0 { rhs } else { lhs };
        tile.for_each_lane(|lane| {
            for index in tile.lane_stride(lane.pos(), len) {
                output[index] = source[index];
            }
        });
        tile.sync_units();
        return;
    }

    let size = len.next_power_of_two();
    let mut keys = SharedMemory::from_fn(tile, size, |index| {
        if index < n1 {
            let source = n1 - 1 - index;
            Keyed::valid(lhs[source], source)
        } else if index < len {
            let source = index - n1;
            Keyed::valid(rhs[source], n1 + source)
        } else {
            Keyed::padding(lhs[0])
        }
    });

    bitonic_stages(tile, &mut keys, size, less);
    write_back(tile, &keys, output);
}

// Runs the compare-exchange stages of the network for every block size from `first_block` up
// to the length of `keys`.
fn bitonic_stages<T, F>(tile: &Tile, keys: &mut [Keyed<T>], first_block: usize, less: &F)
where
    T: Element,
    F: Fn(&T, &T) -> bool,
{
    let size = keys.len();
    let mut block = first_block;

    while block <= size {
        let mut stride = block / 2;
        while stride > 0 {
            tile.for_each_lane(|lane| {
                for index in tile.lane_stride(lane.pos(), size) {
                    let partner = index ^ stride;
                    if partner <= index {
                        continue;
                    }

                    let (a, b) = (keys[index], keys[partner]);
                    let ascending = index & block == 0;
                    let swap = match ascending {
                        true => b.precedes(&a, less),
                        false => a.precedes(&b, less),
                    };
                    if swap {
                        keys[index] = b;
                        keys[partner] = a;
                    }
                }
            });
            tile.sync_units();
            stride /= 2;
        }
        block *= 2;
    }
}

fn write_back<T: Element>(tile: &Tile, keys: &[Keyed<T>], output: &mut [T]) {
    let len = output.len();
    tile.for_each_lane(|lane| {
        for index in tile.lane_stride(lane.pos(), len) {
            output[index] = keys[index].value;
        }
    });
    tile.sync_units();
}
