use core::ops::Range;

use tilecl_runtime::{ComputeClient, Element};

use crate::{
    find_first,
    primitives::{tile_partition, tile_rotate_left},
};

/// A partitioned range: `[start, split)` satisfies the predicate, `[split, end)` doesn't.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Group {
    start: usize,
    split: usize,
    end: usize,
}

/// Moves the elements of `values` satisfying `pred` before the others and returns their count.
///
/// Every tile partitions its range, then adjacent groups of tiles are merged pairwise in
/// `ceil(log2 tiles)` rounds: the elements failing `pred` on the left and the elements
/// satisfying it on the right swap places with a rotation. The order within each side isn't
/// preserved.
pub fn partition<T, P>(client: &ComputeClient, values: &mut [T], pred: P) -> usize
where
    T: Element,
    P: Fn(&T) -> bool + Sync,
{
    let len = values.len();
    if len == 0 {
        return 0;
    }

    let domain = client.policy().tiled_domain(len);
    let counts = client.launch_mut("partition_tiles", domain, values, |tile, chunk| {
        tile_partition(tile, chunk, &pred)
    });

    let mut groups = domain
        .tile_ranges()
        .zip(counts)
        .map(|(range, count)| Group {
            start: range.start,
            split: range.start + count,
            end: range.end,
        })
        .collect::<Vec<_>>();

    let mut round = 0;
    while groups.len() > 1 {
        let mut rotations = Vec::new();
        let merged = groups
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => {
                    let misplaced = left.end - left.split;
                    let satisfied = right.split - right.start;
                    if misplaced > 0 && satisfied > 0 {
                        rotations.push((left.split..right.split, misplaced));
                    }
                    Group {
                        start: left.start,
                        split: left.split + satisfied,
                        end: right.end,
                    }
                }
                [single] => *single,
                _ => unreachable!("Chunks have one or two groups"),
            })
            .collect::<Vec<_>>();

        client.log_algorithm(format_args!(
            "partition: round {round}, {} groups, {} rotations",
            groups.len(),
            rotations.len()
        ));
        rotate_ranges(client, values, &rotations);

        groups = merged;
        round += 1;
    }

    groups[0].split
}

// Rotates every disjoint range left by its shift, one tile per range.
fn rotate_ranges<T: Element>(
    client: &ComputeClient,
    values: &mut [T],
    rotations: &[(Range<usize>, usize)],
) {
    if rotations.is_empty() {
        return;
    }

    let ranges = rotations.iter().map(|(range, _)| range.clone());
    let segments = disjoint_segments(values, ranges);

    client.launch_segments("partition_rotate", segments, |tile, segment| {
        let (_, shift) = rotations[tile.pos() as usize];
        tile_rotate_left(tile, segment, shift);
    });
}

/// Splits `values` into the given ranges, which must be sorted and disjoint.
pub(crate) fn disjoint_segments<T, I>(values: &mut [T], ranges: I) -> Vec<&mut [T]>
where
    I: IntoIterator<Item = Range<usize>>,
{
    let mut segments = Vec::new();
    let mut rest = values;
    let mut consumed = 0;

    for range in ranges {
        let (_, tail) = core::mem::take(&mut rest).split_at_mut(range.start - consumed);
        let (segment, tail) = tail.split_at_mut(range.len());
        segments.push(segment);
        rest = tail;
        consumed = range.end;
    }

    segments
}

/// Whether every element satisfying `pred` comes before every element failing it.
pub fn is_partitioned<T, P>(client: &ComputeClient, values: &[T], pred: P) -> bool
where
    T: Element,
    P: Fn(&T) -> bool + Sync,
{
    if values.len() < 2 {
        return true;
    }

    find_first(client, values.len() - 1, |index| {
        !pred(&values[index]) && pred(&values[index + 1])
    })
    .is_none()
}

/// The index of the first element failing `pred` in a partitioned range.
pub fn partition_point<T, P>(values: &[T], pred: P) -> usize
where
    P: Fn(&T) -> bool,
{
    let (mut low, mut high) = (0, values.len());
    while low < high {
        let mid = low + (high - low) / 2;
        match pred(&values[mid]) {
            true => low = mid + 1,
            false => high = mid,
        }
    }
    low
}
