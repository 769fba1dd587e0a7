use tilecl_runtime::{ComputeClient, Element, GlobalMut};

use crate::{exclusive_scan_in_place, lower_bound_by, tabulate, upper_bound_by};

/// Writes the elements of `input` whose index satisfies `keep` to the start of `output`, in
/// order, and returns their count.
///
/// The keep flags are scanned into output positions, then every kept element is scattered
/// to its position.
fn compact<T, K>(client: &ComputeClient, name: &str, input: &[T], output: &mut [T], keep: K) -> usize
where
    T: Element,
    K: Fn(usize) -> bool + Sync,
{
    let len = input.len();
    if len == 0 {
        return 0;
    }

    let mut flags = vec![false; len];
    tabulate(client, &mut flags, keep);

    let mut positions = vec![0usize; len];
    tabulate(client, &mut positions, |index| flags[index] as usize);
    exclusive_scan_in_place(client, &mut positions, 0, |a, b| a + b);

    let kept = positions[len - 1] + flags[len - 1] as usize;
    debug_assert!(output.len() >= kept, "The output is too small");
    log::trace!("{name}: kept {kept} of {len} elements");

    let output = GlobalMut::new(output);
    let (flags, positions) = (&flags, &positions);
    let domain = client.policy().tiled_domain(len);

    client.launch(name, domain, |tile| {
        let offset = tile.offset();
        tile.for_each_lane(|lane| {
            for index in tile.lane_block(lane.pos(), tile.len()).map(|index| offset + index) {
                if flags[index] {
                    // SAFETY: positions of kept elements are strictly increasing and below `kept`.
                    unsafe { output.write(positions[index], input[index]) };
                }
            }
        });
    });

    kept
}

/// Copies the elements of `input` satisfying `pred` to the start of `output`, keeping their
/// order. Returns the number of copied elements.
pub fn copy_if<T, P>(client: &ComputeClient, input: &[T], output: &mut [T], pred: P) -> usize
where
    T: Element,
    P: Fn(&T) -> bool + Sync,
{
    compact(client, "copy_if", input, output, |index| pred(&input[index]))
}

/// Copies the elements of `input` failing `pred` to the start of `output`, keeping their
/// order. Returns the number of copied elements.
pub fn remove_copy_if<T, P>(client: &ComputeClient, input: &[T], output: &mut [T], pred: P) -> usize
where
    T: Element,
    P: Fn(&T) -> bool + Sync,
{
    compact(client, "remove_copy_if", input, output, |index| !pred(&input[index]))
}

/// Moves the elements of `values` failing `pred` to its start, keeping their order, and
/// returns their count. The elements past the returned length are unspecified.
pub fn remove_if<T, P>(client: &ComputeClient, values: &mut [T], pred: P) -> usize
where
    T: Element,
    P: Fn(&T) -> bool + Sync,
{
    let input = values.to_vec();
    remove_copy_if(client, &input, values, pred)
}

/// Moves the elements satisfying `pred` before the others, keeping the relative order on
/// both sides. Returns the number of elements satisfying `pred`.
pub fn stable_partition<T, P>(client: &ComputeClient, values: &mut [T], pred: P) -> usize
where
    T: Element,
    P: Fn(&T) -> bool + Sync,
{
    let input = values.to_vec();
    let split = copy_if(client, &input, values, &pred);
    remove_copy_if(client, &input, &mut values[split..], &pred);
    split
}

/// Keeps the first element of every run of equal elements at the start of `values` and
/// returns the number of kept elements.
pub fn unique<T: Element + PartialEq>(client: &ComputeClient, values: &mut [T]) -> usize {
    unique_by(client, values, |a, b| a == b)
}

/// Keeps the first element of every run of elements equivalent according to `eq`.
pub fn unique_by<T, E>(client: &ComputeClient, values: &mut [T], eq: E) -> usize
where
    T: Element,
    E: Fn(&T, &T) -> bool + Sync,
{
    let input = values.to_vec();
    unique_copy_by(client, &input, values, eq)
}

/// Copies the first element of every run of equal elements of `input` to `output`.
pub fn unique_copy<T>(client: &ComputeClient, input: &[T], output: &mut [T]) -> usize
where
    T: Element + PartialEq,
{
    unique_copy_by(client, input, output, |a, b| a == b)
}

/// Copies the first element of every run of elements equivalent according to `eq` to
/// `output` and returns the number of copied elements.
pub fn unique_copy_by<T, E>(client: &ComputeClient, input: &[T], output: &mut [T], eq: E) -> usize
where
    T: Element,
    E: Fn(&T, &T) -> bool + Sync,
{
    compact(client, "unique", input, output, |index| {
        index == 0 || !eq(&input[index - 1], &input[index])
    })
}

/// Copies the elements of the sorted `lhs` not found in the sorted `rhs` to `output`.
pub fn set_difference<T>(client: &ComputeClient, lhs: &[T], rhs: &[T], output: &mut [T]) -> usize
where
    T: Element + PartialOrd,
{
    set_difference_by(client, lhs, rhs, output, |a, b| a < b)
}

/// Copies the elements of `lhs` not found in `rhs`, both sorted by `less`, to `output` and
/// returns their count.
///
/// Equivalent elements are counted: a value found `m` times in `lhs` and `n` times in `rhs`
/// is copied `m - n` times, keeping its last copies in `lhs`.
pub fn set_difference_by<T, F>(
    client: &ComputeClient,
    lhs: &[T],
    rhs: &[T],
    output: &mut [T],
    less: F,
) -> usize
where
    T: Element,
    F: Fn(&T, &T) -> bool + Sync,
{
    compact(client, "set_difference", lhs, output, |index| {
        let (rank, matches) = run_position(lhs, rhs, index, &less);
        rank >= matches
    })
}

/// Copies the elements of the sorted `lhs` also found in the sorted `rhs` to `output`.
pub fn set_intersection<T>(client: &ComputeClient, lhs: &[T], rhs: &[T], output: &mut [T]) -> usize
where
    T: Element + PartialOrd,
{
    set_intersection_by(client, lhs, rhs, output, |a, b| a < b)
}

/// Copies the elements of `lhs` also found in `rhs`, both sorted by `less`, to `output` and
/// returns their count.
///
/// A value found `m` times in `lhs` and `n` times in `rhs` is copied `min(m, n)` times,
/// keeping its first copies in `lhs`.
pub fn set_intersection_by<T, F>(
    client: &ComputeClient,
    lhs: &[T],
    rhs: &[T],
    output: &mut [T],
    less: F,
) -> usize
where
    T: Element,
    F: Fn(&T, &T) -> bool + Sync,
{
    compact(client, "set_intersection", lhs, output, |index| {
        let (rank, matches) = run_position(lhs, rhs, index, &less);
        rank < matches
    })
}

// Rank of `lhs[index]` within its run of equivalent elements, and the length of the same run
// in `rhs`.
fn run_position<T, F>(lhs: &[T], rhs: &[T], index: usize, less: &F) -> (usize, usize)
where
    F: Fn(&T, &T) -> bool,
{
    let value = &lhs[index];
    let rank = index - lower_bound_by(&lhs[..index], value, less);
    let matches = upper_bound_by(rhs, value, less) - lower_bound_by(rhs, value, less);
    (rank, matches)
}
