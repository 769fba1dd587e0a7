use core::ops::Range;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tilecl_runtime::{ComputeClient, Element};

use crate::{disjoint_segments, find_first, partition, primitives::tile_bitonic_sort};

/// The ranks a sort has to put in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    /// Every rank.
    All,
    /// The ranks before the given one.
    Prefix(usize),
    /// Only the given rank.
    Nth(usize),
}

impl Target {
    fn refines(&self, range: &Range<usize>) -> bool {
        match self {
            Target::All => true,
            Target::Prefix(end) => range.start < *end,
            Target::Nth(rank) => range.contains(rank),
        }
    }
}

/// Sorts `values` in ascending order.
pub fn sort<T: Element + PartialOrd>(client: &ComputeClient, values: &mut [T]) {
    sort_by(client, values, |a, b| a < b);
}

/// Sorts `values` with the strict weak ordering `less`. The sort isn't stable.
///
/// Ranges larger than a tile are split around a random median-of-3 pivot into the elements
/// less than, equal to and greater than the pivot. Ranges fitting a tile are then sorted
/// together, one tile per range, by a bitonic network.
pub fn sort_by<T, F>(client: &ComputeClient, values: &mut [T], less: F)
where
    T: Element,
    F: Fn(&T, &T) -> bool + Sync,
{
    hybrid_sort(client, values, Target::All, &less);
}

/// Puts the `middle` smallest elements of `values` in ascending order at its start. The
/// order of the remaining elements is unspecified.
pub fn partial_sort<T: Element + PartialOrd>(client: &ComputeClient, values: &mut [T], middle: usize) {
    partial_sort_by(client, values, middle, |a, b| a < b);
}

/// Puts the `middle` smallest elements of `values` according to `less` in order at its start.
pub fn partial_sort_by<T, F>(client: &ComputeClient, values: &mut [T], middle: usize, less: F)
where
    T: Element,
    F: Fn(&T, &T) -> bool + Sync,
{
    hybrid_sort(client, values, Target::Prefix(middle), &less);
}

/// Puts the element of rank `nth` at index `nth`, smaller or equal elements before it and
/// greater or equal elements after it.
pub fn nth_element<T: Element + PartialOrd>(client: &ComputeClient, values: &mut [T], nth: usize) {
    nth_element_by(client, values, nth, |a, b| a < b);
}

/// Puts the element of rank `nth` according to `less` at index `nth`, partitioning the others
/// around it.
pub fn nth_element_by<T, F>(client: &ComputeClient, values: &mut [T], nth: usize, less: F)
where
    T: Element,
    F: Fn(&T, &T) -> bool + Sync,
{
    if nth < values.len() {
        hybrid_sort(client, values, Target::Nth(nth), &less);
    }
}

/// Whether `values` is sorted in ascending order.
pub fn is_sorted<T: Element + PartialOrd>(client: &ComputeClient, values: &[T]) -> bool {
    is_sorted_by(client, values, |a, b| a < b)
}

/// Whether `values` is sorted according to `less`.
pub fn is_sorted_by<T, F>(client: &ComputeClient, values: &[T], less: F) -> bool
where
    T: Element,
    F: Fn(&T, &T) -> bool + Sync,
{
    is_sorted_until_by(client, values, less) == values.len()
}

/// The length of the longest sorted prefix of `values`.
pub fn is_sorted_until<T: Element + PartialOrd>(client: &ComputeClient, values: &[T]) -> usize {
    is_sorted_until_by(client, values, |a, b| a < b)
}

/// The length of the longest prefix of `values` sorted according to `less`.
pub fn is_sorted_until_by<T, F>(client: &ComputeClient, values: &[T], less: F) -> usize
where
    T: Element,
    F: Fn(&T, &T) -> bool + Sync,
{
    if values.len() < 2 {
        return values.len();
    }

    find_first(client, values.len() - 1, |index| {
        less(&values[index + 1], &values[index])
    })
    .map_or(values.len(), |index| index + 1)
}

fn hybrid_sort<T, F>(client: &ComputeClient, values: &mut [T], target: Target, less: &F)
where
    T: Element,
    F: Fn(&T, &T) -> bool + Sync,
{
    let len = values.len();
    if len < 2 {
        return;
    }

    let leaf_capacity = client.policy().tile_width() as usize;
    let mut rng = StdRng::seed_from_u64(client.config().algorithm.sort_seed);
    let mut stack = vec![0..len];
    let mut leaves = Vec::new();
    let mut splits = 0;

    while let Some(range) = stack.pop() {
        if range.len() < 2 || !target.refines(&range) {
            continue;
        }
        if range.len() <= leaf_capacity {
            leaves.push(range);
            continue;
        }

        let slice = &mut values[range.clone()];
        let pivot = median_of_three(slice, &mut rng, less);
        let below = partition(client, slice, |value| less(value, &pivot));
        let equal = partition(client, &mut slice[below..], |value| !less(&pivot, value));
        splits += 1;

        let lower = range.start..range.start + below;
        let upper = range.start + below + equal..range.end;

        // The smaller side is refined first, keeping the stack logarithmic.
        if lower.len() > upper.len() {
            stack.push(lower);
            stack.push(upper);
        } else {
            stack.push(upper);
            stack.push(lower);
        }
    }

    client.log_algorithm(format_args!(
        "sort: {len} elements, {splits} splits, {} leaves of at most {leaf_capacity}",
        leaves.len()
    ));

    leaves.sort_by_key(|range| range.start);
    let segments = disjoint_segments(values, leaves);
    client.launch_segments("sort_leaves", segments, |tile, segment| {
        tile_bitonic_sort(tile, segment, less)
    });
}

fn median_of_three<T, F>(values: &[T], rng: &mut StdRng, less: &F) -> T
where
    T: Element,
    F: Fn(&T, &T) -> bool,
{
    let len = values.len();
    let a = values[rng.random_range(0..len)];
    let b = values[rng.random_range(0..len)];
    let c = values[rng.random_range(0..len)];

    if less(&a, &b) {
        if less(&b, &c) {
            b
        } else if less(&a, &c) {
            c
        } else {
            a
        }
    } else if less(&a, &c) {
        a
    } else if less(&b, &c) {
        c
    } else {
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};
    use tilecl_runtime::ExecutionPolicy;

    fn random_values(len: usize, max: u32, seed: u64) -> Vec<u32> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..len).map(|_| rng.random_range(0..max)).collect()
    }

    #[test_log::test]
    fn sorts_with_duplicates() {
        for width in [1, 4, 32] {
            let client = ComputeClient::new(ExecutionPolicy::new(width, 8));
            for (len, max) in [(0, 10), (1, 10), (33, 4), (500, 1000), (700, 3)] {
                let mut values = random_values(len, max, len as u64);
                let mut expected = values.clone();
                expected.sort();

                sort(&client, &mut values);

                assert_eq!(values, expected, "width {width}, len {len}");
            }
        }
    }

    #[test_log::test]
    fn sorts_by_a_custom_order() {
        let client = ComputeClient::new(ExecutionPolicy::new(8, 4));
        let mut values = random_values(300, 50, 9);

        sort_by(&client, &mut values, |a, b| a > b);

        assert!(values.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test_log::test]
    fn partial_sort_orders_the_prefix() {
        let client = ComputeClient::new(ExecutionPolicy::new(4, 8));
        let original = random_values(400, 100, 2);
        let mut expected = original.clone();
        expected.sort();

        for middle in [0, 1, 5, 64, 400] {
            let mut values = original.clone();
            partial_sort(&client, &mut values, middle);

            assert_eq!(&values[..middle], &expected[..middle], "middle {middle}");
            let mut rest = values[middle..].to_vec();
            rest.sort();
            assert_eq!(rest, &expected[middle..]);
        }
    }

    #[test_log::test]
    fn nth_element_places_the_rank() {
        let client = ComputeClient::new(ExecutionPolicy::new(4, 8));
        let original = random_values(257, 40, 5);
        let mut expected = original.clone();
        expected.sort();

        for nth in [0, 100, 128, 256, 300] {
            let mut values = original.clone();
            nth_element(&client, &mut values, nth);

            if nth < values.len() {
                assert_eq!(values[nth], expected[nth]);
                assert!(values[..nth].iter().all(|value| *value <= values[nth]));
                assert!(values[nth..].iter().all(|value| *value >= values[nth]));
            } else {
                assert_eq!(values, original);
            }
        }
    }

    #[test_log::test]
    fn sorted_prefix_length() {
        let client = ComputeClient::new(ExecutionPolicy::new(2, 4));

        assert_eq!(is_sorted_until(&client, &[1, 2, 2, 5, 3, 4]), 4);
        assert!(is_sorted(&client, &[1, 1, 2]));
        assert!(is_sorted(&client, &[0u8; 0]));
        assert!(!is_sorted_by(&client, &[1, 2, 3], |a, b| a > b));
    }
}
