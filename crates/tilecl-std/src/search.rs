use tilecl_runtime::{AtomicCell, ComputeClient, Element, FnView, SharedMemory};

use crate::{Pair, partition_point, reduce::fold_tiles, transform_reduce};

/// The smallest index in `[0, len)` satisfying `pred`.
///
/// Every tile looks for its first match, lanes scanning their blocks in parallel, and publishes
/// it with an atomic minimum. Tiles starting after the best match found so far exit without
/// evaluating `pred`.
pub fn find_first<P>(client: &ComputeClient, len: usize, pred: P) -> Option<usize>
where
    P: Fn(usize) -> bool + Sync,
{
    if len == 0 {
        return None;
    }

    let best = AtomicCell::new(usize::MAX);
    let domain = client.policy().tiled_domain(len);

    client.launch("find_first", domain, |tile| {
        if tile.offset() >= best.load() {
            return;
        }

        let offset = tile.offset();
        let active = tile.active_lanes(tile.len());
        let mut firsts = SharedMemory::filled(tile, active, usize::MAX);

        tile.for_each_lane(|lane| {
            let pos = lane.pos() as usize;
            if pos < active {
                firsts[pos] = tile
                    .lane_block(lane.pos(), tile.len())
                    .map(|index| offset + index)
                    .find(|index| pred(*index))
                    .unwrap_or(usize::MAX);
            }
        });
        tile.sync_units();

        if let Some(first) = firsts.reduce(tile, active, usize::min) {
            if first != usize::MAX {
                best.fetch_min(first);
            }
        }
    });

    match best.load() {
        usize::MAX => None,
        first => Some(first),
    }
}

/// Index of the first element of `values` satisfying `pred`.
pub fn find_if<T, P>(client: &ComputeClient, values: &[T], pred: P) -> Option<usize>
where
    T: Element,
    P: Fn(&T) -> bool + Sync,
{
    find_first(client, values.len(), |index| pred(&values[index]))
}

/// Index of the first element of `values` failing `pred`.
pub fn find_if_not<T, P>(client: &ComputeClient, values: &[T], pred: P) -> Option<usize>
where
    T: Element,
    P: Fn(&T) -> bool + Sync,
{
    find_first(client, values.len(), |index| !pred(&values[index]))
}

/// Index of the first element of `values` equal to `value`.
pub fn find<T>(client: &ComputeClient, values: &[T], value: &T) -> Option<usize>
where
    T: Element + PartialEq,
{
    find_if(client, values, |candidate| candidate == value)
}

/// Whether at least one element satisfies `pred`. False for an empty input.
pub fn any_of<T, P>(client: &ComputeClient, values: &[T], pred: P) -> bool
where
    T: Element,
    P: Fn(&T) -> bool + Sync,
{
    find_if(client, values, pred).is_some()
}

/// Whether every element satisfies `pred`. True for an empty input.
pub fn all_of<T, P>(client: &ComputeClient, values: &[T], pred: P) -> bool
where
    T: Element,
    P: Fn(&T) -> bool + Sync,
{
    find_if_not(client, values, pred).is_none()
}

/// Whether no element satisfies `pred`. True for an empty input.
pub fn none_of<T, P>(client: &ComputeClient, values: &[T], pred: P) -> bool
where
    T: Element,
    P: Fn(&T) -> bool + Sync,
{
    !any_of(client, values, pred)
}

/// Number of elements satisfying `pred`.
pub fn count_if<T, P>(client: &ComputeClient, values: &[T], pred: P) -> usize
where
    T: Element,
    P: Fn(&T) -> bool + Sync,
{
    transform_reduce(
        client,
        values.len(),
        |index| pred(&values[index]) as usize,
        0,
        |a, b| a + b,
    )
}

/// Number of elements equal to `value`.
pub fn count<T>(client: &ComputeClient, values: &[T], value: &T) -> usize
where
    T: Element + PartialEq,
{
    count_if(client, values, |candidate| candidate == value)
}

/// Index of the first element equal to its successor.
pub fn adjacent_find<T>(client: &ComputeClient, values: &[T]) -> Option<usize>
where
    T: Element + PartialEq,
{
    adjacent_find_by(client, values, |a, b| a == b)
}

/// Index of the first element `i` for which `pred(values[i], values[i + 1])` holds.
pub fn adjacent_find_by<T, P>(client: &ComputeClient, values: &[T], pred: P) -> Option<usize>
where
    T: Element,
    P: Fn(&T, &T) -> bool + Sync,
{
    if values.len() < 2 {
        return None;
    }
    find_first(client, values.len() - 1, |index| {
        pred(&values[index], &values[index + 1])
    })
}

/// First index of the common prefix of `lhs` and `rhs` where the elements differ.
pub fn mismatch<T>(client: &ComputeClient, lhs: &[T], rhs: &[T]) -> Option<usize>
where
    T: Element + PartialEq,
{
    mismatch_by(client, lhs, rhs, |a, b| a == b)
}

/// First index of the common prefix of `lhs` and `rhs` where `eq` fails.
///
/// Returns `None` when the shorter range is a prefix of the longer one.
pub fn mismatch_by<T, U, E>(client: &ComputeClient, lhs: &[T], rhs: &[U], eq: E) -> Option<usize>
where
    T: Element,
    U: Element,
    E: Fn(&T, &U) -> bool + Sync,
{
    let len = lhs.len().min(rhs.len());
    find_first(client, len, |index| !eq(&lhs[index], &rhs[index]))
}

/// Whether `lhs` and `rhs` have the same length and equal elements.
pub fn equal<T>(client: &ComputeClient, lhs: &[T], rhs: &[T]) -> bool
where
    T: Element + PartialEq,
{
    equal_by(client, lhs, rhs, |a, b| a == b)
}

/// Whether `lhs` and `rhs` have the same length and `eq` holds at every index.
pub fn equal_by<T, U, E>(client: &ComputeClient, lhs: &[T], rhs: &[U], eq: E) -> bool
where
    T: Element,
    U: Element,
    E: Fn(&T, &U) -> bool + Sync,
{
    lhs.len() == rhs.len() && mismatch_by(client, lhs, rhs, eq).is_none()
}

/// Index of the first smallest element.
pub fn min_element<T: Element + PartialOrd>(client: &ComputeClient, values: &[T]) -> Option<usize> {
    min_element_by(client, values, |a, b| a < b)
}

/// Index of the first smallest element according to `less`.
pub fn min_element_by<T, F>(client: &ComputeClient, values: &[T], less: F) -> Option<usize>
where
    T: Element,
    F: Fn(&T, &T) -> bool + Sync,
{
    let indexed = FnView::new(values.len(), |index| Pair::new(index, values[index]));
    let first_min = |lhs: Pair<usize, T>, rhs: Pair<usize, T>| match less(&rhs.second, &lhs.second) {
        true => rhs,
        false => lhs,
    };

    fold_tiles(client, "min_element", &indexed, &first_min).map(|min| min.first)
}

/// Index of the first largest element.
pub fn max_element<T: Element + PartialOrd>(client: &ComputeClient, values: &[T]) -> Option<usize> {
    max_element_by(client, values, |a, b| a < b)
}

/// Index of the first largest element according to `less`.
pub fn max_element_by<T, F>(client: &ComputeClient, values: &[T], less: F) -> Option<usize>
where
    T: Element,
    F: Fn(&T, &T) -> bool + Sync,
{
    let indexed = FnView::new(values.len(), |index| Pair::new(index, values[index]));
    let first_max = |lhs: Pair<usize, T>, rhs: Pair<usize, T>| match less(&lhs.second, &rhs.second) {
        true => rhs,
        false => lhs,
    };

    fold_tiles(client, "max_element", &indexed, &first_max).map(|max| max.first)
}

/// Indices of the first smallest and the last largest elements.
pub fn minmax_element<T>(client: &ComputeClient, values: &[T]) -> Option<(usize, usize)>
where
    T: Element + PartialOrd,
{
    minmax_element_by(client, values, |a, b| a < b)
}

/// Indices of the first smallest and the last largest elements according to `less`, in one
/// reduction.
pub fn minmax_element_by<T, F>(client: &ComputeClient, values: &[T], less: F) -> Option<(usize, usize)>
where
    T: Element,
    F: Fn(&T, &T) -> bool + Sync,
{
    type Extremes<T> = Pair<Pair<usize, T>, Pair<usize, T>>;

    let indexed = FnView::new(values.len(), |index| {
        let item = Pair::new(index, values[index]);
        Pair::new(item, item)
    });
    let extremes = |lhs: Extremes<T>, rhs: Extremes<T>| {
        let min = match less(&rhs.first.second, &lhs.first.second) {
            true => rhs.first,
            false => lhs.first,
        };
        let max = match less(&rhs.second.second, &lhs.second.second) {
            true => lhs.second,
            false => rhs.second,
        };
        Pair::new(min, max)
    };

    fold_tiles(client, "minmax_element", &indexed, &extremes)
        .map(|extremes| (extremes.first.first, extremes.second.first))
}

/// Index of the first element of the sorted `values` not less than `value`.
pub fn lower_bound<T: PartialOrd>(values: &[T], value: &T) -> usize {
    lower_bound_by(values, value, |a, b| a < b)
}

/// Index of the first element of `values`, sorted by `less`, not less than `value`.
pub fn lower_bound_by<T, F>(values: &[T], value: &T, less: F) -> usize
where
    F: Fn(&T, &T) -> bool,
{
    partition_point(values, |candidate| less(candidate, value))
}

/// Index of the first element of the sorted `values` greater than `value`.
pub fn upper_bound<T: PartialOrd>(values: &[T], value: &T) -> usize {
    upper_bound_by(values, value, |a, b| a < b)
}

/// Index of the first element of `values`, sorted by `less`, greater than `value`.
pub fn upper_bound_by<T, F>(values: &[T], value: &T, less: F) -> usize
where
    F: Fn(&T, &T) -> bool,
{
    partition_point(values, |candidate| !less(value, candidate))
}

/// Start of the first run of `count` consecutive elements equal to `value`.
pub fn search_n<T>(client: &ComputeClient, values: &[T], count: usize, value: &T) -> Option<usize>
where
    T: Element + PartialEq,
{
    search_n_by(client, values, count, |candidate| candidate == value)
}

/// Start of the first run of `count` consecutive elements satisfying `pred`.
///
/// A run of zero elements starts at index 0. Runs crossing tile boundaries are found by
/// combining, for every range, the length of its matching prefix and suffix.
pub fn search_n_by<T, P>(client: &ComputeClient, values: &[T], count: usize, pred: P) -> Option<usize>
where
    T: Element,
    P: Fn(&T) -> bool + Sync,
{
    if count == 0 {
        return Some(0);
    }
    if count > values.len() {
        return None;
    }

    let runs = FnView::new(values.len(), |index| {
        RunSummary::single(index, pred(&values[index]), count)
    });
    fold_tiles(client, "search_n", &runs, &|lhs: RunSummary, rhs: RunSummary| {
        lhs.then(rhs, count)
    })
    .and_then(|summary| summary.found)
}

/// Matching runs of a contiguous range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RunSummary {
    start: usize,
    len: usize,
    /// Length of the matching run starting at `start`.
    prefix: usize,
    /// Length of the matching run ending at `start + len`.
    suffix: usize,
    /// Start of the first run long enough.
    found: Option<usize>,
}

impl RunSummary {
    fn single(index: usize, matches: bool, count: usize) -> Self {
        let run = matches as usize;
        Self {
            start: index,
            len: 1,
            prefix: run,
            suffix: run,
            found: (run >= count).then_some(index),
        }
    }

    /// Summary of `self` followed by the adjacent `next`.
    fn then(self, next: Self, count: usize) -> Self {
        let end = self.start + self.len;
        let bridging = (self.suffix + next.prefix >= count).then_some(end - self.suffix);

        Self {
            start: self.start,
            len: self.len + next.len,
            prefix: match self.prefix == self.len {
                true => self.len + next.prefix,
                false => self.prefix,
            },
            suffix: match next.suffix == next.len {
                true => next.len + self.suffix,
                false => next.suffix,
            },
            found: self.found.or(bridging).or(next.found),
        }
    }
}
