mod backend;

pub use backend::*;

use tilecl_runtime::{ComputeClient, Element};

use crate::{
    Pair, copy,
    primitives::{tile_inclusive_scan, tile_reduce},
    tabulate,
};

/// Inclusive scan of `values` in place: `values[i] = v0 ⊕ … ⊕ vi`.
pub fn inclusive_scan_in_place<T, F>(client: &ComputeClient, values: &mut [T], op: F)
where
    T: Element,
    F: Fn(T, T) -> T + Sync,
{
    scan_in_place(client, values, None, &op);
}

/// Inclusive scan of `input` into the start of `output`: `output[i] = a0 ⊕ … ⊕ ai`.
pub fn inclusive_scan<T, F>(client: &ComputeClient, input: &[T], output: &mut [T], op: F)
where
    T: Element,
    F: Fn(T, T) -> T + Sync,
{
    let output = &mut output[..input.len()];
    copy(client, input, output);
    scan_in_place(client, output, None, &op);
}

/// Exclusive scan of `input` into the start of `output`: `output[0] = init` and
/// `output[i] = init ⊕ a0 ⊕ … ⊕ ai-1`.
pub fn exclusive_scan<T, F>(client: &ComputeClient, input: &[T], output: &mut [T], init: T, op: F)
where
    T: Element,
    F: Fn(T, T) -> T + Sync,
{
    let len = input.len();
    if len == 0 {
        return;
    }

    output[0] = init;
    if len > 1 {
        let shifted = &mut output[1..len];
        copy(client, &input[..len - 1], shifted);
        scan_in_place(client, shifted, Some(init), &op);
    }
}

/// Exclusive scan of `values` in place, starting from `init`.
///
/// Runs a seeded inclusive scan, then shifts the result right by one position with `init` at
/// the front.
pub fn exclusive_scan_in_place<T, F>(client: &ComputeClient, values: &mut [T], init: T, op: F)
where
    T: Element,
    F: Fn(T, T) -> T + Sync,
{
    let len = values.len();
    if len == 0 {
        return;
    }
    if len == 1 {
        values[0] = init;
        return;
    }

    scan_in_place(client, values, Some(init), &op);

    let inclusive = values.to_vec();
    tabulate(client, values, |index| match index {
        0 => init,
        index => inclusive[index - 1],
    });
}

/// Inclusive scan restarting at every element whose head flag is set.
///
/// `output[i]` combines the elements from the last head at or before `i` up to `i`. The first
/// element always starts a segment.
pub fn segmented_inclusive_scan<T, F>(
    client: &ComputeClient,
    input: &[T],
    heads: &[bool],
    output: &mut [T],
    op: F,
) where
    T: Element,
    F: Fn(T, T) -> T + Sync,
{
    let len = input.len();
    debug_assert_eq!(heads.len(), len, "Every element needs a head flag");
    if len == 0 {
        return;
    }

    let mut lifted = vec![Pair::new(false, input[0]); len];
    tabulate(client, &mut lifted, |index| Pair::new(heads[index], input[index]));

    // Associative lift of `op` over (head, value) pairs.
    let segmented = |lhs: Pair<bool, T>, rhs: Pair<bool, T>| match rhs.first {
        true => rhs,
        false => Pair::new(lhs.first, op(lhs.second, rhs.second)),
    };
    scan_in_place(client, &mut lifted, None, &segmented);

    tabulate(client, &mut output[..len], |index| lifted[index].second);
}

/// Three-phase inclusive scan seeded with `seed`.
///
/// 1. Every tile reduces its range.
/// 2. A single tile scans the tile totals into the carry of every tile.
/// 3. Every tile rescans its range from its carry.
pub(crate) fn scan_in_place<T, F>(client: &ComputeClient, values: &mut [T], seed: Option<T>, op: &F)
where
    T: Element,
    F: Fn(T, T) -> T + Sync,
{
    let len = values.len();
    if len == 0 {
        return;
    }
    if len == 1 {
        if let Some(seed) = seed {
            values[0] = op(seed, values[0]);
        }
        return;
    }

    let domain = client.policy().tiled_domain(len);
    log::trace!("Scan of {len} elements over {} tiles", domain.tile_count);

    let input: &[T] = values;
    let mut carries = client
        .launch("scan_reduce", domain, |tile| tile_reduce(tile, input, tile.range(), op))
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();

    let partials = client.policy().single_tile(carries.len());
    client.launch_mut("scan_carries", partials, &mut carries, |tile, totals| {
        tile_inclusive_scan(tile, totals, seed, op)
    });

    client.launch_mut("scan_downsweep", domain, values, |tile, chunk| {
        let carry = match tile.pos() as usize {
            0 => seed,
            pos => Some(carries[pos - 1]),
        };
        tile_inclusive_scan(tile, chunk, carry, op)
    });
}
