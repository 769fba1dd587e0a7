use tilecl_runtime::{ComputeClient, Element, Shared, Tile};

use crate::{
    copy,
    primitives::{co_rank, tile_bitonic_merge},
};

/// Merges the sorted `lhs` and `rhs` into `output`.
pub fn merge<T>(client: &ComputeClient, lhs: &[T], rhs: &[T], output: &mut [T])
where
    T: Element + PartialOrd,
{
    merge_by(client, lhs, rhs, output, |a, b| a < b);
}

/// Merges `lhs` and `rhs`, both sorted by `less`, into `output`.
///
/// The merge is stable: elements of `lhs` come before equal elements of `rhs`. Every tile
/// co-ranks the start of its output range, then merges its range in chunks that fit the
/// tile-local storage with a bitonic network.
pub fn merge_by<T, F>(client: &ComputeClient, lhs: &[T], rhs: &[T], output: &mut [T], less: F)
where
    T: Element,
    F: Fn(&T, &T) -> bool + Sync,
{
    let (n1, n2) = (lhs.len(), rhs.len());
    let len = n1 + n2;
    debug_assert!(output.len() >= len, "The output is too small");
    let output = &mut output[..len];

    if n1 == 0 || n2 == 0 {
        copy(client, if n1 == 0 { rhs } else { lhs }, output);
        return;
    }

    let domain = client.policy().tiled_domain(len);
    let mut boundaries = client.launch("merge_partition", domain, |tile| {
        co_rank(tile.offset(), lhs, rhs, &less)
    });
    boundaries.push((n1, n2));

    let chunk = chunk_capacity(client.policy().shared_memory_elems());
    client.log_algorithm(format_args!(
        "merge: {n1} + {n2} elements, {} tiles, chunks of {chunk}",
        domain.tile_count
    ));

    client.launch_mut("merge", domain, output, |tile, out| {
        let pos = tile.pos() as usize;
        let (lhs_start, rhs_start) = boundaries[pos];
        let (lhs_end, rhs_end) = boundaries[pos + 1];

        merge_tile(
            tile,
            &lhs[lhs_start..lhs_end],
            &rhs[rhs_start..rhs_end],
            out,
            chunk,
            &less,
        );
    });
}

// Largest power of two fitting the tile-local storage, the size of a bitonic merge.
fn chunk_capacity(shared_memory_elems: usize) -> usize {
    1 << (usize::BITS - 1 - shared_memory_elems.max(2).leading_zeros())
}

fn merge_tile<T, F>(tile: &Tile, lhs: &[T], rhs: &[T], output: &mut [T], chunk: usize, less: &F)
where
    T: Element,
    F: Fn(&T, &T) -> bool,
{
    let (mut i, mut j) = (0, 0);
    let mut written = 0;

    while written < output.len() {
        let len = chunk.min(output.len() - written);
        // One lane splits the chunk, the others read the split from tile-local storage.
        let split = Shared::new(tile, || co_rank(len, &lhs[i..], &rhs[j..], less));
        let (di, dj) = split.get();

        tile_bitonic_merge(
            tile,
            &lhs[i..i + di],
            &rhs[j..j + dj],
            &mut output[written..written + len],
            less,
        );

        i += di;
        j += dj;
        written += len;
    }
}
