mod key;

pub use key::*;

use tilecl_runtime::{ComputeClient, Element, GlobalMut};

use crate::{copy, exclusive_scan_in_place, primitives::tile_digit_counts, tabulate};

/// Sorts `keys` in ascending order with a least significant digit radix sort.
///
/// `DIGIT_BITS` is the number of key bits sorted per pass, between 1 and 16.
pub fn radix_sort<K: RadixKey, const DIGIT_BITS: u32>(client: &ComputeClient, keys: &mut [K]) {
    let mut values = vec![(); keys.len()];
    radix_sort_by_key::<K, (), DIGIT_BITS>(client, keys, &mut values);
}

/// Sorts `keys` in ascending order, applying the same permutation to `values`.
///
/// The sort is stable: values of equal keys keep their relative order. Every pass counts the
/// digits of every tile, scans the counts in digit-major order to find where every tile
/// writes each digit, then scatters. Passes where a single digit holds every key are skipped.
pub fn radix_sort_by_key<K, V, const DIGIT_BITS: u32>(
    client: &ComputeClient,
    keys: &mut [K],
    values: &mut [V],
) where
    K: RadixKey,
    V: Element,
{
    const {
        assert!(
            DIGIT_BITS >= 1 && DIGIT_BITS <= 16,
            "The digit width must be between 1 and 16 bits"
        )
    };

    let len = keys.len();
    debug_assert_eq!(values.len(), len, "Every key needs a value");
    if len < 2 {
        return;
    }

    let radix = 1usize << DIGIT_BITS;
    let mask = (radix - 1) as u64;
    let capacity = client.policy().shared_memory_elems();
    let domain = client.policy().tiled_domain(len);
    let tiles = domain.tile_count as usize;

    let mut src_keys = keys.to_vec();
    let mut src_values = values.to_vec();
    let mut dst_keys = src_keys.clone();
    let mut dst_values = src_values.clone();
    let mut skipped = 0;

    for shift in (0..K::BITS).step_by(DIGIT_BITS as usize) {
        let digit = |key: K| ((key.to_radix() >> shift) & mask) as usize;

        let histograms = client.launch("radix_histogram", domain, |tile| {
            tile_digit_counts(tile, &src_keys[tile.range()], radix, capacity, &digit).totals(tile)
        });

        let populated = (0..radix)
            .filter(|digit| histograms.iter().any(|counts| counts[*digit] > 0))
            .count();
        if populated == 1 {
            skipped += 1;
            continue;
        }

        // Digit-major: every tile writes digit d after the tiles before it and after every
        // smaller digit.
        let mut offsets = vec![0usize; radix * tiles];
        tabulate(client, &mut offsets, |slot| histograms[slot % tiles][slot / tiles]);
        exclusive_scan_in_place(client, &mut offsets, 0, |a, b| a + b);

        let out_keys = GlobalMut::new(&mut dst_keys);
        let out_values = GlobalMut::new(&mut dst_values);
        let (in_keys, in_values) = (&src_keys, &src_values);

        client.launch("radix_scatter", domain, |tile| {
            let pos = tile.pos() as usize;
            let range = tile.range();
            let keys = &in_keys[range.clone()];
            let values = &in_values[range];

            let mut counts = tile_digit_counts(tile, keys, radix, capacity, &digit);
            counts.exclusive_lane_prefix(tile);

            tile.for_each_lane(|lane| {
                let lane = lane.pos() as usize;
                if lane >= counts.lanes() {
                    return;
                }
                for index in counts.block(lane) {
                    let key = keys[index];
                    let bucket = digit(key);
                    let position = offsets[bucket * tiles + pos] + counts.next_rank(lane, bucket);
                    // SAFETY: the positions of a pass are a permutation of the indices, every
                    // position is written once.
                    unsafe {
                        out_keys.write(position, key);
                        out_values.write(position, values[index]);
                    }
                }
            });
            tile.sync_units();
        });

        core::mem::swap(&mut src_keys, &mut dst_keys);
        core::mem::swap(&mut src_values, &mut dst_values);
    }

    client.log_algorithm(format_args!(
        "radix_sort: {len} keys, {} passes of {DIGIT_BITS} bits, {skipped} skipped",
        K::BITS.div_ceil(DIGIT_BITS)
    ));

    copy(client, &src_keys, keys);
    copy(client, &src_values, values);
}
