use pretty_assertions::assert_eq;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tilecl::prelude::*;

fn client(width: u32, max_tiles: u32) -> ComputeClient {
    ComputeClient::new(ExecutionPolicy::new(width, max_tiles))
}

#[test_log::test]
fn reduce_sums_a_small_input() {
    for width in [1, 2, 4, 8, 256] {
        let client = client(width, 4);

        assert_eq!(reduce(&client, &[3, 1, 4, 1, 5, 9, 2, 6][..], 0, |a, b| a + b), 31);
    }
}

#[test_log::test]
fn exclusive_scan_of_a_small_input() {
    for width in [1, 2, 4, 8, 256] {
        let client = client(width, 4);
        let mut output = [0; 8];

        exclusive_scan(&client, &[3, 1, 4, 1, 5, 9, 2, 6], &mut output, 0, |a, b| a + b);

        assert_eq!(output, [0, 3, 4, 8, 9, 14, 23, 25]);
    }
}

#[test_log::test]
fn radix_sort_with_two_bit_digits() {
    let client = client(4, 2);
    let mut keys = [3u32, 2, 1, 6, 10, 11, 13, 0, 15, 10, 5, 14, 4, 12, 9, 8];

    radix_sort::<u32, 2>(&client, &mut keys);

    assert_eq!(keys, [0, 1, 2, 3, 4, 5, 6, 8, 9, 10, 10, 11, 12, 13, 14, 15]);
}

#[test_log::test]
fn merge_is_independent_of_the_tile_width() {
    for width in 1..=8 {
        let client = client(width, 3);
        let mut output = [0; 8];

        merge(&client, &[0, 2, 4, 6], &[1, 3, 5, 7], &mut output);

        assert_eq!(output, [0, 1, 2, 3, 4, 5, 6, 7], "width {width}");
    }
}

#[test_log::test]
fn algorithms_compose() {
    let mut rng = StdRng::seed_from_u64(42);
    let client = client(8, 16);
    let values = (0..2000).map(|_| rng.random_range(0..500u32)).collect::<Vec<_>>();

    // Sort, deduplicate, then look values up by binary search.
    let mut sorted = values.clone();
    sort(&client, &mut sorted);
    let distinct = unique(&client, &mut sorted);
    let sorted = &sorted[..distinct];

    assert!(is_sorted_by(&client, sorted, |a, b| a < b));
    assert_eq!(adjacent_find(&client, sorted), None);
    for value in values.iter().take(50) {
        assert_eq!(sorted[lower_bound(sorted, value)], *value);
    }

    // Counting with a reduction agrees with counting by compaction.
    let mut evens = vec![0; values.len()];
    let kept = copy_if(&client, &values, &mut evens, |value| value % 2 == 0);
    assert_eq!(kept, count_if(&client, &values, |value| value % 2 == 0));
}

#[test_log::test]
fn scan_backend_reports_mismatched_lengths() {
    let client = client(4, 4);
    let backend = TiledScan::new(&client);
    let mut output = [0u32; 3];

    let result = backend.inclusive_scan(&[1, 2, 3, 4], &mut output, |a, b| a + b);

    assert_eq!(
        result,
        Err(ScanError::LengthMismatch {
            input: 4,
            output: 3
        })
    );
}
