use tilecl_runtime::ComputeClient;

use super::{lengths, random_values};
use crate::{merge, nth_element, partition, radix_sort, radix_sort_by_key, sort};

pub fn test_sort(client: &ComputeClient) {
    for len in lengths(client) {
        for max in [3, 1 << 20] {
            let mut values = random_values(len, max, len as u64 + max as u64);
            let mut expected = values.clone();
            expected.sort();

            sort(client, &mut values);
            assert_eq!(values, expected, "len {len}, max {max}");

            sort(client, &mut values);
            assert_eq!(values, expected, "sorting twice, len {len}");
        }
    }
}

/// Merging the sorted halves of an input gives the sorted input.
pub fn test_merge_sorted_halves(client: &ComputeClient) {
    for len in lengths(client) {
        let values = random_values(len, 100, 11);
        let (mut lhs, mut rhs) = (values[..len / 2].to_vec(), values[len / 2..].to_vec());
        sort(client, &mut lhs);
        sort(client, &mut rhs);

        let mut output = vec![0; len];
        merge(client, &lhs, &rhs, &mut output);

        let mut expected = values;
        sort(client, &mut expected);
        assert_eq!(output, expected, "len {len}");
    }
}

pub fn test_partition(client: &ComputeClient) {
    for len in lengths(client) {
        let original = random_values(len, 1000, 5);
        let mut values = original.clone();

        let split = partition(client, &mut values, |value| value % 3 == 0);

        assert_eq!(split, original.iter().filter(|value| *value % 3 == 0).count());
        assert!(values[..split].iter().all(|value| value % 3 == 0), "len {len}");
        assert!(values[split..].iter().all(|value| value % 3 != 0), "len {len}");

        let mut sorted = values;
        let mut expected = original;
        sorted.sort();
        expected.sort();
        assert_eq!(sorted, expected, "partition keeps every element, len {len}");
    }
}

pub fn test_nth_element(client: &ComputeClient) {
    for len in lengths(client) {
        let original = random_values(len, 64, 13);
        let mut expected = original.clone();
        expected.sort();

        for nth in [0, len / 2, len.saturating_sub(1)] {
            if nth >= len {
                continue;
            }
            let mut values = original.clone();
            nth_element(client, &mut values, nth);

            assert_eq!(values[nth], expected[nth], "len {len}, nth {nth}");
            assert!(values[..nth].iter().all(|value| *value <= values[nth]));
            assert!(values[nth + 1..].iter().all(|value| *value >= values[nth]));
        }
    }
}

pub fn test_radix_sort(client: &ComputeClient) {
    for len in lengths(client) {
        let mut keys = random_values(len, u32::MAX, 17);
        let mut expected = keys.clone();
        expected.sort();
        radix_sort::<u32, 4>(client, &mut keys);
        assert_eq!(keys, expected, "len {len}");

        let mut keys = random_values(len, 16, 19)
            .into_iter()
            .map(|value| value as i16 - 8)
            .collect::<Vec<_>>();
        let mut values = (0..len as u32).collect::<Vec<_>>();
        let mut expected = keys.iter().copied().zip(values.iter().copied()).collect::<Vec<_>>();
        expected.sort_by_key(|(key, _)| *key);

        radix_sort_by_key::<i16, u32, 3>(client, &mut keys, &mut values);

        let actual = keys.into_iter().zip(values).collect::<Vec<_>>();
        assert_eq!(actual, expected, "stable by key, len {len}");
    }
}

#[macro_export]
macro_rules! testgen_sort {
    ($width:expr) => {
        mod sort {
            use $crate::tests::{client, sort};

            #[test_log::test]
            fn sort_matches_sequential() {
                sort::test_sort(&client($width));
            }

            #[test_log::test]
            fn merge_sorted_halves() {
                sort::test_merge_sorted_halves(&client($width));
            }

            #[test_log::test]
            fn partition() {
                sort::test_partition(&client($width));
            }

            #[test_log::test]
            fn nth_element() {
                sort::test_nth_element(&client($width));
            }

            #[test_log::test]
            fn radix_sort() {
                sort::test_radix_sort(&client($width));
            }
        }
    };
}
