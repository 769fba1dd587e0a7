/// Splits the first `k` elements of the stable merge of `lhs` and `rhs`.
///
/// Returns `(i, j)` with `i + j = k` such that the first `k` merged elements are exactly
/// `lhs[..i]` and `rhs[..j]`. Elements of `lhs` come first among equal elements. Found by a
/// binary search on `i` in `O(log min(k, n1))` comparisons.
pub fn co_rank<T, F>(k: usize, lhs: &[T], rhs: &[T], less: &F) -> (usize, usize)
where
    F: Fn(&T, &T) -> bool,
{
    let (n1, n2) = (lhs.len(), rhs.len());
    debug_assert!(k <= n1 + n2, "Co-rank out of bounds: {k} > {n1} + {n2}");

    let mut low = k.saturating_sub(n2);
    let mut high = k.min(n1);

    while low < high {
        let i = low + (high - low) / 2;
        let j = k - i;

        // lhs[i] is not greater than rhs[j - 1], so it belongs to the first k elements.
        if j > 0 && !less(&rhs[j - 1], &lhs[i]) {
            low = i + 1;
        } else {
            high = i;
        }
    }

    (low, k - low)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn splits_match_a_stable_merge() {
        let lhs = [(1, 'a'), (2, 'a'), (2, 'b'), (5, 'a'), (7, 'a')];
        let rhs = [(0, 'x'), (2, 'x'), (2, 'y'), (3, 'x'), (7, 'x'), (9, 'x')];
        let less = |a: &(i32, char), b: &(i32, char)| a.0 < b.0;

        let mut merged = [&lhs[..], &rhs[..]]
            .concat()
            .into_iter()
            .enumerate()
            .collect::<Vec<_>>();
        merged.sort_by_key(|(_, value)| value.0);

        for k in 0..=lhs.len() + rhs.len() {
            let (i, j) = co_rank(k, &lhs, &rhs, &less);
            let from_lhs = merged[..k]
                .iter()
                .filter(|(index, _)| *index < lhs.len())
                .count();

            assert_eq!((i, j), (from_lhs, k - from_lhs), "k {k}");
        }
    }

    #[test_log::test]
    fn empty_sides() {
        let values = [1, 2, 3];
        let less = |a: &i32, b: &i32| a < b;

        assert_eq!(co_rank(2, &values, &[], &less), (2, 0));
        assert_eq!(co_rank(2, &[], &values, &less), (0, 2));
        assert_eq!(co_rank(0, &values, &values, &less), (0, 0));
        assert_eq!(co_rank(6, &values, &values, &less), (3, 3));
    }
}
