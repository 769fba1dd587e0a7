/// Trivially copyable product of two values.
///
/// Used by algorithms carrying more than one value per element, like an index with its value.
#[derive(new, Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pair<A, B> {
    /// The first value.
    pub first: A,
    /// The second value.
    pub second: B,
}

impl<A, B> From<(A, B)> for Pair<A, B> {
    fn from((first, second): (A, B)) -> Self {
        Self { first, second }
    }
}

impl<A, B> From<Pair<A, B>> for (A, B) {
    fn from(pair: Pair<A, B>) -> Self {
        (pair.first, pair.second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn pairs_order_lexicographically() {
        let mut pairs = vec![Pair::new(2, 'a'), Pair::new(1, 'z'), Pair::new(2, 'A')];
        pairs.sort();

        assert_eq!(
            pairs.into_iter().map(<(i32, char)>::from).collect::<Vec<_>>(),
            vec![(1, 'z'), (2, 'A'), (2, 'a')]
        );
        assert_eq!(Pair::from((3u8, 4u16)), Pair::new(3, 4));
    }
}
