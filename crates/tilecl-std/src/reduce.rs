use tilecl_runtime::{ComputeClient, Element, FnView, View};

use crate::primitives::tile_reduce;

/// Combines every element of `input` with `op`, in index order.
///
/// First launch: every tile reduces its range to a partial. Second launch: a single tile reduces
/// the partials. Returns `None` for an empty input.
pub(crate) fn fold_tiles<V, F>(client: &ComputeClient, name: &str, input: &V, op: &F) -> Option<V::Item>
where
    V: View + ?Sized,
    F: Fn(V::Item, V::Item) -> V::Item + Sync,
{
    let domain = client.policy().tiled_domain(input.len());
    let partials = client
        .launch(name, domain, |tile| tile_reduce(tile, input, tile.range(), op))
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();

    match partials.len() {
        0 => None,
        1 => Some(partials[0]),
        len => client
            .launch(name, client.policy().single_tile(len), |tile| {
                tile_reduce(tile, &partials, tile.range(), op)
            })
            .into_iter()
            .next()
            .flatten(),
    }
}

/// Reduces `input` with the associative operator `op`, starting from `init`.
///
/// Returns `op(init, a0 ⊕ a1 ⊕ … ⊕ an-1)`, combined in index order so `op` doesn't need to be
/// commutative. An empty input returns `init` without launching anything.
pub fn reduce<V, F>(client: &ComputeClient, input: &V, init: V::Item, op: F) -> V::Item
where
    V: View + ?Sized,
    F: Fn(V::Item, V::Item) -> V::Item + Sync,
{
    match fold_tiles(client, "reduce", input, &op) {
        Some(total) => op(init, total),
        None => init,
    }
}

/// Reduces `map(0), map(1), …, map(len - 1)` with `op`, starting from `init`.
pub fn transform_reduce<T, M, F>(client: &ComputeClient, len: usize, map: M, init: T, op: F) -> T
where
    T: Element,
    M: Fn(usize) -> T + Sync,
    F: Fn(T, T) -> T + Sync,
{
    reduce(client, &FnView::new(len, map), init, op)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilecl_runtime::ExecutionPolicy;

    #[test_log::test]
    fn sums_with_the_initial_value() {
        let client = ComputeClient::new(ExecutionPolicy::new(2, 2));
        let input = [3, 1, 4, 1, 5, 9, 2, 6];

        assert_eq!(reduce(&client, &input[..], 0, |a, b| a + b), 31);
        assert_eq!(reduce(&client, &input[..], 100, |a, b| a + b), 131);
    }

    #[test_log::test]
    fn empty_input_returns_init() {
        let client = ComputeClient::new(ExecutionPolicy::new(4, 8));

        assert_eq!(reduce(&client, &Vec::<u64>::new(), 7, |a, b| a * b), 7);
    }

    #[test_log::test]
    fn keeps_the_order_of_the_elements() {
        let client = ComputeClient::new(ExecutionPolicy::new(3, 5));
        let input = (0..200u64).map(|i| (i % 3 + 1, i % 7)).collect::<Vec<_>>();
        let compose = |f: (u64, u64), g: (u64, u64)| ((f.0 * g.0) % 10_007, (f.1 * g.0 + g.1) % 10_007);
        let expected = input.iter().copied().fold((1, 0), compose);

        assert_eq!(reduce(&client, &input, (1, 0), compose), expected);
    }

    #[test_log::test]
    fn transform_reduce_over_indices() {
        let client = ComputeClient::new(ExecutionPolicy::new(8, 4));

        let sum_of_squares = transform_reduce(&client, 1000, |i| (i * i) as u64, 0, |a, b| a + b);

        assert_eq!(sum_of_squares, (0..1000u64).map(|i| i * i).sum());
    }
}
