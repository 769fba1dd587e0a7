use core::ops::Sub;

use tilecl_runtime::{ComputeClient, Element};

/// Writes `func(i)` at every index `i` of `output`.
pub fn tabulate<T, F>(client: &ComputeClient, output: &mut [T], func: F)
where
    T: Element,
    F: Fn(usize) -> T + Sync,
{
    let domain = client.policy().tiled_domain(output.len());

    client.launch_mut("tabulate", domain, output, |tile, chunk| {
        let offset = tile.offset();
        let len = chunk.len();
        tile.for_each_lane(|lane| {
            for index in tile.lane_block(lane.pos(), len) {
                chunk[index] = func(offset + index);
            }
        });
    });
}

/// Writes `func(input[i])` at every index `i` of `output`.
pub fn transform<A, B, F>(client: &ComputeClient, input: &[A], output: &mut [B], func: F)
where
    A: Element,
    B: Element,
    F: Fn(A) -> B + Sync,
{
    debug_assert!(output.len() >= input.len(), "The output is too small");
    tabulate(client, &mut output[..input.len()], |index| func(input[index]));
}

/// Copies `input` into the start of `output`.
pub fn copy<T: Element>(client: &ComputeClient, input: &[T], output: &mut [T]) {
    transform(client, input, output, |value| value);
}

/// Assigns `value` to every element of `output`.
pub fn fill<T: Element>(client: &ComputeClient, output: &mut [T], value: T) {
    tabulate(client, output, |_| value);
}

/// Writes `input[0]` then `input[i] - input[i - 1]` for every following index.
pub fn adjacent_difference<T>(client: &ComputeClient, input: &[T], output: &mut [T])
where
    T: Element + Sub<Output = T>,
{
    adjacent_difference_by(client, input, output, |current, previous| current - previous);
}

/// Writes `input[0]` then `op(input[i], input[i - 1])` for every following index.
pub fn adjacent_difference_by<T, F>(client: &ComputeClient, input: &[T], output: &mut [T], op: F)
where
    T: Element,
    F: Fn(T, T) -> T + Sync,
{
    debug_assert!(output.len() >= input.len(), "The output is too small");
    tabulate(client, &mut output[..input.len()], |index| match index {
        0 => input[0],
        index => op(input[index], input[index - 1]),
    });
}
