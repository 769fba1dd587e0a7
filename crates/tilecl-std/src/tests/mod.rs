#![allow(missing_docs)]

//! Test suites comparing every algorithm with its sequential counterpart, exported so the
//! same suites run against clients of every tile width.
//!
//! Use [testgen_all](crate::testgen_all) with the tile widths to check:
//!
//! ```ignore
//! tilecl_std::testgen_all!([1, 4, 32]);
//! ```

pub mod sort;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tilecl_runtime::{ComputeClient, ExecutionPolicy};

/// Largest input of the suites, spanning every tile of the test clients.
pub const LARGE: usize = 4099;

/// A client with a small tile count ceiling and small tile-local storage, so modest inputs
/// already exercise multi-tile launches and chunked merges.
pub fn client(tile_width: u32) -> ComputeClient {
    ComputeClient::new(ExecutionPolicy::new(tile_width, 8).with_shared_memory_elems(64))
}

/// Element counts around the tile width of `client`: empty, single, one tile give or take one
/// element, several tiles and a large multi-tile input.
pub fn lengths(client: &ComputeClient) -> Vec<usize> {
    let width = client.policy().tile_width() as usize;
    let mut lengths = vec![
        0,
        1,
        width.saturating_sub(1),
        width,
        width + 1,
        5 * width,
        LARGE,
    ];
    lengths.sort();
    lengths.dedup();
    lengths
}

/// `len` values drawn uniformly from `[0, max)`.
pub fn random_values(len: usize, max: u32, seed: u64) -> Vec<u32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.random_range(0..max)).collect()
}

#[macro_export]
macro_rules! testgen_all {
    ([$($width:literal),*]) => {
        ::paste::paste! {
            $(mod [<tile_width_ $width>] {
                $crate::testgen_reduce!($width);
                $crate::testgen_scan!($width);
                $crate::testgen_merge!($width);
                $crate::testgen_sort!($width);
                $crate::testgen_search!($width);
                $crate::testgen_compact!($width);
            })*
        }
    };
}
