//! tilecl standard algorithms.
//!
//! Every algorithm reproduces the observable result of its sequential counterpart while running
//! as a sequence of tile launches on a [ComputeClient](tilecl_runtime::ComputeClient):
//! two-level reduce and scan, co-ranked merge, partition merged by boundary rotations, hybrid
//! sort with bitonic leaves, LSD radix sort, searches and scan-based compaction.

#[macro_use]
extern crate derive_new;

/// Intra-tile building blocks used by the algorithms.
pub mod primitives;

mod compact;
mod merge;
mod pair;
mod partition;
mod radix;
mod reduce;
mod scan;
mod search;
mod sort;
mod transform;

pub use compact::*;
pub use merge::*;
pub use pair::*;
pub use partition::*;
pub use radix::*;
pub use reduce::*;
pub use scan::*;
pub use search::*;
pub use sort::*;
pub use transform::*;

#[cfg(feature = "export_tests")]
pub mod tests;
