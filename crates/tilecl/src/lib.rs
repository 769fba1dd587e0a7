//! Standard algorithms on a tiled SPMD execution engine.
//!
//! ```
//! use tilecl::prelude::*;
//!
//! let client = ComputeClient::new(ExecutionPolicy::new(4, 8));
//! let mut values = vec![5, 3, 9, 1];
//! sort(&client, &mut values);
//!
//! assert_eq!(values, vec![1, 3, 5, 9]);
//! assert_eq!(reduce(&client, &values, 0, |a, b| a + b), 18);
//! ```

pub use tilecl_runtime::*;

/// The algorithms.
pub use tilecl_std as algorithms;

/// Everything needed to launch the algorithms.
pub mod prelude {
    pub use tilecl_runtime::{ComputeClient, ExecutionPolicy, FnView, View};
    pub use tilecl_std::*;
}
