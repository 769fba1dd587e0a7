/// Algorithm config module.
pub mod algorithm;
/// Launch config module.
pub mod launch;
/// Execution policy config module.
pub mod policy;

mod base;
mod logger;

pub use base::*;
pub use logger::*;
pub use policy::PolicyConfig;
