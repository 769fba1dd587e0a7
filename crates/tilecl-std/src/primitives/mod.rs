mod bitonic;
mod corank;
mod histogram;
mod partition;
mod reduce;
mod scan;

pub use bitonic::*;
pub use corank::*;
pub use histogram::*;
pub use partition::*;
pub use reduce::*;
pub use scan::*;
