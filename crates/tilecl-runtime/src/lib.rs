#![warn(missing_docs)]

//! Tiled SPMD runtime: execution policies, tiles and lanes, tile-local storage and launches.
//!
//! A launch covers a [TiledDomain] with independent tiles. Tiles run concurrently on a worker
//! pool while the lanes of a tile run in lock-step, one lane step after the other, with
//! [Tile::sync_units] marking the barriers between dependent steps.

#[macro_use]
extern crate derive_new;

/// Runtime configuration module.
pub mod config;

mod atomic;
mod client;
mod element;
mod error;
mod policy;
mod properties;
mod shared;
mod tile;
mod view;

pub use atomic::*;
pub use client::*;
pub use element::*;
pub use error::*;
pub use policy::*;
pub use properties::*;
pub use shared::*;
pub use tile::*;
pub use view::*;
