#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Immutable catalogue of tile descriptors.
//!
//! The registry is parsed once from a line-oriented text resource and then
//! handed by reference to every component that needs to know how a tile
//! behaves. Records look like `<id> <key>=<value>...`; values are bare tokens,
//! double-quoted strings or `(a|b|c)` lists.

mod error;
mod parser;
mod registry;
mod spec;
pub mod well_known;

pub use error::RegistryError;
pub use registry::{straighten, TileRegistry, HORIZONTAL, VERTICAL};
pub use spec::{Building, Category, TileSpec};
