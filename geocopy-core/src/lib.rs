#![doc = include_str!("../../README.md")]
//! Crate-specific API surface for `geocopy-core`.

pub mod convert;
pub mod copy;
pub mod error;
pub mod ewkb;
pub mod fallback;
pub mod wkt;

pub use convert::{geometry_field, geometry_to_ewkb};
pub use copy::CopyField;
pub use error::{GeoCopyError, Result};
