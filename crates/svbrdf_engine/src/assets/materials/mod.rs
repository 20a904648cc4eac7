//! Wavefront material data
//!
//! [`Material`] holds the reflectance values of one material group and
//! [`MtlParser`] reads them from a material library.

pub mod material;
pub mod mtl_parser;

pub use material::Material;
pub use mtl_parser::{MaterialOverrides, MtlParser};
