//! Asset loading
//!
//! Readers for the files the viewer consumes: Wavefront geometry and its
//! companion material library, PFM float images, and the directory layout
//! of a measured SVBRDF.

pub mod materials;
pub mod obj_loader;
pub mod pfm;
pub mod svbrdf;

pub use materials::{Material, MtlParser};
pub use obj_loader::{LoadOptions, ObjLoader, ParseState};
pub use pfm::PfmImage;
pub use svbrdf::Svbrdf;

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading assets
#[derive(Error, Debug)]
pub enum LoadError {
    /// A required file or directory does not exist
    #[error("Path does not exist: {}", path.display())]
    MissingPath {
        /// The missing path
        path: PathBuf,
    },

    /// A material library names a material the mesh never uses
    #[error("Line {line}: material '{name}' is not used by the mesh")]
    UnknownMaterial {
        /// Material name
        name: String,
        /// 1-based line number in the material library
        line: usize,
    },

    /// A record could not be interpreted
    #[error("Line {line}: {reason}: '{content}'")]
    MalformedRecord {
        /// 1-based line number
        line: usize,
        /// The offending line, trimmed
        content: String,
        /// What was wrong with it
        reason: String,
    },

    /// A texture file is not a valid image
    #[error("Malformed texture {}: {reason}", path.display())]
    MalformedTexture {
        /// Texture file
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// Maps of one material have different resolutions
    #[error("Map {map} is {}x{}, expected {}x{}", found.0, found.1, expected.0, expected.1)]
    MismatchedMaps {
        /// Resolution of the first map
        expected: (usize, usize),
        /// Resolution of this map
        found: (usize, usize),
        /// File name of this map
        map: String,
    },

    /// Underlying I/O failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    pub(crate) fn malformed(line: usize, content: &str, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            line,
            content: content.to_string(),
            reason: reason.into(),
        }
    }
}
