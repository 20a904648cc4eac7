//! Measured SVBRDF map directories
//!
//! A material directory holds four PFM maps and a parameter file:
//!
//! | file                 | contents                         |
//! |----------------------|----------------------------------|
//! | `map_diff.pfm`       | diffuse albedo                   |
//! | `map_spec.pfm`       | specular albedo                  |
//! | `map_normal.pfm`     | tangent-space normals            |
//! | `map_spec_shape.pfm` | specular lobe shape              |
//! | `map_params.dat`     | `alpha` as the first number      |
//!
//! Reconstruction tools write these under `out/reverse/`; that
//! subdirectory is used when present.

use std::path::{Path, PathBuf};

use super::{LoadError, PfmImage};

/// Diffuse albedo map file name
pub const DIFFUSE_MAP: &str = "map_diff.pfm";
/// Specular albedo map file name
pub const SPECULAR_MAP: &str = "map_spec.pfm";
/// Normal map file name
pub const NORMAL_MAP: &str = "map_normal.pfm";
/// Specular shape map file name
pub const SPECULAR_SHAPE_MAP: &str = "map_spec_shape.pfm";
/// Parameter file name
pub const PARAMS_FILE: &str = "map_params.dat";

/// Subdirectory reconstruction output is written to
const RECONSTRUCTION_SUBDIR: &str = "out/reverse";

/// A measured spatially varying material
#[derive(Debug, Clone, PartialEq)]
pub struct Svbrdf {
    /// Directory the maps were read from
    pub source: PathBuf,
    /// Specular lobe exponent
    pub alpha: f32,
    /// Diffuse albedo
    pub diffuse_map: PfmImage,
    /// Specular albedo
    pub specular_map: PfmImage,
    /// Tangent-space normals
    pub normal_map: PfmImage,
    /// Specular lobe shape
    pub spec_shape_map: PfmImage,
}

impl Svbrdf {
    /// Load a material directory
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self, LoadError> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Err(LoadError::MissingPath { path: dir.to_path_buf() });
        }

        let reconstruction = dir.join(RECONSTRUCTION_SUBDIR);
        let source = if reconstruction.is_dir() { reconstruction } else { dir.to_path_buf() };
        log::info!("Loading SVBRDF from {}", source.display());

        let alpha = read_alpha(&source.join(PARAMS_FILE))?;
        let diffuse_map = PfmImage::load(source.join(DIFFUSE_MAP))?;
        let expected = diffuse_map.dimensions();

        let load_matching = |name: &str| -> Result<PfmImage, LoadError> {
            let image = PfmImage::load(source.join(name))?;
            if image.dimensions() != expected {
                return Err(LoadError::MismatchedMaps {
                    expected,
                    found: image.dimensions(),
                    map: name.to_string(),
                });
            }
            Ok(image)
        };
        let specular_map = load_matching(SPECULAR_MAP)?;
        let normal_map = load_matching(NORMAL_MAP)?;
        let spec_shape_map = load_matching(SPECULAR_SHAPE_MAP)?;

        log::info!("Loaded SVBRDF {}x{}, alpha = {}", expected.0, expected.1, alpha);
        Ok(Self {
            source,
            alpha,
            diffuse_map,
            specular_map,
            normal_map,
            spec_shape_map,
        })
    }

    /// Map resolution `(width, height)`
    pub fn dimensions(&self) -> (usize, usize) {
        self.diffuse_map.dimensions()
    }
}

fn read_alpha(path: &Path) -> Result<f32, LoadError> {
    if !path.exists() {
        return Err(LoadError::MissingPath { path: path.to_path_buf() });
    }
    let contents = std::fs::read_to_string(path)?;
    let first_line = contents.lines().next().unwrap_or("");
    first_line
        .split_whitespace()
        .next()
        .and_then(|token| token.parse().ok())
        .ok_or_else(|| LoadError::malformed(1, first_line, "expected alpha as the first number"))
}
