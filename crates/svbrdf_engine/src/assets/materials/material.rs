//! Reflectance reference data attached to a mesh by material name

use crate::foundation::math::Vec3;

/// Wavefront-style reflectance parameters for one material group
///
/// Values come from the companion MTL file when one is supplied; otherwise
/// the defaults below are used (exponent 2, white diffuse, everything else
/// black).
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Material name, unique within a mesh
    pub name: String,
    /// Sequential id, assigned in order of first `usemtl`
    pub index: usize,
    /// Specular exponent (Ns)
    pub specular_exponent: f32,
    /// Specular color (Ks)
    pub specular_color: Vec3,
    /// Diffuse color (Kd)
    pub diffuse_color: Vec3,
    /// Ambient color (Ka)
    pub ambient_color: Vec3,
    /// Emissive color (Ke)
    pub emissive_color: Vec3,
}

impl Material {
    /// Default specular exponent
    pub const DEFAULT_SPECULAR_EXPONENT: f32 = 2.0;

    /// Create a material with default reflectance
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
            specular_exponent: Self::DEFAULT_SPECULAR_EXPONENT,
            specular_color: Vec3::zeros(),
            diffuse_color: Vec3::new(1.0, 1.0, 1.0),
            ambient_color: Vec3::zeros(),
            emissive_color: Vec3::zeros(),
        }
    }

    /// Render this material as one `newmtl` stanza
    ///
    /// Stanzas from several materials can be concatenated into a complete
    /// MTL file.
    pub fn to_mtl(&self) -> String {
        format!(
            "newmtl {}\nNs {}\n{}{}{}{}illum 2\n\n",
            self.name,
            self.specular_exponent,
            color_line("Ks", &self.specular_color),
            color_line("Ka", &self.ambient_color),
            color_line("Kd", &self.diffuse_color),
            color_line("Ke", &self.emissive_color),
        )
    }
}

fn color_line(keyword: &str, color: &Vec3) -> String {
    format!("{} {} {} {}\n", keyword, color.x, color.y, color.z)
}
