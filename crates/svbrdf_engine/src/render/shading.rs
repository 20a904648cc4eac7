//! Shading materials and the shader programs that draw them
//!
//! A fragment shader is written against a light-count placeholder,
//! `${num_lights}`, that sizes its light arrays. [`ShaderTemplate::specialize`]
//! substitutes the real count before the program is compiled, so every
//! renderable gets a program sized for the scene's lights.

use std::path::Path;

use crate::assets::Svbrdf;
use crate::core::config::ShaderConfig;
use crate::foundation::math::Vec3;

use super::api::{BackendResult, ProgramSource, RenderBackend, TextureHandle, UniformValue};
use super::renderer::RenderError;

/// Placeholder forms replaced by the light count
const NUM_LIGHTS_PLACEHOLDERS: [&str; 2] = ["${num_lights}", "$num_lights"];

/// Unspecialized vertex and fragment sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderTemplate {
    /// Vertex stage source
    pub vertex: String,
    /// Fragment stage source, possibly containing light-count placeholders
    pub fragment: String,
}

impl ShaderTemplate {
    /// Template from in-memory sources
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Read a template from two files
    pub fn from_files(vertex: &Path, fragment: &Path) -> Result<Self, RenderError> {
        Ok(Self::new(read_source(vertex)?, read_source(fragment)?))
    }

    /// Read the template a material kind is drawn with
    pub fn for_kind(config: &ShaderConfig, kind: MaterialKind) -> Result<Self, RenderError> {
        let fragment = match kind {
            MaterialKind::Svbrdf => &config.svbrdf_fragment_shader,
            MaterialKind::Phong => &config.phong_fragment_shader,
        };
        Self::from_files(&config.path_of(&config.vertex_shader), &config.path_of(fragment))
    }

    /// Substitute the light count into the fragment stage
    pub fn specialize(&self, num_lights: usize) -> ProgramSource {
        let count = num_lights.to_string();
        let fragment = NUM_LIGHTS_PLACEHOLDERS
            .iter()
            .fold(self.fragment.clone(), |source, placeholder| source.replace(placeholder, &count));
        ProgramSource {
            vertex: self.vertex.clone(),
            fragment,
        }
    }
}

fn read_source(path: &Path) -> Result<String, RenderError> {
    std::fs::read_to_string(path).map_err(|source| RenderError::ShaderSource {
        path: path.to_path_buf(),
        source,
    })
}

/// The kinds of shading material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    /// Measured SVBRDF maps
    Svbrdf,
    /// Constant Blinn-Phong coefficients
    Phong,
}

/// Constant Phong coefficients
#[derive(Debug, Clone, PartialEq)]
pub struct PhongMaterial {
    /// Diffuse color
    pub diffuse: Vec3,
    /// Specular color
    pub specular: Vec3,
    /// Specular exponent
    pub shininess: f32,
}

/// Uploaded textures of one SVBRDF
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SvbrdfTextures {
    /// `diff_map`
    pub diffuse: TextureHandle,
    /// `spec_map`
    pub specular: TextureHandle,
    /// `spec_shape_map`
    pub spec_shape: TextureHandle,
    /// `normal_map`
    pub normal: TextureHandle,
}

/// Measured material with its maps
#[derive(Debug, Clone, PartialEq)]
pub struct SvbrdfMaterial {
    /// Source maps
    pub svbrdf: Svbrdf,
    /// Specular lobe exponent, initially the measured value
    pub alpha: f32,
    textures: Option<SvbrdfTextures>,
}

impl SvbrdfMaterial {
    /// Wrap loaded maps; `alpha` starts at the measured value
    pub fn new(svbrdf: Svbrdf) -> Self {
        let alpha = svbrdf.alpha;
        Self {
            svbrdf,
            alpha,
            textures: None,
        }
    }

    /// Texture handles, once uploaded
    pub fn textures(&self) -> Option<SvbrdfTextures> {
        self.textures
    }
}

/// How one renderable is shaded
#[derive(Debug, Clone, PartialEq)]
pub enum ShadingMaterial {
    /// Measured SVBRDF
    Svbrdf(SvbrdfMaterial),
    /// Constant Phong
    Phong(PhongMaterial),
}

impl ShadingMaterial {
    /// Material kind
    pub fn kind(&self) -> MaterialKind {
        match self {
            Self::Svbrdf(_) => MaterialKind::Svbrdf,
            Self::Phong(_) => MaterialKind::Phong,
        }
    }

    /// Whether drawing needs UV and tangent-frame streams
    pub fn is_textured(&self) -> bool {
        matches!(self, Self::Svbrdf(_))
    }

    /// Upload the material's maps, once
    pub fn upload_textures<B: RenderBackend>(&mut self, backend: &mut B) -> BackendResult<()> {
        if let Self::Svbrdf(material) = self {
            if material.textures.is_none() {
                let maps = &material.svbrdf;
                material.textures = Some(SvbrdfTextures {
                    diffuse: backend.create_texture(&maps.diffuse_map)?,
                    specular: backend.create_texture(&maps.specular_map)?,
                    spec_shape: backend.create_texture(&maps.spec_shape_map)?,
                    normal: backend.create_texture(&maps.normal_map)?,
                });
            }
        }
        Ok(())
    }

    /// Named uniform values of this material
    ///
    /// Texture samplers are included only after [`ShadingMaterial::upload_textures`].
    pub fn uniforms(&self) -> Vec<(&'static str, UniformValue)> {
        match self {
            Self::Svbrdf(material) => {
                let mut values = vec![("alpha", UniformValue::Float(material.alpha))];
                if let Some(textures) = material.textures {
                    values.extend([
                        ("diff_map", UniformValue::Texture(textures.diffuse)),
                        ("spec_map", UniformValue::Texture(textures.specular)),
                        ("spec_shape_map", UniformValue::Texture(textures.spec_shape)),
                        ("normal_map", UniformValue::Texture(textures.normal)),
                    ]);
                }
                values
            }
            Self::Phong(material) => vec![
                ("u_diff", UniformValue::Vec3(material.diffuse)),
                ("u_spec", UniformValue::Vec3(material.specular)),
                ("u_shininess", UniformValue::Float(material.shininess)),
            ],
        }
    }

    /// Override the SVBRDF lobe exponent; `false` for other kinds
    pub fn set_alpha(&mut self, alpha: f32) -> bool {
        match self {
            Self::Svbrdf(material) => {
                material.alpha = alpha;
                true
            }
            Self::Phong(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phong() -> ShadingMaterial {
        ShadingMaterial::Phong(PhongMaterial {
            diffuse: Vec3::new(0.8, 0.8, 0.8),
            specular: Vec3::new(0.1, 0.1, 0.1),
            shininess: 10.0,
        })
    }

    #[test]
    fn test_specialize_both_placeholder_forms() {
        let template = ShaderTemplate::new(
            "void main() {}",
            "uniform vec3 light_position[${num_lights}];\nuniform float light_intensity[$num_lights];",
        );
        let program = template.specialize(3);
        assert_eq!(
            program.fragment,
            "uniform vec3 light_position[3];\nuniform float light_intensity[3];"
        );
        assert_eq!(program.vertex, "void main() {}");
    }

    #[test]
    fn test_phong_uniforms() {
        let material = phong();
        assert!(!material.is_textured());
        let names: Vec<_> = material.uniforms().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["u_diff", "u_spec", "u_shininess"]);
    }

    #[test]
    fn test_alpha_only_for_svbrdf() {
        let mut material = phong();
        assert!(!material.set_alpha(2.0));
        assert_eq!(material.kind(), MaterialKind::Phong);
    }

    #[test]
    fn test_missing_shader_file() {
        let result = ShaderTemplate::from_files(Path::new("/nowhere/a.vert"), Path::new("/nowhere/a.frag"));
        assert!(matches!(result, Err(RenderError::ShaderSource { .. })));
    }
}
