//! MTL (Material Template Library) file parser
//!
//! Reads the reflectance keywords of a Wavefront material library and
//! applies them to the materials a mesh already declared through `usemtl`.
//! Only `newmtl`, `Ns`, `Ks`, `Kd`, `Ka` and `Ke` are understood; other
//! keywords are skipped.

use std::path::Path;

use crate::assets::obj_loader::records;
use crate::assets::LoadError;
use crate::foundation::math::Vec3;
use crate::render::primitives::Mesh;

use super::Material;

/// Properties one `newmtl` stanza sets; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialOverrides {
    /// Material name
    pub name: String,
    /// Line of the `newmtl` record
    pub line: usize,
    /// Ns
    pub specular_exponent: Option<f32>,
    /// Ks
    pub specular_color: Option<Vec3>,
    /// Kd
    pub diffuse_color: Option<Vec3>,
    /// Ka
    pub ambient_color: Option<Vec3>,
    /// Ke
    pub emissive_color: Option<Vec3>,
}

impl MaterialOverrides {
    /// Copy every property this stanza set onto `material`
    pub fn apply_to(&self, material: &mut Material) {
        if let Some(exponent) = self.specular_exponent {
            material.specular_exponent = exponent;
        }
        if let Some(color) = self.specular_color {
            material.specular_color = color;
        }
        if let Some(color) = self.diffuse_color {
            material.diffuse_color = color;
        }
        if let Some(color) = self.ambient_color {
            material.ambient_color = color;
        }
        if let Some(color) = self.emissive_color {
            material.emissive_color = color;
        }
    }
}

/// MTL file parser
pub struct MtlParser;

impl MtlParser {
    /// Parse MTL text into one override set per `newmtl` stanza, in file order
    pub fn parse(contents: &str) -> Result<Vec<MaterialOverrides>, LoadError> {
        let mut stanzas: Vec<MaterialOverrides> = Vec::new();

        for (line_num, line) in records(contents) {
            let mut tokens = line.split_whitespace();
            let Some(command) = tokens.next() else {
                continue;
            };

            if command == "newmtl" {
                let name = tokens
                    .next()
                    .ok_or_else(|| LoadError::malformed(line_num, line, "newmtl missing material name"))?;
                stanzas.push(MaterialOverrides {
                    name: name.to_string(),
                    line: line_num,
                    ..MaterialOverrides::default()
                });
                continue;
            }

            if !matches!(command, "Ns" | "Ks" | "Kd" | "Ka" | "Ke") {
                continue;
            }

            let current = stanzas
                .last_mut()
                .ok_or_else(|| LoadError::malformed(line_num, line, format!("{} before any newmtl", command)))?;

            match command {
                "Ns" => current.specular_exponent = Some(Self::parse_f32(&mut tokens, line_num, line)?),
                "Ks" => current.specular_color = Some(Self::parse_vec3(&mut tokens, line_num, line)?),
                "Kd" => current.diffuse_color = Some(Self::parse_vec3(&mut tokens, line_num, line)?),
                "Ka" => current.ambient_color = Some(Self::parse_vec3(&mut tokens, line_num, line)?),
                _ => current.emissive_color = Some(Self::parse_vec3(&mut tokens, line_num, line)?),
            }
        }

        Ok(stanzas)
    }

    /// Apply MTL text to a mesh's materials.
    ///
    /// Every stanza is checked against the mesh before any material is
    /// touched, so on error the mesh is unchanged. Returns the number of
    /// stanzas applied.
    pub fn apply(contents: &str, mesh: &mut Mesh) -> Result<usize, LoadError> {
        let stanzas = Self::parse(contents)?;

        if let Some(unknown) = stanzas.iter().find(|s| mesh.material(&s.name).is_none()) {
            return Err(LoadError::UnknownMaterial {
                name: unknown.name.clone(),
                line: unknown.line,
            });
        }

        for stanza in &stanzas {
            if let Some(material) = mesh.material_mut(&stanza.name) {
                stanza.apply_to(material);
            }
        }

        log::debug!("Applied {} material definitions", stanzas.len());
        Ok(stanzas.len())
    }

    /// Read an MTL file and apply it to a mesh
    pub fn load_into<P: AsRef<Path>>(path: P, mesh: &mut Mesh) -> Result<usize, LoadError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LoadError::MissingPath { path: path.to_path_buf() });
        }
        log::info!("Loading material library {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::apply(&contents, mesh)
    }

    /// Parse an RGB triple; extra components are ignored
    fn parse_vec3<'a, I>(tokens: &mut I, line_num: usize, line: &str) -> Result<Vec3, LoadError>
    where
        I: Iterator<Item = &'a str>,
    {
        let r = Self::parse_f32(tokens, line_num, line)?;
        let g = Self::parse_f32(tokens, line_num, line)?;
        let b = Self::parse_f32(tokens, line_num, line)?;
        Ok(Vec3::new(r, g, b))
    }

    fn parse_f32<'a, I>(tokens: &mut I, line_num: usize, line: &str) -> Result<f32, LoadError>
    where
        I: Iterator<Item = &'a str>,
    {
        let token = tokens
            .next()
            .ok_or_else(|| LoadError::malformed(line_num, line, "missing value"))?;
        token
            .parse::<f32>()
            .map_err(|_| LoadError::malformed(line_num, line, format!("invalid float value '{}'", token)))
    }
}
