//! Scene descriptions
//!
//! A scene names one mesh, the lights around it, and a shading material for
//! each material the mesh declares:
//!
//! ```toml
//! mesh = "models/bunny.obj"
//! mesh_size = 100.0
//!
//! [[lights]]
//! position = [90.0, 90.0, 90.0]
//! intensity = 8200.0
//!
//! [materials.leather]
//! type = "svbrdf"
//! path = "data/leather_black"
//!
//! [materials.base]
//! type = "phong"
//! diffuse = [0.8, 0.8, 0.8]
//! specular = [0.1, 0.1, 0.1]
//! shininess = 10.0
//! ```
//!
//! Relative paths are resolved against the directory of the description.
//! [`Scene::assemble`] loads everything and expands one attribute bundle per
//! mesh material; [`Scene::into_renderer`] turns those into draw calls.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::assets::{LoadError, LoadOptions, ObjLoader, Svbrdf};
use crate::config::{Config, ConfigError};
use crate::core::config::ShaderConfig;
use crate::foundation::math::Vec3;
use crate::render::api::{RenderBackend, VertexAttributes};
use crate::render::primitives::{ArcballCamera, FaceFilter, Mesh};
use crate::render::shading::{MaterialKind, PhongMaterial, ShaderTemplate, ShadingMaterial, SvbrdfMaterial};
use crate::render::{Light, RenderError, Renderer};

/// How one mesh material is shaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialDescription {
    /// Measured maps read from a directory
    Svbrdf {
        /// Material directory
        path: PathBuf,
    },
    /// Constant coefficients
    Phong {
        /// Diffuse color
        diffuse: Vec3,
        /// Specular color
        specular: Vec3,
        /// Specular exponent
        shininess: f32,
    },
}

/// Scene file contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    /// OBJ file
    pub mesh: PathBuf,
    /// Largest extent the mesh is scaled to
    pub mesh_size: f32,
    /// Move the bounding-box midpoint to the origin before resizing
    pub center: bool,
    /// Point lights
    pub lights: Vec<Light>,
    /// Shading per mesh material name
    pub materials: BTreeMap<String, MaterialDescription>,
}

impl Default for SceneDescription {
    fn default() -> Self {
        Self {
            mesh: PathBuf::new(),
            mesh_size: 100.0,
            center: true,
            lights: Vec::new(),
            materials: BTreeMap::new(),
        }
    }
}

impl Config for SceneDescription {}

/// Scene errors
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// The description could not be read
    #[error("Scene description error: {0}")]
    Config(#[from] ConfigError),

    /// An asset could not be loaded
    #[error("Asset error: {0}")]
    Load(#[from] LoadError),

    /// The renderer refused a draw call
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// The mesh uses a material the description does not shade
    #[error("Mesh material '{name}' has no description")]
    UndescribedMaterial {
        /// Material name
        name: String,
    },
}

/// One draw call worth of scene data
#[derive(Debug, Clone)]
pub struct SceneDraw {
    /// Mesh material name
    pub name: String,
    /// Shading
    pub material: ShadingMaterial,
    /// Expanded streams of the faces using this material
    pub attributes: VertexAttributes,
}

/// A loaded scene ready to be drawn
#[derive(Debug, Clone)]
pub struct Scene {
    /// The resized mesh
    pub mesh: Mesh,
    /// Point lights
    pub lights: Vec<Light>,
    /// Draw calls in mesh material order
    pub draws: Vec<SceneDraw>,
}

impl Scene {
    /// Read a description file and assemble it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let description = SceneDescription::load_from_file(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Self::assemble(&description, base_dir)
    }

    /// Load the mesh and materials of a description.
    ///
    /// The mesh is resized to `mesh_size` and split into one bundle per
    /// material in id order. A mesh without any `usemtl` is drawn whole when
    /// the description has exactly one material.
    pub fn assemble(description: &SceneDescription, base_dir: &Path) -> Result<Self, SceneError> {
        let options = LoadOptions { center: description.center };
        let mesh = ObjLoader::load_with_materials_and_options(base_dir.join(&description.mesh), options)?;
        Self::from_mesh(mesh, description, base_dir)
    }

    /// Assemble a description around a mesh that is already loaded.
    ///
    /// `description.mesh` and `description.center` are not consulted; the
    /// mesh is still resized to `mesh_size`.
    pub fn from_mesh(mut mesh: Mesh, description: &SceneDescription, base_dir: &Path) -> Result<Self, SceneError> {
        mesh.resize(description.mesh_size);

        let mut maps: HashMap<PathBuf, Svbrdf> = HashMap::new();
        let mut shading = |name: &str| -> Result<ShadingMaterial, SceneError> {
            let described = description
                .materials
                .get(name)
                .ok_or_else(|| SceneError::UndescribedMaterial { name: name.to_string() })?;
            Ok(match described {
                MaterialDescription::Svbrdf { path } => {
                    let path = base_dir.join(path);
                    let svbrdf = match maps.get(&path) {
                        Some(svbrdf) => svbrdf.clone(),
                        None => {
                            let svbrdf = Svbrdf::load(&path)?;
                            maps.insert(path, svbrdf.clone());
                            svbrdf
                        }
                    };
                    ShadingMaterial::Svbrdf(SvbrdfMaterial::new(svbrdf))
                }
                MaterialDescription::Phong { diffuse, specular, shininess } => ShadingMaterial::Phong(PhongMaterial {
                    diffuse: *diffuse,
                    specular: *specular,
                    shininess: *shininess,
                }),
            })
        };

        let mut draws = Vec::new();
        if mesh.materials().is_empty() {
            if let Some(name) = single_key(&description.materials) {
                log::info!("Mesh declares no materials; drawing it with '{}'", name);
                draws.push(SceneDraw {
                    name: name.to_string(),
                    material: shading(name)?,
                    attributes: mesh.expand(FaceFilter::All),
                });
            } else {
                log::warn!("Mesh declares no materials; nothing will be drawn");
            }
        }

        for material in mesh.materials() {
            draws.push(SceneDraw {
                name: material.name.clone(),
                material: shading(&material.name)?,
                attributes: mesh.expand(FaceFilter::Material(material.index)),
            });
        }

        log::info!("Assembled scene: {} draws, {} lights", draws.len(), description.lights.len());
        Ok(Self {
            mesh,
            lights: description.lights.clone(),
            draws,
        })
    }

    /// Build a renderer drawing this scene.
    ///
    /// Shader templates are read once per material kind from `shaders`.
    pub fn into_renderer<B: RenderBackend>(
        self,
        backend: B,
        camera: ArcballCamera,
        shaders: &ShaderConfig,
    ) -> Result<Renderer<B>, SceneError> {
        let mut renderer = Renderer::new(backend, camera, self.lights);
        let mut templates: HashMap<MaterialKind, ShaderTemplate> = HashMap::new();

        for draw in self.draws {
            let kind = draw.material.kind();
            if !templates.contains_key(&kind) {
                templates.insert(kind, ShaderTemplate::for_kind(shaders, kind)?);
            }
            if let Some(template) = templates.get(&kind) {
                renderer.add_renderable(template, draw.material, draw.attributes)?;
            }
        }
        Ok(renderer)
    }
}

fn single_key<V>(map: &BTreeMap<String, V>) -> Option<&str> {
    match map.len() {
        1 => map.keys().next().map(String::as_str),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::svbrdf::tests::write_material;
    use crate::config::ConfigFormat;
    use crate::render::backends::HeadlessBackend;
    use crate::render::primitives::Camera;
    use approx::assert_relative_eq;

    const TWO_MATERIAL_OBJ: &str = "\
v 0 0 0
v 2 0 0
v 2 2 0
v 0 2 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
usemtl leather
f 1/1 2/2 3/3
usemtl base
f 1/1 3/3 4/4
f 1/1 2/2 4/4
";

    const SCENE: &str = r#"
mesh = "quad.obj"
mesh_size = 50.0

[[lights]]
position = [90.0, 90.0, 90.0]
intensity = 8200.0

[[lights]]
position = [-90.0, 0.0, 90.0]
intensity = 100.0
color = [1.0, 0.0, 0.0]

[materials.leather]
type = "svbrdf"
path = "leather"

[materials.base]
type = "phong"
diffuse = [0.8, 0.8, 0.8]
specular = [0.1, 0.1, 0.1]
shininess = 10.0
"#;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("svbrdf_scene_{}_{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_scene(dir: &Path) {
        std::fs::write(dir.join("quad.obj"), TWO_MATERIAL_OBJ).unwrap();
        std::fs::write(dir.join("scene.toml"), SCENE).unwrap();
        write_material(&dir.join("leather"), (2, 2), 5.0);
    }

    fn camera() -> ArcballCamera {
        ArcballCamera::new(Camera::new(
            45.0,
            (640.0, 480.0),
            1.0,
            1000.0,
            Vec3::new(0.0, 0.0, 200.0),
            Vec3::zeros(),
            Vec3::new(0.0, 1.0, 0.0),
        ))
    }

    #[test]
    fn test_description_parses() {
        let description = SceneDescription::from_str_as(SCENE, ConfigFormat::Toml).unwrap();
        assert_eq!(description.mesh, PathBuf::from("quad.obj"));
        assert_eq!(description.lights.len(), 2);
        assert_eq!(description.lights[0].color, Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(description.lights[1].color, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(
            description.materials["leather"],
            MaterialDescription::Svbrdf { path: PathBuf::from("leather") }
        );
        assert!(matches!(description.materials["base"], MaterialDescription::Phong { shininess, .. } if shininess == 10.0));
    }

    #[test]
    fn test_assembly_yields_one_draw_per_material() {
        let dir = scratch("assemble");
        write_scene(&dir);

        let scene = Scene::load(dir.join("scene.toml")).unwrap();
        assert_relative_eq!(scene.mesh.bounding_size(), 50.0, epsilon = 1e-4);
        assert_eq!(scene.draws.len(), 2);
        assert_eq!(scene.draws[0].name, "leather");
        assert_eq!(scene.draws[0].attributes.vertex_count(), 3);
        assert_eq!(scene.draws[1].name, "base");
        assert_eq!(scene.draws[1].attributes.vertex_count(), 6);
        assert!(scene.draws[0].material.is_textured());
        assert!(!scene.draws[1].material.is_textured());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_undescribed_material() {
        let dir = scratch("undescribed");
        write_scene(&dir);

        let mut description = SceneDescription::load_from_file(dir.join("scene.toml")).unwrap();
        description.materials.remove("base");
        let err = Scene::assemble(&description, &dir).unwrap_err();
        assert!(matches!(err, SceneError::UndescribedMaterial { ref name } if name == "base"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_untagged_mesh_with_single_material() {
        let dir = scratch("untagged");
        std::fs::write(dir.join("tri.obj"), "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        let mut description = SceneDescription {
            mesh: PathBuf::from("tri.obj"),
            ..SceneDescription::default()
        };
        description.materials.insert(
            "plain".to_string(),
            MaterialDescription::Phong { diffuse: Vec3::zeros(), specular: Vec3::zeros(), shininess: 1.0 },
        );

        let scene = Scene::assemble(&description, &dir).unwrap();
        assert_eq!(scene.draws.len(), 1);
        assert_eq!(scene.draws[0].attributes.vertex_count(), 3);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_uncentered_scene_scales_about_origin() {
        let dir = scratch("uncentered");
        std::fs::write(dir.join("tri.obj"), "v 1 1 0\nv 3 1 0\nv 1 3 0\nf 1 2 3\n").unwrap();
        let mut description = SceneDescription {
            mesh: PathBuf::from("tri.obj"),
            mesh_size: 4.0,
            center: false,
            ..SceneDescription::default()
        };
        description.materials.insert(
            "plain".to_string(),
            MaterialDescription::Phong { diffuse: Vec3::zeros(), specular: Vec3::zeros(), shininess: 1.0 },
        );

        let scene = Scene::assemble(&description, &dir).unwrap();
        let (min, max) = scene.mesh.bounding_box();
        assert_relative_eq!(min, Vec3::new(2.0, 2.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(max, Vec3::new(6.0, 6.0, 0.0), epsilon = 1e-5);

        description.center = true;
        let scene = Scene::assemble(&description, &dir).unwrap();
        let (min, max) = scene.mesh.bounding_box();
        assert_relative_eq!(min + max, Vec3::zeros(), epsilon = 1e-5);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_scene_from_loaded_mesh() {
        let dir = scratch("from_mesh");
        write_scene(&dir);

        let mesh = ObjLoader::load_obj(dir.join("quad.obj")).unwrap();
        let description = SceneDescription::load_from_file(dir.join("scene.toml")).unwrap();
        let scene = Scene::from_mesh(mesh, &description, &dir).unwrap();
        assert_relative_eq!(scene.mesh.bounding_size(), 50.0, epsilon = 1e-4);
        assert_eq!(scene.draws.len(), 2);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_scene_into_renderer() {
        let dir = scratch("render");
        write_scene(&dir);
        let shader_dir = dir.join("shaders");
        std::fs::create_dir_all(&shader_dir).unwrap();
        std::fs::write(shader_dir.join("default.vert.glsl"), "void main() {}").unwrap();
        std::fs::write(shader_dir.join("svbrdf.frag.glsl"), "uniform vec3 light_position[${num_lights}];").unwrap();
        std::fs::write(shader_dir.join("phong.frag.glsl"), "uniform vec3 light_color[$num_lights];").unwrap();

        let scene = Scene::load(dir.join("scene.toml")).unwrap();
        let shaders = ShaderConfig::default().with_shader_dir(&shader_dir);
        let mut renderer = scene.into_renderer(HeadlessBackend::new(), camera(), &shaders).unwrap();

        assert_eq!(renderer.renderables().len(), 2);
        assert_eq!(renderer.draw().unwrap(), 2);
        let phong = renderer.renderables()[1].program();
        assert_eq!(
            renderer.backend().program_source(phong).unwrap().fragment,
            "uniform vec3 light_color[2];"
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
