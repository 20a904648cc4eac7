//! # Viewer Configuration
//!
//! All settings the viewer reads at startup, grouped by subsystem:
//!
//! - **Window**: initial surface size, which also sizes the camera viewport
//! - **Camera**: projection parameters, initial pose, arcball and zoom speeds
//! - **Mesh**: post-load centering and the uniform size the mesh is scaled to
//! - **Shaders**: where shader sources are looked up
//!
//! Every section has defaults, so an empty file is a valid configuration.

use serde::{Serialize, Deserialize};
use std::path::{Path, PathBuf};

use crate::config::{Config, ConfigError};
use crate::foundation::math::Vec3;
use crate::render::primitives::{ArcballCamera, Camera};

/// # Shader Configuration
///
/// Shader sources live in a directory that is resolved relative to a few
/// common locations, so the viewer works from the workspace root as well as
/// from inside the binary crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    /// Directory holding the GLSL sources
    pub shader_dir: PathBuf,
    /// Vertex shader shared by every material kind
    pub vertex_shader: String,
    /// Fragment shader for measured SVBRDF materials
    pub svbrdf_fragment_shader: String,
    /// Fragment shader for plain Phong materials
    pub phong_fragment_shader: String,
}

impl ShaderConfig {
    /// Create shader config with automatic directory resolution
    ///
    /// Tries the common shader locations in order and keeps the first one
    /// that exists, falling back to `shaders/`.
    pub fn with_path_resolution() -> Self {
        let shader_dirs = [
            "shaders",
            "resources/shaders",
            "../shaders",
            "svbrdf_viewer/shaders",
        ];

        let shader_dir = shader_dirs
            .iter()
            .map(PathBuf::from)
            .find(|dir| dir.is_dir())
            .unwrap_or_else(|| PathBuf::from("shaders"));

        Self {
            shader_dir,
            ..Self::named_defaults(PathBuf::new())
        }
    }

    fn named_defaults(shader_dir: PathBuf) -> Self {
        Self {
            shader_dir,
            vertex_shader: "default.vert.glsl".to_string(),
            svbrdf_fragment_shader: "svbrdf.frag.glsl".to_string(),
            phong_fragment_shader: "phong.frag.glsl".to_string(),
        }
    }

    /// Use an explicit shader directory
    pub fn with_shader_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shader_dir = dir.into();
        self
    }

    /// Full path of a shader file inside the shader directory
    pub fn path_of(&self, file_name: &str) -> PathBuf {
        self.shader_dir.join(file_name)
    }

    /// Validate that shader files exist
    pub fn validate(&self) -> Result<(), ConfigError> {
        for name in [&self.vertex_shader, &self.svbrdf_fragment_shader, &self.phong_fragment_shader] {
            let path = self.path_of(name);
            if !path.exists() {
                return Err(ConfigError::Invalid(format!("Shader not found: {}", path.display())));
            }
        }
        Ok(())
    }
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self::with_path_resolution()
    }
}

/// Host window settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Surface width in pixels
    pub width: u32,
    /// Surface height in pixels
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Camera settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Initial camera position
    pub position: [f32; 3],
    /// Orbit center
    pub lookat: [f32; 3],
    /// Up hint; re-orthogonalized on every view matrix query
    pub up: [f32; 3],
    /// Multiplier applied to the arcball angle of a drag
    pub rotate_speed: f32,
    /// Distance moved per mouse wheel notch
    pub zoom_step: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 45.0,
            near: 1.0,
            far: 1000.0,
            position: [0.0, 0.0, 200.0],
            lookat: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            rotate_speed: ArcballCamera::DEFAULT_ROTATE_SPEED,
            zoom_step: ArcballCamera::DEFAULT_ZOOM_STEP,
        }
    }
}

impl CameraConfig {
    /// Build the arcball camera described by this section for a viewport
    pub fn build(&self, width: u32, height: u32) -> ArcballCamera {
        let camera = Camera::new(
            self.fov,
            (width as f32, height as f32),
            self.near,
            self.far,
            Vec3::from(self.position),
            Vec3::from(self.lookat),
            Vec3::from(self.up),
        );
        ArcballCamera::new(camera)
            .with_rotate_speed(self.rotate_speed)
            .with_zoom_step(self.zoom_step)
    }
}

/// Mesh post-processing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Translate the bounding-box midpoint to the origin after loading
    pub center: bool,
    /// Largest bounding-box extent after resizing
    pub target_size: f32,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            center: true,
            target_size: 100.0,
        }
    }
}

/// # Complete Viewer Configuration
///
/// Top-level configuration the binary loads (or defaults) at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Log level name (`error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: String,
    /// Host window settings
    pub window: WindowConfig,
    /// Camera settings
    pub camera: CameraConfig,
    /// Mesh settings
    pub mesh: MeshConfig,
    /// Shader lookup
    pub shaders: ShaderConfig,
}

impl ViewerConfig {
    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the initial surface size
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window.width = width;
        self.window.height = height;
        self
    }

    /// Set the mesh target size
    pub fn with_mesh_size(mut self, size: f32) -> Self {
        self.mesh.target_size = size;
        self
    }

    /// Parsed log level, `Info` when the name is unknown or empty
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }

    /// Load a config file, or fall back to defaults when no path is given
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let config = Self::load_from_file(path)?;
                config.validate()?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Validate the entire configuration
    ///
    /// Shader files are not checked here; they are only needed once a
    /// renderer is created.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid("Window size must be non-zero".to_string()));
        }

        let camera = &self.camera;
        if camera.near <= 0.0 || camera.far <= camera.near {
            return Err(ConfigError::Invalid(format!(
                "Clipping planes must satisfy 0 < near < far (near = {}, far = {})",
                camera.near, camera.far
            )));
        }
        if camera.fov <= 0.0 || camera.fov >= 180.0 {
            return Err(ConfigError::Invalid(format!("Field of view out of range: {}", camera.fov)));
        }

        let forward = Vec3::from(camera.lookat) - Vec3::from(camera.position);
        if forward.cross(&Vec3::from(camera.up)).norm() <= f32::EPSILON {
            return Err(ConfigError::Invalid("Camera up vector is collinear with the view direction".to_string()));
        }

        if self.mesh.target_size <= 0.0 {
            return Err(ConfigError::Invalid(format!("Mesh size must be positive: {}", self.mesh.target_size)));
        }

        Ok(())
    }
}

impl Config for ViewerConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFormat;

    #[test]
    fn test_defaults_are_valid() {
        let config = ViewerConfig::default().with_log_level("debug");
        assert!(config.validate().is_ok());
        assert_eq!(config.level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let text = r#"
log_level = "warn"

[window]
width = 1024

[camera]
fov = 60.0
"#;
        let config = ViewerConfig::from_str_as(text, ConfigFormat::Toml).unwrap();
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.camera.fov, 60.0);
        assert_eq!(config.mesh.target_size, 100.0);
        assert_eq!(config.level_filter(), log::LevelFilter::Warn);
    }

    #[test]
    fn test_ron_config() {
        let text = "(window: (width: 320, height: 240), mesh: (target_size: 2.0))";
        let config = ViewerConfig::from_str_as(text, ConfigFormat::Ron).unwrap();
        assert_eq!(config.window.width, 320);
        assert_eq!(config.mesh.target_size, 2.0);
        assert!(config.mesh.center);
    }

    #[test]
    fn test_collinear_up_rejected() {
        let mut config = ViewerConfig::default();
        config.camera.up = [0.0, 0.0, 1.0];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_bad_clipping_planes_rejected() {
        let mut config = ViewerConfig::default();
        config.camera.near = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mesh_centering_can_be_disabled() {
        let text = "[mesh]\ncenter = false\n";
        let config = ViewerConfig::from_str_as(text, ConfigFormat::Toml).unwrap();
        assert!(!config.mesh.center);
        assert_eq!(config.mesh.target_size, 100.0);
    }

    #[test]
    fn test_camera_section_builds_camera() {
        let config = CameraConfig::default();
        let arcball = config.build(640, 480);
        assert_eq!(arcball.camera().size, (640.0, 480.0));
        assert_eq!(arcball.rotate_speed, config.rotate_speed);
    }
}
