//! Point lights

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;

/// Uniform name prefixes; element `i` is bound as `prefix[i]`
pub mod uniforms {
    /// Light positions
    pub const POSITION: &str = "light_position";
    /// Light intensities
    pub const INTENSITY: &str = "light_intensity";
    /// Light colors
    pub const COLOR: &str = "light_color";

    /// Name of one element of an array-valued uniform
    pub fn element(prefix: &str, index: usize) -> String {
        format!("{}[{}]", prefix, index)
    }
}

/// Point light source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    /// World-space position
    pub position: Vec3,
    /// Radiant intensity
    pub intensity: f32,
    /// Linear RGB color
    #[serde(default = "Light::white")]
    pub color: Vec3,
}

impl Light {
    /// Create a white point light
    pub fn new(position: Vec3, intensity: f32) -> Self {
        Self {
            position,
            intensity,
            color: Self::white(),
        }
    }

    /// Set the light color
    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    fn white() -> Vec3 {
        Vec3::new(1.0, 1.0, 1.0)
    }
}
