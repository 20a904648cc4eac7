//! # Core Module
//!
//! Shared startup configuration for the viewer. The generic file handling
//! lives in [`crate::config`]; this module holds the concrete settings.

pub mod config;

pub use config::{
    ViewerConfig,
    WindowConfig,
    CameraConfig,
    MeshConfig,
    ShaderConfig,
};
pub use crate::config::{Config, ConfigError, ConfigFormat};
