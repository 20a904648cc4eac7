//! # SVBRDF Engine
//!
//! Mesh ingestion and a renderer shell for viewing measured SVBRDF materials
//! on triangle meshes.
//!
//! ## Features
//!
//! - **Wavefront Loading**: OBJ geometry with material, group and object
//!   segments, plus companion MTL reflectance data
//! - **Attribute Expansion**: flat per-corner position, normal, UV and
//!   tangent-frame streams, filtered per segment
//! - **SVBRDF Maps**: PFM decoding and material directory loading
//! - **Orbit Camera**: look-at camera with arcball and wheel control
//! - **Renderer Shell**: light-count program specialization, per-frame
//!   uniforms and one draw per material over any [`RenderBackend`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use svbrdf_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ViewerConfig::default();
//!     let scene = Scene::load("scenes/leather.toml")?;
//!     let camera = config.camera.build(config.window.width, config.window.height);
//!     let mut renderer = scene.into_renderer(HeadlessBackend::new(), camera, &config.shaders)?;
//!     renderer.draw()?;
//!     Ok(())
//! }
//! ```
//!
//! [`RenderBackend`]: render::api::RenderBackend

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;

pub mod foundation;
pub mod config;
pub mod assets;
pub mod render;
pub mod events;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{LoadError, Material, MtlParser, ObjLoader, PfmImage, Svbrdf},
        config::Config,
        core::ViewerConfig,
        events::{AppEvent, EventResponse},
        foundation::math::{Mat4, Vec2, Vec3},
        render::{
            api::{RenderBackend, VertexAttributes},
            backends::HeadlessBackend,
            primitives::{ArcballCamera, Camera, FaceFilter, Mesh, SegmentKind},
            Light, Renderer, ShadingMaterial,
        },
        scene::{Scene, SceneDescription, SceneError},
    };
}
