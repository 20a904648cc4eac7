//! Rendering
//!
//! Everything between a loaded mesh and a backend draw call:
//!
//! - [`primitives`]: the mesh model, tangent frames and the orbit camera
//! - [`lighting`]: point lights
//! - [`shading`]: shader templates and shading materials
//! - [`api`]: the backend trait and the values passed through it
//! - [`backends`]: the headless recording backend
//! - [`renderer`]: the renderer shell driving a backend

pub mod api;
pub mod backends;
pub mod lighting;
pub mod primitives;
pub mod renderer;
pub mod shading;

pub use api::{BackendError, RenderBackend, UniformValue, VertexAttributes};
pub use lighting::Light;
pub use primitives::{ArcballCamera, Camera, FaceFilter, Mesh};
pub use renderer::{RenderError, Renderable, Renderer};
pub use shading::{MaterialKind, PhongMaterial, ShaderTemplate, ShadingMaterial, SvbrdfMaterial};
