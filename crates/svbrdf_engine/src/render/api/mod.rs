//! Public rendering API
//!
//! The render backend trait, the handles and values passed through it, and
//! the vertex attribute bundles the mesh expands into.

pub mod attributes;
pub mod render_backend;

pub use attributes::{names as attribute_names, AttributeStream, VertexAttributes};
pub use render_backend::{
    BackendError, BackendResult, ProgramHandle, ProgramSource, RenderBackend, TextureHandle, UniformValue,
};
