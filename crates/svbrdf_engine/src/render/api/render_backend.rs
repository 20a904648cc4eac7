//! Boundary between the renderer shell and a GPU binding layer
//!
//! The shell never talks to a graphics API directly. It compiles programs,
//! uploads attribute streams and textures, binds uniforms by name and issues
//! triangle-list draws through [`RenderBackend`].

use slotmap::new_key_type;

use crate::assets::pfm::PfmImage;
use crate::foundation::math::{Mat4, Vec3};

use super::AttributeStream;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

new_key_type! {
    /// Handle to a compiled GPU program
    pub struct ProgramHandle;

    /// Handle to an uploaded texture
    pub struct TextureHandle;
}

/// Shader sources of one program, already specialized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSource {
    /// Vertex stage
    pub vertex: String,
    /// Fragment stage
    pub fragment: String,
}

/// A value bound to a named uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// Scalar
    Float(f32),
    /// 3-component vector
    Vec3(Vec3),
    /// 4x4 matrix, column-major as stored by nalgebra
    Mat4(Mat4),
    /// Sampler bound to an uploaded texture
    Texture(TextureHandle),
}

/// Backend failures
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Program compilation or linking failed
    #[error("Shader compilation failed: {0}")]
    Compilation(String),

    /// Handle does not name a live program
    #[error("Unknown program handle")]
    UnknownProgram,

    /// Handle does not name a live texture
    #[error("Unknown texture handle")]
    UnknownTexture,

    /// Streams of one upload disagree on their corner count
    #[error("Attribute '{name}' has {found} vertices, expected {expected}")]
    AttributeLength {
        /// Offending attribute
        name: String,
        /// Corner count of the first stream
        expected: usize,
        /// Corner count of this stream
        found: usize,
    },

    /// Texture data does not fit its declared size
    #[error("Invalid texture: {0}")]
    InvalidTexture(String),
}

/// GPU binding layer used by the renderer shell
pub trait RenderBackend {
    /// Compile and link a program
    fn compile_program(&mut self, source: &ProgramSource) -> BackendResult<ProgramHandle>;

    /// Upload an RGB float image as a texture
    fn create_texture(&mut self, image: &PfmImage) -> BackendResult<TextureHandle>;

    /// Bind vertex streams to a program's attributes, replacing earlier ones
    fn upload_attributes(&mut self, program: ProgramHandle, streams: &[AttributeStream<'_>]) -> BackendResult<()>;

    /// Set a uniform by name
    fn set_uniform(&mut self, program: ProgramHandle, name: &str, value: UniformValue) -> BackendResult<()>;

    /// Set the drawable area in pixels
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Clear color and depth
    fn clear(&mut self, color: [f32; 4]);

    /// Draw `vertex_count` corners of the bound streams as a triangle list
    fn draw_triangles(&mut self, program: ProgramHandle, vertex_count: usize) -> BackendResult<()>;
}
