//! Recording backend without a GPU
//!
//! Every call is validated the way a real binding layer would fail
//! (unknown handles, unspecialized sources, ragged attribute streams) and
//! appended to a call log. Uniform values and attribute bindings are kept
//! per program so they can be inspected after a frame.

use std::collections::HashMap;

use slotmap::SlotMap;

use crate::assets::PfmImage;
use crate::render::api::{
    AttributeStream, BackendError, BackendResult, ProgramHandle, ProgramSource, RenderBackend, TextureHandle,
    UniformValue,
};

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    /// A program was compiled
    CompileProgram(ProgramHandle),
    /// A texture was uploaded
    CreateTexture {
        /// New texture
        texture: TextureHandle,
        /// `(width, height)`
        size: (usize, usize),
    },
    /// Attribute streams were bound
    UploadAttributes {
        /// Target program
        program: ProgramHandle,
        /// Bound attribute names in order
        names: Vec<&'static str>,
        /// Corners per stream
        vertex_count: usize,
    },
    /// A uniform was set
    SetUniform {
        /// Target program
        program: ProgramHandle,
        /// Uniform name
        name: String,
        /// Value
        value: UniformValue,
    },
    /// The viewport changed
    SetViewport(u32, u32),
    /// The frame was cleared
    Clear([f32; 4]),
    /// A triangle list was drawn
    DrawTriangles {
        /// Program drawn with
        program: ProgramHandle,
        /// Corners drawn
        vertex_count: usize,
    },
}

#[derive(Debug, Default)]
struct ProgramState {
    source: Option<ProgramSource>,
    attributes: Vec<&'static str>,
    vertex_count: usize,
    uniforms: HashMap<String, UniformValue>,
}

/// Backend that records instead of drawing
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    programs: SlotMap<ProgramHandle, ProgramState>,
    textures: SlotMap<TextureHandle, (usize, usize)>,
    viewport: (u32, u32),
    calls: Vec<BackendCall>,
}

impl HeadlessBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls recorded so far
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Drain the call log
    pub fn take_calls(&mut self) -> Vec<BackendCall> {
        std::mem::take(&mut self.calls)
    }

    /// Current viewport size
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Number of compiled programs
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    /// Number of uploaded textures
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Last value set for a uniform
    pub fn uniform(&self, program: ProgramHandle, name: &str) -> Option<UniformValue> {
        self.programs.get(program)?.uniforms.get(name).copied()
    }

    /// Attribute names currently bound to a program
    pub fn attributes(&self, program: ProgramHandle) -> Option<&[&'static str]> {
        self.programs.get(program).map(|state| state.attributes.as_slice())
    }

    /// Specialized source a program was compiled from
    pub fn program_source(&self, program: ProgramHandle) -> Option<&ProgramSource> {
        self.programs.get(program)?.source.as_ref()
    }

    /// Draw calls recorded so far
    pub fn draw_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, BackendCall::DrawTriangles { .. }))
            .count()
    }

    fn program_mut(&mut self, program: ProgramHandle) -> BackendResult<&mut ProgramState> {
        self.programs.get_mut(program).ok_or(BackendError::UnknownProgram)
    }
}

impl RenderBackend for HeadlessBackend {
    fn compile_program(&mut self, source: &ProgramSource) -> BackendResult<ProgramHandle> {
        for (stage, text) in [("vertex", &source.vertex), ("fragment", &source.fragment)] {
            if text.trim().is_empty() {
                return Err(BackendError::Compilation(format!("empty {} stage", stage)));
            }
            if text.contains('$') {
                return Err(BackendError::Compilation(format!("unsubstituted placeholder in {} stage", stage)));
            }
        }

        let handle = self.programs.insert(ProgramState {
            source: Some(source.clone()),
            ..ProgramState::default()
        });
        self.calls.push(BackendCall::CompileProgram(handle));
        Ok(handle)
    }

    fn create_texture(&mut self, image: &PfmImage) -> BackendResult<TextureHandle> {
        if image.pixels.len() != image.width * image.height {
            return Err(BackendError::InvalidTexture(format!(
                "{} pixels for a {}x{} image",
                image.pixels.len(),
                image.width,
                image.height
            )));
        }
        let size = image.dimensions();
        let texture = self.textures.insert(size);
        self.calls.push(BackendCall::CreateTexture { texture, size });
        Ok(texture)
    }

    fn upload_attributes(&mut self, program: ProgramHandle, streams: &[AttributeStream<'_>]) -> BackendResult<()> {
        let vertex_count = streams.first().map_or(0, AttributeStream::len);
        if let Some(ragged) = streams.iter().find(|stream| stream.len() != vertex_count) {
            return Err(BackendError::AttributeLength {
                name: ragged.name.to_string(),
                expected: vertex_count,
                found: ragged.len(),
            });
        }

        let names: Vec<&'static str> = streams.iter().map(|stream| stream.name).collect();
        let state = self.program_mut(program)?;
        state.attributes = names.clone();
        state.vertex_count = vertex_count;
        self.calls.push(BackendCall::UploadAttributes {
            program,
            names,
            vertex_count,
        });
        Ok(())
    }

    fn set_uniform(&mut self, program: ProgramHandle, name: &str, value: UniformValue) -> BackendResult<()> {
        if let UniformValue::Texture(texture) = value {
            if !self.textures.contains_key(texture) {
                return Err(BackendError::UnknownTexture);
            }
        }
        self.program_mut(program)?.uniforms.insert(name.to_string(), value);
        self.calls.push(BackendCall::SetUniform {
            program,
            name: name.to_string(),
            value,
        });
        Ok(())
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
        self.calls.push(BackendCall::SetViewport(width, height));
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.calls.push(BackendCall::Clear(color));
    }

    fn draw_triangles(&mut self, program: ProgramHandle, vertex_count: usize) -> BackendResult<()> {
        let bound = self.program_mut(program)?.vertex_count;
        if vertex_count > bound {
            return Err(BackendError::AttributeLength {
                name: "draw".to_string(),
                expected: bound,
                found: vertex_count,
            });
        }
        self.calls.push(BackendCall::DrawTriangles { program, vertex_count });
        Ok(())
    }
}
