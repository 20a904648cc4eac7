//! Renderer shell
//!
//! Owns the camera, the lights and one [`Renderable`] per draw call, and
//! drives a [`RenderBackend`]. Per frame it refreshes the camera and light
//! uniforms of every renderable and issues one triangle-list draw each.
//! Window events are translated into camera motion here.

use std::path::PathBuf;

use crate::events::{AppEvent, EventResponse, KeyCode, MouseButton};
use crate::foundation::math::{Mat4, Vec3};

use super::api::{BackendError, ProgramHandle, RenderBackend, UniformValue, VertexAttributes};
use super::lighting::{uniforms as light_uniforms, Light};
use super::primitives::{ArcballCamera, PointerPosition};
use super::shading::{ShaderTemplate, ShadingMaterial};

/// Renderer errors
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    /// The backend refused a call
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// A shader source file could not be read
    #[error("Cannot read shader {}: {source}", path.display())]
    ShaderSource {
        /// Shader file
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },
}

/// One draw call: a compiled program, its streams and its material
#[derive(Debug)]
pub struct Renderable {
    material: ShadingMaterial,
    program: ProgramHandle,
    attributes: VertexAttributes,
}

impl Renderable {
    /// Compile the material's program for `num_lights` lights and upload
    /// streams, textures and material uniforms.
    pub fn new<B: RenderBackend>(
        backend: &mut B,
        template: &ShaderTemplate,
        mut material: ShadingMaterial,
        attributes: VertexAttributes,
        num_lights: usize,
    ) -> Result<Self, RenderError> {
        let program = backend.compile_program(&template.specialize(num_lights))?;
        backend.upload_attributes(program, &attributes.streams(material.is_textured()))?;
        material.upload_textures(backend)?;

        let renderable = Self {
            material,
            program,
            attributes,
        };
        renderable.upload_material(backend)?;
        Ok(renderable)
    }

    /// Push the material's uniforms to the program
    pub fn upload_material<B: RenderBackend>(&self, backend: &mut B) -> Result<(), RenderError> {
        for (name, value) in self.material.uniforms() {
            backend.set_uniform(self.program, name, value)?;
        }
        Ok(())
    }

    /// Shading material
    pub fn material(&self) -> &ShadingMaterial {
        &self.material
    }

    /// Compiled program
    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    /// Uploaded streams
    pub fn attributes(&self) -> &VertexAttributes {
        &self.attributes
    }

    /// Corners drawn per frame
    pub fn vertex_count(&self) -> usize {
        self.attributes.vertex_count()
    }
}

/// Camera-dependent uniforms shared by every renderable in a frame
struct FrameUniforms {
    view: Mat4,
    model: Mat4,
    perspective: Mat4,
    camera_position: Vec3,
}

impl FrameUniforms {
    fn bind<B: RenderBackend>(&self, backend: &mut B, program: ProgramHandle, lights: &[Light]) -> Result<(), RenderError> {
        backend.set_uniform(program, "u_view_mat", UniformValue::Mat4(self.view))?;
        backend.set_uniform(program, "u_model_mat", UniformValue::Mat4(self.model))?;
        backend.set_uniform(program, "u_perspective_mat", UniformValue::Mat4(self.perspective))?;
        backend.set_uniform(program, "cam_pos", UniformValue::Vec3(self.camera_position))?;

        for (index, light) in lights.iter().enumerate() {
            let position = light_uniforms::element(light_uniforms::POSITION, index);
            let intensity = light_uniforms::element(light_uniforms::INTENSITY, index);
            let color = light_uniforms::element(light_uniforms::COLOR, index);
            backend.set_uniform(program, &position, UniformValue::Vec3(light.position))?;
            backend.set_uniform(program, &intensity, UniformValue::Float(light.intensity))?;
            backend.set_uniform(program, &color, UniformValue::Vec3(light.color))?;
        }
        Ok(())
    }
}

/// Renderer shell over a backend
#[derive(Debug)]
pub struct Renderer<B: RenderBackend> {
    backend: B,
    camera: ArcballCamera,
    lights: Vec<Light>,
    renderables: Vec<Renderable>,
    model_mat: Mat4,
    cursor: Option<PointerPosition>,
    dragging: bool,
}

impl<B: RenderBackend> Renderer<B> {
    /// Color every frame is cleared to
    pub const CLEAR_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    /// Create a renderer; the viewport is set from the camera size
    pub fn new(mut backend: B, camera: ArcballCamera, lights: Vec<Light>) -> Self {
        let (width, height) = camera.camera().size;
        backend.set_viewport(width as u32, height as u32);
        Self {
            backend,
            camera,
            lights,
            renderables: Vec::new(),
            model_mat: Mat4::identity(),
            cursor: None,
            dragging: false,
        }
    }

    /// Add a draw call for `material` over `attributes`
    pub fn add_renderable(
        &mut self,
        template: &ShaderTemplate,
        material: ShadingMaterial,
        attributes: VertexAttributes,
    ) -> Result<(), RenderError> {
        let renderable = Renderable::new(&mut self.backend, template, material, attributes, self.lights.len())?;
        self.frame_uniforms().bind(&mut self.backend, renderable.program, &self.lights)?;
        log::debug!(
            "Added {:?} renderable with {} vertices",
            renderable.material.kind(),
            renderable.vertex_count()
        );
        self.renderables.push(renderable);
        Ok(())
    }

    fn frame_uniforms(&self) -> FrameUniforms {
        let camera = self.camera.camera();
        FrameUniforms {
            view: camera.view_mat(),
            model: self.model_mat,
            perspective: camera.perspective_mat(),
            camera_position: camera.world_position(),
        }
    }

    /// Refresh camera and light uniforms of every renderable
    pub fn update_uniforms(&mut self) -> Result<(), RenderError> {
        let frame = self.frame_uniforms();
        for renderable in &self.renderables {
            frame.bind(&mut self.backend, renderable.program, &self.lights)?;
        }
        Ok(())
    }

    /// Clear and draw every renderable; returns the number of draw calls
    pub fn draw(&mut self) -> Result<usize, RenderError> {
        self.backend.clear(Self::CLEAR_COLOR);
        self.update_uniforms()?;
        for renderable in &self.renderables {
            self.backend.draw_triangles(renderable.program, renderable.vertex_count())?;
        }
        log::trace!("Drew {} renderables", self.renderables.len());
        Ok(self.renderables.len())
    }

    /// Apply a new surface size to the viewport and the camera
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        log::debug!("Resizing to {}x{}", width, height);
        self.backend.set_viewport(width, height);
        self.camera.set_viewport(width as f32, height as f32);
        self.update_uniforms()
    }

    /// Set the lobe exponent of every SVBRDF renderable.
    ///
    /// Returns how many renderables were changed.
    pub fn update_alpha(&mut self, alpha: f32) -> Result<usize, RenderError> {
        let mut changed = 0;
        for renderable in &mut self.renderables {
            if renderable.material.set_alpha(alpha) {
                renderable.upload_material(&mut self.backend)?;
                changed += 1;
            }
        }
        log::info!("Set alpha to {} on {} materials", alpha, changed);
        Ok(changed)
    }

    /// React to one window event
    pub fn handle_event(&mut self, event: AppEvent) -> Result<EventResponse, RenderError> {
        match event {
            AppEvent::CursorMoved { x, y } => {
                let current = (x, y);
                let last = self.cursor.replace(current);
                match last {
                    Some(last) if self.dragging => {
                        self.camera.handle_drag(last, current);
                        self.update_uniforms()?;
                        Ok(EventResponse::Redraw)
                    }
                    _ => Ok(EventResponse::Ignored),
                }
            }
            AppEvent::MouseInput { button: MouseButton::Left, pressed } => {
                self.dragging = pressed;
                Ok(EventResponse::Ignored)
            }
            AppEvent::MouseInput { .. } => Ok(EventResponse::Ignored),
            AppEvent::MouseWheel { delta } => {
                if self.camera.zoom(delta) {
                    self.update_uniforms()?;
                    Ok(EventResponse::Redraw)
                } else {
                    Ok(EventResponse::Ignored)
                }
            }
            AppEvent::Resized { width, height } => {
                // Minimized windows report a zero size
                if width == 0 || height == 0 {
                    return Ok(EventResponse::Ignored);
                }
                self.resize(width, height)?;
                Ok(EventResponse::Redraw)
            }
            AppEvent::RedrawRequested => {
                self.draw()?;
                Ok(EventResponse::Ignored)
            }
            AppEvent::KeyPressed(KeyCode::Escape) | AppEvent::CloseRequested => Ok(EventResponse::Quit),
            AppEvent::KeyPressed(_) => Ok(EventResponse::Ignored),
        }
    }

    /// Backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable backend
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Arcball camera
    pub fn camera(&self) -> &ArcballCamera {
        &self.camera
    }

    /// Mutable arcball camera; call [`Renderer::update_uniforms`] after changes
    pub fn camera_mut(&mut self) -> &mut ArcballCamera {
        &mut self.camera
    }

    /// Lights
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Draw calls in order
    pub fn renderables(&self) -> &[Renderable] {
        &self.renderables
    }

    /// Give the backend back
    pub fn into_backend(self) -> B {
        self.backend
    }
}
