//! # Orbit Camera
//!
//! A look-at camera whose matrices are recomputed on every query, plus the
//! arcball controller that turns pointer drags into orbits about the look-at
//! point.
//!
//! ## Coordinate System
//! Right-handed, Y-up world. In view space the camera looks down -Z, and
//! projection follows the OpenGL clip-space convention (depth in `[-1, 1]`).
//! Matrices are ordinary nalgebra matrices, so they can be uploaded as
//! column-major data without a transpose.

use crate::foundation::math::{constants, utils, Mat3, Mat4, Mat4Ext, Unit, UnitQuaternion, Vec3};

/// Look-at perspective camera
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Viewport `(width, height)` in pixels
    pub size: (f32, f32),
    /// Near clipping plane distance
    pub near: f32,
    /// Far clipping plane distance
    pub far: f32,
    /// Eye position in world space
    pub position: Vec3,
    /// Point the camera looks at
    pub lookat: Vec3,
    /// Unit up hint; the view basis is re-orthogonalized against it
    pub up: Vec3,
}

impl Camera {
    /// Create a camera; `up` is normalized on the way in
    pub fn new(fov: f32, size: (f32, f32), near: f32, far: f32, position: Vec3, lookat: Vec3, up: Vec3) -> Self {
        Self {
            fov,
            size,
            near,
            far,
            position,
            lookat,
            up: utils::normalized(up),
        }
    }

    /// Unit vector from the eye to the look-at point
    pub fn forward(&self) -> Vec3 {
        utils::normalized(self.lookat - self.position)
    }

    /// Viewport width over height
    pub fn aspect(&self) -> f32 {
        if self.size.1 > 0.0 {
            self.size.0 / self.size.1
        } else {
            1.0
        }
    }

    /// World-to-camera rotation with rows right, up and back
    pub fn rotation(&self) -> Mat3 {
        let forward = self.forward();
        let right = utils::normalized(forward.cross(&self.up));
        let back = -forward;
        let up = back.cross(&right);
        Mat3::from_rows(&[right.transpose(), up.transpose(), back.transpose()])
    }

    /// World-to-camera transform
    pub fn view_mat(&self) -> Mat4 {
        let rotation = self.rotation();
        Mat4::from_rotation_translation(&rotation, &-(rotation * self.position))
    }

    /// Camera-to-clip transform
    pub fn perspective_mat(&self) -> Mat4 {
        Mat4::perspective_gl(self.fov, self.aspect(), self.near, self.far)
    }

    /// Eye position recovered from the inverse view transform
    ///
    /// Equals [`Camera::position`] for any well-formed basis; falls back to it
    /// when the view matrix is singular.
    pub fn world_position(&self) -> Vec3 {
        self.view_mat()
            .try_inverse()
            .map_or(self.position, |inverse| inverse.fixed_view::<3, 1>(0, 3).into_owned())
    }

    /// Store a new viewport size
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.size = (width, height);
    }
}

/// Pointer position in window pixels, origin top-left
pub type PointerPosition = (f32, f32);

/// Arcball controller owning the camera it moves
#[derive(Debug, Clone, PartialEq)]
pub struct ArcballCamera {
    camera: Camera,
    /// Multiplier applied to the arc angle between two pointer samples
    pub rotate_speed: f32,
    /// Largest rotation applied for one pointer sample, in radians
    pub max_step: f32,
    /// Distance moved per wheel notch
    pub zoom_step: f32,
}

impl ArcballCamera {
    /// Default angle multiplier
    pub const DEFAULT_ROTATE_SPEED: f32 = 100.0;
    /// Default wheel step
    pub const DEFAULT_ZOOM_STEP: f32 = 5.0;
    /// Default per-sample rotation limit
    pub const DEFAULT_MAX_STEP: f32 = constants::HALF_PI;

    /// Wrap a camera with default speeds
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            rotate_speed: Self::DEFAULT_ROTATE_SPEED,
            max_step: Self::DEFAULT_MAX_STEP,
            zoom_step: Self::DEFAULT_ZOOM_STEP,
        }
    }

    /// Set the angle multiplier
    pub fn with_rotate_speed(mut self, speed: f32) -> Self {
        self.rotate_speed = speed;
        self
    }

    /// Set the wheel step
    pub fn with_zoom_step(mut self, step: f32) -> Self {
        self.zoom_step = step;
        self
    }

    /// The controlled camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable access to the controlled camera
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Project a pointer position onto the unit arcball.
    ///
    /// Points inside the unit disc are lifted onto the front hemisphere;
    /// points outside it are pulled onto the rim.
    pub fn arcball_vector(pointer: PointerPosition, size: (f32, f32)) -> Vec3 {
        let (x, y) = pointer;
        let (w, h) = size;
        let mut p = Vec3::new(2.0 * x / w - 1.0, -(2.0 * y / h - 1.0), 0.0);
        let squared = p.x * p.x + p.y * p.y;
        if squared <= 1.0 {
            p.z = (1.0 - squared).sqrt();
        } else {
            p = utils::normalized(p);
        }
        p
    }

    /// Orbit the eye for a drag from `last` to `current`.
    ///
    /// Returns the angle applied, zero when the two samples give no
    /// rotation axis.
    pub fn handle_drag(&mut self, last: PointerPosition, current: PointerPosition) -> f32 {
        let size = self.camera.size;
        let va = Self::arcball_vector(current, size);
        let vb = Self::arcball_vector(last, size);

        let cos = va.dot(&vb).clamp(-1.0, 1.0);
        let angle = (cos.acos() * self.rotate_speed).min(self.max_step);

        let axis_in_camera = va.cross(&vb);
        let axis_in_world = self.camera.rotation().transpose() * axis_in_camera;
        let Some(axis) = Unit::try_new(axis_in_world, f32::EPSILON) else {
            return 0.0;
        };

        let rotation = UnitQuaternion::from_axis_angle(&axis, angle);
        let offset = self.camera.position - self.camera.lookat;
        self.camera.position = self.camera.lookat + rotation * offset;
        log::trace!("Arcball rotation of {} rad about {:?}", angle, axis.as_ref());
        angle
    }

    /// Move toward (positive `delta`) or away from the look-at point.
    ///
    /// Moves that would reach or cross the look-at point are refused and
    /// `false` is returned.
    pub fn zoom(&mut self, delta: f32) -> bool {
        let offset = self.camera.position - self.camera.lookat;
        let distance = offset.norm();
        let amount = self.zoom_step * delta;
        if distance - amount <= 0.0 {
            return false;
        }
        self.camera.position -= utils::normalized(offset) * amount;
        true
    }

    /// Store a new viewport size on the camera
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.camera.set_viewport(width, height);
    }
}
