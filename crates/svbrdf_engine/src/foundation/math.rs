//! Math utilities and types
//!
//! Provides the vector and matrix aliases used by the mesh, camera and
//! renderer modules, plus the handful of free functions they share.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion, UnitQuaternion,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = UnitQuaternion<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Unit-length copy of `v`, or `v` unchanged when it has no length.
    pub fn normalized(v: Vec3) -> Vec3 {
        v.try_normalize(0.0).unwrap_or(v)
    }

    /// Component-wise minimum and maximum of a point set.
    ///
    /// Returns `None` for an empty set.
    pub fn bounds<'a, I>(points: I) -> Option<(Vec3, Vec3)>
    where
        I: IntoIterator<Item = &'a Vec3>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold((first, first), |(min, max), p| (min.inf(p), max.sup(p))))
    }
}

/// Extension trait for Mat4 with the projections the viewer needs
pub trait Mat4Ext {
    /// Symmetric OpenGL-style perspective projection.
    ///
    /// `fov_y_degrees` is the full vertical field of view. Depth maps to
    /// `[-1, 1]` in clip space and the camera looks down -Z.
    fn perspective_gl(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Assemble a 4x4 transform from a 3x3 rotation and a translation column.
    fn from_rotation_translation(rotation: &Mat3, translation: &Vec3) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn perspective_gl(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let f = 1.0 / (utils::deg_to_rad(fov_y_degrees) * 0.5).tan();
        let depth = near - far;

        let mut result = Mat4::zeros();
        result[(0, 0)] = f / aspect;
        result[(1, 1)] = f;
        result[(2, 2)] = (far + near) / depth;
        result[(2, 3)] = 2.0 * far * near / depth;
        result[(3, 2)] = -1.0;
        result
    }

    fn from_rotation_translation(rotation: &Mat3, translation: &Vec3) -> Mat4 {
        let mut result = Mat4::identity();
        result.fixed_view_mut::<3, 3>(0, 0).copy_from(rotation);
        result.fixed_view_mut::<3, 1>(0, 3).copy_from(translation);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalized_handles_zero() {
        assert_eq!(utils::normalized(Vec3::zeros()), Vec3::zeros());
        assert_relative_eq!(utils::normalized(Vec3::new(0.0, 3.0, 4.0)), Vec3::new(0.0, 0.6, 0.8));
    }

    #[test]
    fn test_bounds() {
        let points = [Vec3::new(1.0, -2.0, 3.0), Vec3::new(-1.0, 5.0, 0.0)];
        let (min, max) = utils::bounds(&points).unwrap();
        assert_eq!(min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(max, Vec3::new(1.0, 5.0, 3.0));
        assert!(utils::bounds(&Vec::<Vec3>::new()).is_none());
    }

    #[test]
    fn test_perspective_maps_near_and_far_planes() {
        let proj = Mat4::perspective_gl(90.0, 2.0, 1.0, 10.0);
        assert_relative_eq!(proj[(0, 0)], 0.5, epsilon = 1e-6);
        assert_relative_eq!(proj[(1, 1)], 1.0, epsilon = 1e-6);

        let near = proj * Vec4::new(0.0, 0.0, -1.0, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, -10.0, 1.0);
        assert_relative_eq!(near.z / near.w, -1.0, epsilon = 1e-5);
        assert_relative_eq!(far.z / far.w, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_rotation_translation_layout() {
        let m = Mat4::from_rotation_translation(&Mat3::identity(), &Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m[(0, 3)], 1.0);
        assert_eq!(m[(2, 3)], 3.0);
        assert_eq!(m[(3, 3)], 1.0);
    }
}
