//! Per-face tangent frames for normal-mapped shading
//!
//! Each textured triangle gets one flat tangent/bitangent pair derived from
//! its position and texture-coordinate edges. The pair is not normalized and
//! not averaged across neighbouring faces; the shader normalizes.

use crate::foundation::math::{Vec2, Vec3};

/// Texture coordinates are multiplied by this before differencing.
///
/// Matches the tiling the material maps are authored for.
pub const UV_TILING_SCALE: f32 = 100.0;

/// Stand-in for the UV determinant when it is zero, negative or NaN.
///
/// Dividing by this blows the frame up instead of flipping or collapsing it.
/// Tiny positive determinants are used as-is.
pub const DEGENERATE_UV_DENOMINATOR: f32 = 1e-10;

/// Tangent and bitangent of one triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentFrame {
    /// Direction of increasing U in object space
    pub tangent: Vec3,
    /// Direction of increasing V in object space
    pub bitangent: Vec3,
}

impl TangentFrame {
    /// Frame emitted for faces without texture coordinates
    pub fn zero() -> Self {
        Self {
            tangent: Vec3::zeros(),
            bitangent: Vec3::zeros(),
        }
    }

    /// Compute the frame of a triangle from its corner positions and UVs.
    ///
    /// The second value is `true` when the UV determinant was not positive
    /// and [`DEGENERATE_UV_DENOMINATOR`] was used in its place.
    pub fn from_triangle(positions: [Vec3; 3], uvs: [Vec2; 3]) -> (Self, bool) {
        let [p0, p1, p2] = positions;
        let [uv0, uv1, uv2] = uvs.map(|uv| uv * UV_TILING_SCALE);

        let edge1 = p1 - p0;
        let edge2 = p2 - p0;
        let duv1 = uv1 - uv0;
        let duv2 = uv2 - uv0;

        let denom = duv1.x * duv2.y - duv1.y * duv2.x;
        let (r, degenerate) = if denom > 0.0 {
            (1.0 / denom, false)
        } else {
            (1.0 / DEGENERATE_UV_DENOMINATOR, true)
        };

        let frame = Self {
            tangent: (edge1 * duv2.y - edge2 * duv1.y) * r,
            bitangent: (edge2 * duv1.x - edge1 * duv2.x) * r,
        };
        (frame, degenerate)
    }
}

/// Flat tangent and bitangent streams, three entries per face
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TangentStreams {
    /// One tangent per corner
    pub tangents: Vec<Vec3>,
    /// One bitangent per corner
    pub bitangents: Vec<Vec3>,
    /// Faces whose frame came from the degenerate-denominator fallback
    pub degenerate_faces: usize,
}

impl TangentStreams {
    /// Empty streams with room for `faces` triangles
    pub fn with_face_capacity(faces: usize) -> Self {
        Self {
            tangents: Vec::with_capacity(faces * 3),
            bitangents: Vec::with_capacity(faces * 3),
            degenerate_faces: 0,
        }
    }

    /// Replicate one face frame onto its three corners
    pub fn push_face(&mut self, frame: TangentFrame) {
        for _ in 0..3 {
            self.tangents.push(frame.tangent);
            self.bitangents.push(frame.bitangent);
        }
    }

    /// Number of corners
    pub fn len(&self) -> usize {
        self.tangents.len()
    }

    /// Whether no face was expanded
    pub fn is_empty(&self) -> bool {
        self.tangents.is_empty()
    }
}
