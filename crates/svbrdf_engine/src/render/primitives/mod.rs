//! Core primitive types for rendering
//!
//! The mesh model with its attribute expansion, tangent-space construction
//! and the orbit camera.

pub mod camera;
pub mod mesh;
pub mod tangent;

pub use camera::{ArcballCamera, Camera, PointerPosition};
pub use mesh::{Face, FaceFilter, FaceTags, Mesh, MeshError, NameRegistry, ObjIndex, SegmentKind};
pub use tangent::{TangentFrame, TangentStreams, DEGENERATE_UV_DENOMINATOR, UV_TILING_SCALE};
