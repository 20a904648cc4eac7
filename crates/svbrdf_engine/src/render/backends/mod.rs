//! Backend implementations for the render module
//!
//! Only the headless recorder ships with the crate; GPU bindings implement
//! [`RenderBackend`](crate::render::api::RenderBackend) in the host
//! application.

/// Recording backend without a GPU
pub mod headless;

pub use headless::{BackendCall, HeadlessBackend};
