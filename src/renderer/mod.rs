//! WebGPU rendering module
//!
//! Draws flat-colored rectangles given in pixel coordinates.

pub mod pipeline;
pub mod vertex;

pub use pipeline::{RenderState, pixel_to_ndc};
pub use vertex::{Vertex, rect_vertices};
