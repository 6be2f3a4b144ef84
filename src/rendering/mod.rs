//! # Rendering Module
//!
//! The CPU side of the render path: packing vertices, turning chunk
//! neighborhoods into meshes, and managing where each chunk's mesh lives in
//! the shared vertex buffer. Nothing in here talks to the GPU; the outputs
//! are plain byte-castable buffers and upload commands for the graphics
//! layer to execute.

pub mod mesh_store;
pub mod meshing;
pub mod range_allocator;
pub mod vertex;
