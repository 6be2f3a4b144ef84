//! # Block Module
//!
//! This module provides the block registry for the voxel engine: the set of
//! block types, their per-face texture ids and transparency, and the six
//! axis-aligned face directions. The registry is a pure lookup table; it must
//! be consistent before any meshing call, since face culling and texture
//! selection both read from it.

pub mod block_type;
pub mod direction;

pub use block_type::{BlockType, BlockTypeSize, TextureId};
pub use direction::Direction;
