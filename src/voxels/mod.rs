//! # Voxels Module
//!
//! This module contains the CPU-side voxel world: the block registry, chunk
//! storage, the world grid with its dirty-chunk queue and raycast, and the
//! initial world generation strategies.

pub mod block;
pub mod chunk;
pub mod generation;
pub mod world;
