//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a dense 32x32x32 array of blocks
//! together with the chunk's position in the chunk grid, its dirty-queue
//! membership flag, and the handle to its currently allocated slice of the
//! shared vertex buffer.
//!
//! The local-coordinate-to-array-index mapping `x + SIZE * (y + SIZE * z)` is
//! a bijection over the chunk volume. The same arithmetic orders vertex
//! emission during meshing, so it is load-bearing for determinism as well as
//! storage layout.

use cgmath::Point3;

use crate::rendering::range_allocator::Range;

use super::block::BlockType;

/// The edge length of a chunk in blocks.
pub const CHUNK_SIZE: i32 = 32;
/// The total number of blocks in a chunk.
pub const CHUNK_VOLUME: usize = (CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE) as usize;

/// A 32x32x32 cube of blocks, the unit of meshing and dirty tracking.
pub struct Chunk {
    /// The position of this chunk in chunk-grid coordinates.
    pub coord: Point3<i32>,

    blocks: Vec<BlockType>,

    /// Whether this chunk currently sits in the world's dirty queue. Owned by
    /// the queue; guarantees a chunk is enqueued at most once.
    pub(crate) in_dirty_list: bool,

    /// Where this chunk's packed vertices live in the shared vertex buffer.
    /// Zero-sized until the chunk has been meshed with visible geometry.
    pub mesh: Range,
}

impl Chunk {
    pub(crate) fn new(coord: Point3<i32>) -> Self {
        Chunk {
            coord,
            blocks: vec![BlockType::Air; CHUNK_VOLUME],
            in_dirty_list: false,
            mesh: Range::default(),
        }
    }

    /// Returns whether `local` lies within `[0, CHUNK_SIZE)` on every axis.
    pub fn in_chunk_bounds(local: Point3<i32>) -> bool {
        local.x >= 0
            && local.y >= 0
            && local.z >= 0
            && local.x < CHUNK_SIZE
            && local.y < CHUNK_SIZE
            && local.z < CHUNK_SIZE
    }

    /// Maps a local coordinate to its index in the block array.
    ///
    /// This mapping is a bijection over the chunk volume; see
    /// [`local_from_index`](Self::local_from_index) for the inverse.
    pub fn block_index(local: Point3<i32>) -> usize {
        debug_assert!(Self::in_chunk_bounds(local));
        (local.x + CHUNK_SIZE * (local.y + CHUNK_SIZE * local.z)) as usize
    }

    /// The inverse of [`block_index`](Self::block_index).
    pub fn local_from_index(index: usize) -> Point3<i32> {
        debug_assert!(index < CHUNK_VOLUME);
        let index = index as i32;
        Point3::new(
            index % CHUNK_SIZE,
            (index / CHUNK_SIZE) % CHUNK_SIZE,
            index / (CHUNK_SIZE * CHUNK_SIZE),
        )
    }

    /// Reads the block at `local` without a bounds check.
    ///
    /// Callers must have validated `local` already; this is used on the hot
    /// meshing path where the coordinates come from loop counters.
    pub fn get_block_unchecked(&self, local: Point3<i32>) -> BlockType {
        self.blocks[Self::block_index(local)]
    }

    /// Writes the block at `local` without a bounds check or dirty marking.
    pub fn set_block_unchecked(&mut self, local: Point3<i32>, new_block: BlockType) {
        self.blocks[Self::block_index(local)] = new_block;
    }

    /// Reads the block at `local`, returning `Air` for out-of-chunk
    /// coordinates.
    pub fn get_block(&self, local: Point3<i32>) -> BlockType {
        if !Self::in_chunk_bounds(local) {
            return BlockType::Air;
        }

        self.get_block_unchecked(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_index_is_a_bijection() {
        let mut seen = vec![false; CHUNK_VOLUME];
        for z in 0..CHUNK_SIZE {
            for y in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    let local = Point3::new(x, y, z);
                    let index = Chunk::block_index(local);
                    assert!(!seen[index], "index {} hit twice", index);
                    seen[index] = true;
                    assert_eq!(Chunk::local_from_index(index), local);
                }
            }
        }
        assert!(seen.iter().all(|&hit| hit));
    }

    #[test]
    fn get_block_is_air_outside_the_chunk() {
        let mut chunk = Chunk::new(Point3::new(0, 0, 0));
        chunk.set_block_unchecked(Point3::new(0, 0, 0), BlockType::Dirt);

        assert_eq!(chunk.get_block(Point3::new(0, 0, 0)), BlockType::Dirt);
        assert_eq!(chunk.get_block(Point3::new(-1, 0, 0)), BlockType::Air);
        assert_eq!(chunk.get_block(Point3::new(0, CHUNK_SIZE, 0)), BlockType::Air);
    }
}
