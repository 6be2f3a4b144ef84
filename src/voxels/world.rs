//! # World Module
//!
//! This module provides the `World` struct: a dense grid of chunks with
//! bounds-safe global-to-local coordinate translation, block edits that keep
//! the dirty queue in sync (including the cross-chunk boundary case), and a
//! DDA raycast for the input layer.
//!
//! ## Dirty queue
//!
//! Chunks whose stored mesh no longer matches their block data sit in a dirty
//! list. Membership is tracked by a flag on the chunk itself, which makes the
//! enqueue idempotent in O(1). Extraction scans the list for the chunk
//! closest to the viewer so that streaming remeshes fill in terrain near the
//! camera first.

use cgmath::{Point3, Vector3};
use log::trace;

use super::block::{BlockType, Direction};
use super::chunk::{Chunk, CHUNK_SIZE};

/// Default width of the chunk grid, in chunks.
pub const WORLD_SIZE_X: i32 = 32;
/// Default height of the chunk grid, in chunks.
pub const WORLD_SIZE_Y: i32 = 8;
/// Default depth of the chunk grid, in chunks.
pub const WORLD_SIZE_Z: i32 = 32;

/// The block type reported for reads outside the world extent.
///
/// Applied uniformly: `get_block`, neighborhood gathering for meshing, and
/// raycasting all see the space beyond the grid as air.
pub const OUT_OF_BOUNDS_BLOCK: BlockType = BlockType::Air;

/// Maximum number of cells a raycast traverses before reporting a miss.
pub const MAX_RAYCAST_STEPS: usize = 1000;

/// The result of a successful raycast: the first non-air cell hit and the
/// direction the ray entered it through.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RayHit {
    /// The world position of the block that was hit.
    pub position: Point3<i32>,
    /// Unit normal of the face the ray entered through, pointing back toward
    /// the ray origin.
    pub normal: Vector3<i32>,
}

/// A fixed-size grid of chunks plus the dirty-chunk work queue.
pub struct World {
    size: Vector3<i32>,
    chunks: Vec<Chunk>,
    /// Indices into `chunks` of every chunk awaiting a remesh. A chunk
    /// appears here at most once; its `in_dirty_list` flag mirrors
    /// membership.
    dirty: Vec<usize>,
}

impl World {
    /// Creates a world with the default 32x8x32 chunk grid.
    pub fn new() -> Self {
        Self::with_size(Vector3::new(WORLD_SIZE_X, WORLD_SIZE_Y, WORLD_SIZE_Z))
    }

    /// Creates a world with `size` chunks per axis. All blocks start as air.
    ///
    /// # Panics
    /// Panics if any axis is non-positive.
    pub fn with_size(size: Vector3<i32>) -> Self {
        assert!(
            size.x > 0 && size.y > 0 && size.z > 0,
            "world size must be positive on every axis, got {:?}",
            size
        );

        let volume = (size.x * size.y * size.z) as usize;
        let mut chunks = Vec::with_capacity(volume);
        for z in 0..size.z {
            for y in 0..size.y {
                for x in 0..size.x {
                    chunks.push(Chunk::new(Point3::new(x, y, z)));
                }
            }
        }

        World {
            size,
            chunks,
            dirty: Vec::new(),
        }
    }

    /// The extent of the chunk grid, in chunks per axis.
    pub fn size(&self) -> Vector3<i32> {
        self.size
    }

    /// Returns whether `chunk_coord` lies within the chunk grid.
    pub fn chunk_in_bounds(&self, chunk_coord: Point3<i32>) -> bool {
        chunk_coord.x >= 0
            && chunk_coord.y >= 0
            && chunk_coord.z >= 0
            && chunk_coord.x < self.size.x
            && chunk_coord.y < self.size.y
            && chunk_coord.z < self.size.z
    }

    fn chunk_index(&self, chunk_coord: Point3<i32>) -> usize {
        debug_assert!(self.chunk_in_bounds(chunk_coord));
        (chunk_coord.x + self.size.x * (chunk_coord.y + self.size.y * chunk_coord.z)) as usize
    }

    fn checked_chunk_index(&self, chunk_coord: Point3<i32>) -> Option<usize> {
        if !self.chunk_in_bounds(chunk_coord) {
            return None;
        }

        Some(self.chunk_index(chunk_coord))
    }

    /// Returns the chunk at `chunk_coord`, or `None` outside the grid.
    pub fn get_chunk(&self, chunk_coord: Point3<i32>) -> Option<&Chunk> {
        self.checked_chunk_index(chunk_coord)
            .map(|index| &self.chunks[index])
    }

    /// Mutable variant of [`get_chunk`](Self::get_chunk).
    pub fn get_chunk_mut(&mut self, chunk_coord: Point3<i32>) -> Option<&mut Chunk> {
        self.checked_chunk_index(chunk_coord)
            .map(|index| &mut self.chunks[index])
    }

    /// Returns the chunk at `chunk_coord` without a bounds check.
    ///
    /// Callers must have validated `chunk_coord` already; this is used on the
    /// hot meshing path.
    pub fn get_chunk_unchecked(&self, chunk_coord: Point3<i32>) -> &Chunk {
        &self.chunks[self.chunk_index(chunk_coord)]
    }

    /// Maps a global block position to the coordinate of its owning chunk.
    pub fn chunk_coord_of(position: Point3<i32>) -> Point3<i32> {
        Point3::new(
            position.x.div_euclid(CHUNK_SIZE),
            position.y.div_euclid(CHUNK_SIZE),
            position.z.div_euclid(CHUNK_SIZE),
        )
    }

    /// Maps a global block position to its chunk-local coordinate.
    /// The Euclidean remainder keeps every component in `[0, CHUNK_SIZE)`,
    /// including for negative positions.
    pub fn local_coord_of(position: Point3<i32>) -> Point3<i32> {
        Point3::new(
            position.x.rem_euclid(CHUNK_SIZE),
            position.y.rem_euclid(CHUNK_SIZE),
            position.z.rem_euclid(CHUNK_SIZE),
        )
    }

    /// Reads the block at a global position.
    ///
    /// Positions whose chunk lies outside the grid resolve to
    /// [`OUT_OF_BOUNDS_BLOCK`]; this never panics.
    pub fn get_block(&self, position: Point3<i32>) -> BlockType {
        let chunk_coord = Self::chunk_coord_of(position);
        if !self.chunk_in_bounds(chunk_coord) {
            return OUT_OF_BOUNDS_BLOCK;
        }

        self.get_chunk_unchecked(chunk_coord)
            .get_block_unchecked(Self::local_coord_of(position))
    }

    /// Writes the block at a global position and marks the affected chunks
    /// dirty.
    ///
    /// A no-op if the position falls outside the world or if `new_block`
    /// matches the existing value (so redundant edits never trigger a
    /// remesh). An edit on a chunk face additionally dirties the face-adjacent
    /// neighbor on that axis, since the neighbor's mesh depends on this
    /// chunk's boundary blocks.
    pub fn set_block(&mut self, position: Point3<i32>, new_block: BlockType) {
        let chunk_coord = Self::chunk_coord_of(position);
        let Some(chunk_index) = self.checked_chunk_index(chunk_coord) else {
            return;
        };

        let local = Self::local_coord_of(position);
        let chunk = &mut self.chunks[chunk_index];

        if chunk.get_block_unchecked(local) == new_block {
            return;
        }

        chunk.set_block_unchecked(local, new_block);
        self.mark_dirty(chunk_index);

        // Indexed by Direction: +x, +y, +z, -x, -y, -z.
        let affected_neighbors = [
            local.x == CHUNK_SIZE - 1,
            local.y == CHUNK_SIZE - 1,
            local.z == CHUNK_SIZE - 1,
            local.x == 0,
            local.y == 0,
            local.z == 0,
        ];

        for direction in Direction::all() {
            if !affected_neighbors[direction as usize] {
                continue;
            }

            let neighbor_coord = chunk_coord + direction.to_vector();
            if let Some(neighbor_index) = self.checked_chunk_index(neighbor_coord) {
                self.mark_dirty(neighbor_index);
            }
        }
    }

    fn mark_dirty(&mut self, chunk_index: usize) {
        let chunk = &mut self.chunks[chunk_index];
        if chunk.in_dirty_list {
            return;
        }

        chunk.in_dirty_list = true;
        debug_assert!(self.dirty.len() < self.chunks.len());
        self.dirty.push(chunk_index);
    }

    /// Enqueues the chunk at `chunk_coord` for remeshing. Idempotent; a no-op
    /// for coordinates outside the grid or chunks already enqueued.
    pub fn push_dirty(&mut self, chunk_coord: Point3<i32>) {
        if let Some(chunk_index) = self.checked_chunk_index(chunk_coord) {
            self.mark_dirty(chunk_index);
        }
    }

    /// Removes and returns the coordinate of the dirty chunk closest to
    /// `viewer_chunk` (squared distance in chunk-grid units, ties broken by
    /// insertion order), or `None` when the queue is empty.
    pub fn pop_dirty(&mut self, viewer_chunk: Point3<i32>) -> Option<Point3<i32>> {
        if self.dirty.is_empty() {
            return None;
        }

        let mut closest_slot = 0;
        let mut min_distance = i32::MAX;
        for (slot, &chunk_index) in self.dirty.iter().enumerate() {
            let delta = viewer_chunk - self.chunks[chunk_index].coord;
            let distance = delta.x * delta.x + delta.y * delta.y + delta.z * delta.z;
            if distance < min_distance {
                min_distance = distance;
                closest_slot = slot;
            }
        }

        let chunk_index = self.dirty.swap_remove(closest_slot);
        let chunk = &mut self.chunks[chunk_index];
        chunk.in_dirty_list = false;
        trace!(
            "popped dirty chunk {:?} ({} remaining)",
            chunk.coord,
            self.dirty.len()
        );
        Some(chunk.coord)
    }

    /// The number of chunks currently awaiting a remesh.
    pub fn dirty_len(&self) -> usize {
        self.dirty.len()
    }

    /// Casts a ray through the block grid and returns the first non-air cell
    /// it enters, walking cell boundaries with a 3-D DDA.
    ///
    /// `None` means no block was found within [`MAX_RAYCAST_STEPS`] traversed
    /// cells, not an error. The starting cell itself is not tested; the walk
    /// begins with the first boundary crossing.
    pub fn raycast(&self, origin: Point3<f32>, direction: Vector3<f32>) -> Option<RayHit> {
        let mut cell = Point3::new(
            origin.x.floor() as i32,
            origin.y.floor() as i32,
            origin.z.floor() as i32,
        );

        let delta_dist = Vector3::new(
            (1.0 / direction.x).abs(),
            (1.0 / direction.y).abs(),
            (1.0 / direction.z).abs(),
        );

        let step = Vector3::new(
            if direction.x > 0.0 { 1 } else { -1 },
            if direction.y > 0.0 { 1 } else { -1 },
            if direction.z > 0.0 { 1 } else { -1 },
        );

        let mut side_dist = Vector3::new(
            if direction.x > 0.0 {
                (cell.x as f32 + 1.0 - origin.x) * delta_dist.x
            } else {
                (origin.x - cell.x as f32) * delta_dist.x
            },
            if direction.y > 0.0 {
                (cell.y as f32 + 1.0 - origin.y) * delta_dist.y
            } else {
                (origin.y - cell.y as f32) * delta_dist.y
            },
            if direction.z > 0.0 {
                (cell.z as f32 + 1.0 - origin.z) * delta_dist.z
            } else {
                (origin.z - cell.z as f32) * delta_dist.z
            },
        );

        for _ in 0..MAX_RAYCAST_STEPS {
            let entered_through;
            if side_dist.x < side_dist.y && side_dist.x < side_dist.z {
                cell.x += step.x;
                side_dist.x += delta_dist.x;
                entered_through = if step.x < 0 {
                    Direction::PositiveX
                } else {
                    Direction::NegativeX
                };
            } else if side_dist.y < side_dist.z {
                cell.y += step.y;
                side_dist.y += delta_dist.y;
                entered_through = if step.y < 0 {
                    Direction::PositiveY
                } else {
                    Direction::NegativeY
                };
            } else {
                cell.z += step.z;
                side_dist.z += delta_dist.z;
                entered_through = if step.z < 0 {
                    Direction::PositiveZ
                } else {
                    Direction::NegativeZ
                };
            }

            if self.get_block(cell) != BlockType::Air {
                return Some(RayHit {
                    position: cell,
                    normal: entered_through.to_vector(),
                });
            }
        }

        None
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
