//! # Mesh Store Module
//!
//! Ties the dirty-chunk queue, the mesher, and the range allocator together:
//! the store pops the chunks whose meshes are stale, remeshes them, and packs
//! the resulting vertex runs into one shared vertex buffer. Each remesh
//! yields a [`MeshUpload`] describing which buffer range to overwrite, so the
//! render loop only ever issues targeted writes instead of re-uploading the
//! world.

use cgmath::Point3;
use log::debug;
use thiserror::Error;

use crate::voxels::world::World;

use super::meshing::{mesh_chunk, MeshingData, MAX_VERTICES};
use super::range_allocator::{Range, RangeAllocError, RangeAllocator};
use super::vertex::PackedVertex;

/// Default number of chunks remeshed per frame.
///
/// Worst-case chunks mesh in the low milliseconds, so two per frame keeps
/// the frame budget intact while still draining a freshly generated world in
/// a few seconds.
pub const DEFAULT_REMESH_BUDGET: usize = 2;

/// One pending write into the shared vertex buffer.
#[derive(Clone, Debug)]
pub struct MeshUpload {
    /// The chunk this mesh belongs to, in chunk-grid coordinates.
    pub chunk_coord: Point3<i32>,
    /// Destination range in the shared buffer, in vertices.
    pub range: Range,
    /// The packed vertices to write. Always exactly `range.size` long.
    pub vertices: Vec<PackedVertex>,
}

impl MeshUpload {
    /// The destination offset in bytes, for writing into the raw buffer.
    pub fn byte_offset(&self) -> u64 {
        self.range.start as u64 * std::mem::size_of::<PackedVertex>() as u64
    }
}

/// Failures surfaced by a single chunk remesh.
#[derive(Debug, Error)]
pub enum MeshStoreError {
    /// The shared vertex buffer could not fit a chunk's mesh. The chunk's
    /// previous range has already been released; its mesh handle is empty.
    #[error("vertex buffer allocation failed: {0}")]
    Alloc(#[from] RangeAllocError),

    /// A remesh was requested for a chunk outside the world grid.
    #[error("chunk {0:?} is outside the world")]
    ChunkOutOfBounds(Point3<i32>),
}

/// A budgeted remesh pass that stopped partway through.
///
/// The uploads completed before the failure are still valid: their ranges
/// are resident in the shared buffer and the caller must write them as
/// usual. The failing chunk has been returned to the dirty queue, so a
/// later pass retries it once the caller has made room.
#[derive(Debug, Error)]
#[error(
    "remeshing chunk {chunk_coord:?} failed after {} completed uploads: {source}",
    .uploads.len()
)]
pub struct InterruptedPass {
    /// The chunk whose remesh failed, back in the dirty queue.
    pub chunk_coord: Point3<i32>,
    /// Uploads completed before the failure, which must still be written.
    pub uploads: Vec<MeshUpload>,
    /// The underlying failure.
    #[source]
    pub source: MeshStoreError,
}

/// Owns the vertex-buffer space of every chunk mesh.
pub struct MeshStore {
    allocator: RangeAllocator,
}

impl MeshStore {
    /// Creates a store managing a shared buffer of `vertex_capacity` packed
    /// vertices.
    ///
    /// # Panics
    /// Panics if the capacity cannot hold even one worst-case chunk mesh.
    pub fn new(vertex_capacity: u32) -> Self {
        assert!(
            vertex_capacity as usize >= MAX_VERTICES,
            "capacity {} cannot hold a worst-case chunk mesh of {} vertices",
            vertex_capacity,
            MAX_VERTICES
        );

        MeshStore {
            allocator: RangeAllocator::new(vertex_capacity),
        }
    }

    /// Number of vertices currently resident in the shared buffer.
    pub fn used_vertices(&self) -> u32 {
        self.allocator.used()
    }

    /// Remeshes the chunk at `chunk_coord` and reassigns its buffer range.
    ///
    /// Returns the upload the render loop must perform, or `Ok(None)` when
    /// the chunk has no visible geometry and therefore nothing to write.
    /// When the new mesh happens to be exactly the old mesh's size, the
    /// chunk keeps its range and the upload overwrites it in place.
    pub fn remesh_chunk(
        &mut self,
        world: &mut World,
        chunk_coord: Point3<i32>,
    ) -> Result<Option<MeshUpload>, MeshStoreError> {
        if !world.chunk_in_bounds(chunk_coord) {
            return Err(MeshStoreError::ChunkOutOfBounds(chunk_coord));
        }

        let data = MeshingData::gather(world, chunk_coord);
        let vertices = mesh_chunk(&data);
        let new_size = vertices.len() as u32;

        let chunk = world
            .get_chunk_mut(chunk_coord)
            .expect("chunk bounds checked above");

        if new_size == chunk.mesh.size {
            // Same size, so the existing range (or lack of one) still fits.
            if new_size == 0 {
                return Ok(None);
            }

            debug!(
                "remeshed chunk {:?} in place ({} vertices at {})",
                chunk_coord, new_size, chunk.mesh.start
            );
            return Ok(Some(MeshUpload {
                chunk_coord,
                range: chunk.mesh,
                vertices,
            }));
        }

        if chunk.mesh.size > 0 {
            let old = chunk.mesh;
            chunk.mesh = Range::default();
            self.allocator.free(old)?;
        }

        if new_size == 0 {
            debug!("remeshed chunk {:?} to empty", chunk_coord);
            return Ok(None);
        }

        let range = self.allocator.alloc(new_size)?;
        world
            .get_chunk_mut(chunk_coord)
            .expect("chunk bounds checked above")
            .mesh = range;

        debug!(
            "remeshed chunk {:?} ({} vertices at {}, {}/{} used)",
            chunk_coord,
            new_size,
            range.start,
            self.allocator.used(),
            self.allocator.capacity()
        );
        Ok(Some(MeshUpload {
            chunk_coord,
            range,
            vertices,
        }))
    }

    /// Drains up to `budget` chunks from the world's dirty queue, nearest to
    /// `viewer_chunk` first, and remeshes each.
    ///
    /// Chunks that mesh to nothing consume budget but produce no upload, so
    /// the returned vector can be shorter than the number of chunks
    /// processed. A failing remesh ends the pass early; the error carries
    /// the uploads that already completed (their buffer ranges are live and
    /// must be written) and the failed chunk goes back into the dirty queue.
    pub fn process_dirty_chunks(
        &mut self,
        world: &mut World,
        viewer_chunk: Point3<i32>,
        budget: usize,
    ) -> Result<Vec<MeshUpload>, InterruptedPass> {
        let mut uploads = Vec::new();
        for _ in 0..budget {
            let Some(chunk_coord) = world.pop_dirty(viewer_chunk) else {
                break;
            };

            match self.remesh_chunk(world, chunk_coord) {
                Ok(Some(upload)) => uploads.push(upload),
                Ok(None) => {}
                Err(source) => {
                    // The chunk still needs its remesh once the caller has
                    // made room.
                    world.push_dirty(chunk_coord);
                    return Err(InterruptedPass {
                        chunk_coord,
                        uploads,
                        source,
                    });
                }
            }
        }

        Ok(uploads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxels::block::BlockType;
    use cgmath::Vector3;

    fn store() -> MeshStore {
        MeshStore::new(MAX_VERTICES as u32 * 4)
    }

    #[test]
    fn remeshing_an_empty_chunk_yields_no_upload() {
        let mut world = World::with_size(Vector3::new(1, 1, 1));
        let result = store().remesh_chunk(&mut world, Point3::new(0, 0, 0)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn remeshing_records_the_range_on_the_chunk() {
        let mut world = World::with_size(Vector3::new(1, 1, 1));
        let mut store = store();
        world.set_block(Point3::new(4, 4, 4), BlockType::Stone);

        let upload = store
            .remesh_chunk(&mut world, Point3::new(0, 0, 0))
            .unwrap()
            .expect("one block must produce geometry");

        assert_eq!(upload.range.size, 24);
        assert_eq!(upload.vertices.len(), 24);
        assert_eq!(world.get_chunk(Point3::new(0, 0, 0)).unwrap().mesh, upload.range);
        assert_eq!(store.used_vertices(), 24);
    }

    #[test]
    fn clearing_a_chunk_releases_its_range() {
        let mut world = World::with_size(Vector3::new(1, 1, 1));
        let mut store = store();
        let coord = Point3::new(0, 0, 0);

        world.set_block(Point3::new(4, 4, 4), BlockType::Stone);
        store.remesh_chunk(&mut world, coord).unwrap();

        world.set_block(Point3::new(4, 4, 4), BlockType::Air);
        let result = store.remesh_chunk(&mut world, coord).unwrap();

        assert!(result.is_none());
        assert_eq!(world.get_chunk(coord).unwrap().mesh, Range::default());
        assert_eq!(store.used_vertices(), 0);
    }

    #[test]
    fn same_size_remesh_reuses_the_range_in_place() {
        let mut world = World::with_size(Vector3::new(1, 1, 1));
        let mut store = store();
        let coord = Point3::new(0, 0, 0);

        world.set_block(Point3::new(4, 4, 4), BlockType::Stone);
        let first = store.remesh_chunk(&mut world, coord).unwrap().unwrap();

        // Moving the lone block changes the vertices but not their count.
        world.set_block(Point3::new(4, 4, 4), BlockType::Air);
        world.set_block(Point3::new(10, 10, 10), BlockType::Dirt);
        let second = store.remesh_chunk(&mut world, coord).unwrap().unwrap();

        assert_eq!(second.range, first.range);
        assert_ne!(second.vertices, first.vertices);
        assert_eq!(store.used_vertices(), 24);
    }

    #[test]
    fn processing_respects_the_budget_and_viewer_distance() {
        let mut world = World::with_size(Vector3::new(3, 1, 1));
        let mut store = store();

        world.set_block(Point3::new(4, 4, 4), BlockType::Stone);
        world.set_block(Point3::new(40, 4, 4), BlockType::Stone);
        world.set_block(Point3::new(72, 4, 4), BlockType::Stone);
        assert_eq!(world.dirty_len(), 3);

        let viewer = Point3::new(2, 0, 0);
        let uploads = store.process_dirty_chunks(&mut world, viewer, 2).unwrap();

        assert_eq!(uploads.len(), 2);
        assert_eq!(uploads[0].chunk_coord, Point3::new(2, 0, 0));
        assert_eq!(uploads[1].chunk_coord, Point3::new(1, 0, 0));
        assert_eq!(world.dirty_len(), 1);
    }

    #[test]
    fn mid_pass_allocation_failure_keeps_completed_uploads_and_requeues() {
        let mut world = World::with_size(Vector3::new(2, 1, 1));
        let mut store = MeshStore::new(MAX_VERTICES as u32);

        // Both chunks mesh to the worst case; only one fits the buffer.
        crate::voxels::generation::generate_checkerboard(&mut world, BlockType::Stone);
        assert_eq!(world.dirty_len(), 2);

        let viewer = Point3::new(0, 0, 0);
        let error = store
            .process_dirty_chunks(&mut world, viewer, 2)
            .unwrap_err();
        assert!(matches!(
            error.source,
            MeshStoreError::Alloc(RangeAllocError::OutOfCapacity { .. })
        ));

        // The first chunk's upload rides along in the error; its range is
        // resident, so dropping it would leave the buffer undrawn garbage.
        assert_eq!(error.uploads.len(), 1);
        assert_eq!(error.uploads[0].chunk_coord, Point3::new(0, 0, 0));
        assert_eq!(store.used_vertices(), MAX_VERTICES as u32);
        assert_eq!(
            world.get_chunk(Point3::new(0, 0, 0)).unwrap().mesh,
            error.uploads[0].range
        );

        // The failed chunk went back into the queue for a retry.
        assert_eq!(error.chunk_coord, Point3::new(1, 0, 0));
        assert_eq!(world.dirty_len(), 1);
        assert_eq!(world.pop_dirty(viewer), Some(Point3::new(1, 0, 0)));
    }

    #[test]
    fn out_of_world_chunk_is_an_error() {
        let mut world = World::with_size(Vector3::new(1, 1, 1));
        let result = store().remesh_chunk(&mut world, Point3::new(5, 0, 0));
        assert!(matches!(result, Err(MeshStoreError::ChunkOutOfBounds(_))));
    }
}
