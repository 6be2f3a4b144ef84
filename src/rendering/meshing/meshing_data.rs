//! Padded block neighborhood used as the meshing input.
//!
//! Face visibility and ambient occlusion both sample blocks up to one cell
//! beyond the chunk being meshed, so the mesher never reads the live world
//! directly. Instead the neighborhood is gathered into a scratch cube first:
//! the chunk's own blocks through the unchecked accessor, the halo through
//! the bounds-safe world read (which resolves space beyond the world to air).

use cgmath::Point3;

use crate::voxels::block::BlockType;
use crate::voxels::chunk::{Chunk, CHUNK_SIZE};
use crate::voxels::world::World;

/// Width of the halo of neighboring blocks gathered around the chunk. Both
/// the scratch cube size and the sampling range of the ambient-occlusion
/// tables derive from this.
pub const MESHING_HALO: i32 = 1;
/// Edge length of the scratch cube.
pub const MESHING_DATA_SIZE: usize = (CHUNK_SIZE + 2 * MESHING_HALO) as usize;
/// Total number of blocks in the scratch cube.
pub const MESHING_DATA_VOLUME: usize =
    MESHING_DATA_SIZE * MESHING_DATA_SIZE * MESHING_DATA_SIZE;

/// A chunk's blocks plus a halo of its neighbors, addressed in chunk-local
/// coordinates from `-MESHING_HALO` to `CHUNK_SIZE + MESHING_HALO`.
pub struct MeshingData {
    blocks: Vec<BlockType>,
}

impl MeshingData {
    /// An all-air neighborhood, mainly useful for building meshing inputs by
    /// hand.
    pub fn empty() -> Self {
        MeshingData {
            blocks: vec![BlockType::Air; MESHING_DATA_VOLUME],
        }
    }

    /// Copies the chunk at `chunk_coord` and its halo out of the world.
    ///
    /// Halo cells beyond the world extent resolve to the out-of-bounds
    /// sentinel, so chunk faces on the world edge are treated as exposed.
    ///
    /// # Panics
    /// `chunk_coord` must lie within the world grid.
    pub fn gather(world: &World, chunk_coord: Point3<i32>) -> Self {
        assert!(
            world.chunk_in_bounds(chunk_coord),
            "cannot gather meshing data for out-of-world chunk {:?}",
            chunk_coord
        );

        let chunk = world.get_chunk_unchecked(chunk_coord);
        let origin = Point3::new(
            chunk_coord.x * CHUNK_SIZE,
            chunk_coord.y * CHUNK_SIZE,
            chunk_coord.z * CHUNK_SIZE,
        );

        let mut data = Self::empty();
        for z in -MESHING_HALO..CHUNK_SIZE + MESHING_HALO {
            for y in -MESHING_HALO..CHUNK_SIZE + MESHING_HALO {
                for x in -MESHING_HALO..CHUNK_SIZE + MESHING_HALO {
                    let local = Point3::new(x, y, z);
                    let block = if Chunk::in_chunk_bounds(local) {
                        chunk.get_block_unchecked(local)
                    } else {
                        world.get_block(Point3::new(
                            origin.x + x,
                            origin.y + y,
                            origin.z + z,
                        ))
                    };
                    data.blocks[Self::data_index(local)] = block;
                }
            }
        }

        data
    }

    fn data_index(local: Point3<i32>) -> usize {
        debug_assert!(
            (-MESHING_HALO..CHUNK_SIZE + MESHING_HALO).contains(&local.x)
                && (-MESHING_HALO..CHUNK_SIZE + MESHING_HALO).contains(&local.y)
                && (-MESHING_HALO..CHUNK_SIZE + MESHING_HALO).contains(&local.z),
            "coordinate {:?} outside the meshing halo",
            local
        );
        let size = MESHING_DATA_SIZE as i32;
        let x = local.x + MESHING_HALO;
        let y = local.y + MESHING_HALO;
        let z = local.z + MESHING_HALO;
        (x + size * (y + size * z)) as usize
    }

    /// Reads the block at a chunk-local coordinate, which may reach
    /// `MESHING_HALO` cells beyond the chunk on every side.
    pub fn block(&self, local: Point3<i32>) -> BlockType {
        self.blocks[Self::data_index(local)]
    }

    /// Whether the block at `local` lets adjacent faces show through.
    pub fn is_transparent(&self, local: Point3<i32>) -> bool {
        self.block(local).is_transparent()
    }

    /// Writes a block into the scratch cube, for meshing inputs built
    /// without a world.
    pub fn set_block(&mut self, local: Point3<i32>, block: BlockType) {
        self.blocks[Self::data_index(local)] = block;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    #[test]
    fn gather_includes_the_neighbor_chunk_boundary() {
        let mut world = World::with_size(Vector3::new(2, 1, 1));
        world.set_block(Point3::new(CHUNK_SIZE, 5, 5), BlockType::Brick);

        let data = MeshingData::gather(&world, Point3::new(0, 0, 0));
        assert_eq!(data.block(Point3::new(CHUNK_SIZE, 5, 5)), BlockType::Brick);
    }

    #[test]
    fn gather_treats_space_beyond_the_world_as_air() {
        let mut world = World::with_size(Vector3::new(1, 1, 1));
        world.set_block(Point3::new(0, 0, 0), BlockType::Dirt);

        let data = MeshingData::gather(&world, Point3::new(0, 0, 0));
        assert_eq!(data.block(Point3::new(-1, 0, 0)), BlockType::Air);
        assert_eq!(data.block(Point3::new(0, 0, 0)), BlockType::Dirt);
    }
}
