//! # Meshing Module
//!
//! Converts a chunk's block neighborhood into a packed vertex sequence ready
//! for upload into the shared vertex buffer.
//!
//! The algorithm does per-block face culling: for every non-air block, each
//! of the six faces is emitted only if the block across that face is
//! transparent. Adjacent coplanar faces are *not* merged into larger quads.
//! Each emitted face contributes exactly four vertices in a fixed
//! per-direction winding order, triangulated by the static `{0,1,3,1,2,3}`
//! index pattern, so one precomputed worst-case index buffer serves every
//! chunk through a base-vertex draw offset.
//!
//! Each face corner additionally samples three neighboring cells to compute
//! a per-vertex ambient occlusion level, giving soft corner shading without
//! a global illumination pass.

use cgmath::{Point3, Vector3};

use crate::voxels::block::{BlockType, Direction, TextureId};
use crate::voxels::chunk::{CHUNK_SIZE, CHUNK_VOLUME};

mod meshing_data;

pub use meshing_data::{MeshingData, MESHING_DATA_SIZE, MESHING_DATA_VOLUME, MESHING_HALO};

use super::vertex::PackedVertex;

/// The maximum number of quads a chunk could possibly produce. The worst
/// case is a 3-D checkerboard, where half the blocks have all six faces
/// exposed.
pub const MAX_QUADS: usize = (CHUNK_VOLUME / 2) * 6;
/// The maximum number of vertices a single chunk mesh can hold.
pub const MAX_VERTICES: usize = MAX_QUADS * 4;
/// The number of indices in the shared worst-case index buffer.
pub const MAX_INDICES: usize = MAX_QUADS * 6;

/// Index pattern triangulating one quad, relative to its first vertex.
pub const QUAD_INDEX_PATTERN: [u32; 6] = [0, 1, 3, 1, 2, 3];

/// The four corner offsets of each face, indexed by direction. The winding
/// is consistent with [`QUAD_INDEX_PATTERN`], front faces wound
/// counter-clockwise.
const FACE_VERTICES: [[[i32; 3]; 4]; 6] = [
    // +x
    [[1, 0, 0], [1, 1, 0], [1, 1, 1], [1, 0, 1]],
    // +y
    [[1, 1, 1], [1, 1, 0], [0, 1, 0], [0, 1, 1]],
    // +z
    [[0, 0, 1], [1, 0, 1], [1, 1, 1], [0, 1, 1]],
    // -x
    [[0, 0, 1], [0, 1, 1], [0, 1, 0], [0, 0, 0]],
    // -y
    [[0, 0, 1], [0, 0, 0], [1, 0, 0], [1, 0, 1]],
    // -z
    [[0, 1, 0], [1, 1, 0], [1, 0, 0], [0, 0, 0]],
];

/// Precalculated ambient-occlusion sample offsets. Each corner of each face
/// samples two "side" cells and one "corner" cell, in that order.
const AO_OFFSETS: [[[[i32; 3]; 3]; 4]; 6] = [
    // +x
    [
        [[1, 0, -1], [1, -1, 0], [1, -1, -1]],
        [[1, 1, 0], [1, 0, -1], [1, 1, -1]],
        [[1, 0, 1], [1, 1, 0], [1, 1, 1]],
        [[1, -1, 0], [1, 0, 1], [1, -1, 1]],
    ],
    // +y
    [
        [[1, 1, 0], [0, 1, 1], [1, 1, 1]],
        [[0, 1, -1], [1, 1, 0], [1, 1, -1]],
        [[-1, 1, 0], [0, 1, -1], [-1, 1, -1]],
        [[0, 1, 1], [-1, 1, 0], [-1, 1, 1]],
    ],
    // +z
    [
        [[0, -1, 1], [-1, 0, 1], [-1, -1, 1]],
        [[1, 0, 1], [0, -1, 1], [1, -1, 1]],
        [[0, 1, 1], [1, 0, 1], [1, 1, 1]],
        [[-1, 0, 1], [0, 1, 1], [-1, 1, 1]],
    ],
    // -x
    [
        [[-1, 0, 1], [-1, -1, 0], [-1, -1, 1]],
        [[-1, 1, 0], [-1, 0, 1], [-1, 1, 1]],
        [[-1, 0, -1], [-1, 1, 0], [-1, 1, -1]],
        [[-1, -1, 0], [-1, 0, -1], [-1, -1, -1]],
    ],
    // -y
    [
        [[-1, -1, 0], [0, -1, 1], [-1, -1, 1]],
        [[0, -1, -1], [-1, -1, 0], [-1, -1, -1]],
        [[1, -1, 0], [0, -1, -1], [1, -1, -1]],
        [[0, -1, 1], [1, -1, 0], [1, -1, 1]],
    ],
    // -z
    [
        [[0, 1, -1], [-1, 0, -1], [-1, 1, -1]],
        [[1, 0, -1], [0, 1, -1], [1, 1, -1]],
        [[0, -1, -1], [1, 0, -1], [1, -1, -1]],
        [[-1, 0, -1], [0, -1, -1], [-1, -1, -1]],
    ],
];

/// Computes the occlusion level of one face corner from the opacity of its
/// three neighboring cells. Higher is brighter: 3 means unoccluded, 0 fully
/// occluded. When both side cells are opaque the corner cell cannot be seen,
/// so the level is 0 regardless of it.
fn vertex_ao(side_1_opaque: bool, side_2_opaque: bool, corner_opaque: bool) -> u8 {
    if side_1_opaque && side_2_opaque {
        return 0;
    }

    3 - (side_1_opaque as u8 + side_2_opaque as u8 + corner_opaque as u8)
}

struct Mesher {
    vertices: Vec<PackedVertex>,
}

impl Mesher {
    fn push_vertex(&mut self, position: Point3<i32>, direction: Direction, texture: TextureId, ao: u8) {
        debug_assert!(self.vertices.len() < MAX_VERTICES);
        self.vertices
            .push(PackedVertex::pack(position, direction, ao, texture));
    }

    fn emit_face(
        &mut self,
        data: &MeshingData,
        position: Point3<i32>,
        direction: Direction,
        texture: TextureId,
    ) {
        for corner in 0..4 {
            let [side_1, side_2, corner_cell] = AO_OFFSETS[direction as usize][corner];

            let side_1_opaque = !data.is_transparent(position + Vector3::from(side_1));
            let side_2_opaque = !data.is_transparent(position + Vector3::from(side_2));
            let corner_opaque = !data.is_transparent(position + Vector3::from(corner_cell));

            let ao = vertex_ao(side_1_opaque, side_2_opaque, corner_opaque);
            let offset = FACE_VERTICES[direction as usize][corner];
            self.push_vertex(position + Vector3::from(offset), direction, texture, ao);
        }
    }

    fn mesh_block(&mut self, data: &MeshingData, block: BlockType, position: Point3<i32>) {
        for direction in Direction::all() {
            let neighbor = position + direction.to_vector();
            if data.is_transparent(neighbor) {
                self.emit_face(data, position, direction, block.face_texture(direction));
            }
        }
    }
}

/// Triangulates a chunk neighborhood into a packed vertex sequence.
///
/// Pure and deterministic: the same neighborhood always yields the same
/// vertex sequence. Blocks are visited in index order (x innermost, then y,
/// then z) with faces in direction order.
pub fn mesh_chunk(data: &MeshingData) -> Vec<PackedVertex> {
    let mut mesher = Mesher {
        vertices: Vec::new(),
    };

    for z in 0..CHUNK_SIZE {
        for y in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let position = Point3::new(x, y, z);
                let block = data.block(position);
                if block != BlockType::Air {
                    mesher.mesh_block(data, block, position);
                }
            }
        }
    }

    mesher.vertices
}

/// Builds the shared worst-case index buffer.
///
/// The pattern repeats [`QUAD_INDEX_PATTERN`] for every quad, so a single
/// static buffer sized for [`MAX_QUADS`] serves every chunk draw call via its
/// base-vertex offset.
pub fn generate_index_buffer() -> Vec<u32> {
    let mut buffer = Vec::with_capacity(MAX_INDICES);
    for i in 0..MAX_INDICES as u32 {
        buffer.push((i / 6) * 4 + QUAD_INDEX_PATTERN[i as usize % 6]);
    }

    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_block_data(block: BlockType) -> MeshingData {
        let mut data = MeshingData::empty();
        data.set_block(Point3::new(0, 0, 0), block);
        data
    }

    #[test]
    fn isolated_block_emits_six_faces() {
        let vertices = mesh_chunk(&single_block_data(BlockType::Dirt));
        assert_eq!(vertices.len(), 24);

        // Nothing occludes a lone block, so every corner is fully lit.
        assert!(vertices.iter().all(|v| v.ao() == 3));

        let mut directions: Vec<u8> = vertices.iter().map(|v| v.direction_index()).collect();
        directions.dedup();
        assert_eq!(directions.len(), 6);
    }

    #[test]
    fn adjacent_blocks_cull_their_shared_faces() {
        let mut data = single_block_data(BlockType::Dirt);
        data.set_block(Point3::new(1, 0, 0), BlockType::Dirt);

        // Two cubes share one interior face: 48 vertices minus the two
        // culled faces' 8, leaving 10 faces (20 triangles).
        let vertices = mesh_chunk(&data);
        assert_eq!(vertices.len(), 40);
    }

    #[test]
    fn fully_solid_neighborhood_emits_nothing() {
        let mut data = MeshingData::empty();
        for z in -MESHING_HALO..CHUNK_SIZE + MESHING_HALO {
            for y in -MESHING_HALO..CHUNK_SIZE + MESHING_HALO {
                for x in -MESHING_HALO..CHUNK_SIZE + MESHING_HALO {
                    data.set_block(Point3::new(x, y, z), BlockType::Stone);
                }
            }
        }

        // Every block's six neighbors are opaque, including across the
        // chunk boundary, so every face is culled.
        assert!(mesh_chunk(&data).is_empty());
    }

    #[test]
    fn meshing_is_deterministic() {
        let mut data = MeshingData::empty();
        let mut rng = fastrand::Rng::with_seed(21);
        for _ in 0..500 {
            let position = Point3::new(
                rng.i32(0..CHUNK_SIZE),
                rng.i32(0..CHUNK_SIZE),
                rng.i32(0..CHUNK_SIZE),
            );
            data.set_block(position, BlockType::random_solid(&mut rng));
        }

        let first = mesh_chunk(&data);
        let second = mesh_chunk(&data);
        assert_eq!(first, second);
    }

    #[test]
    fn checkerboard_stays_within_the_worst_case_bound() {
        let mut data = MeshingData::empty();
        for z in 0..CHUNK_SIZE {
            for y in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    if (x + y + z) % 2 == 0 {
                        data.set_block(Point3::new(x, y, z), BlockType::Stone);
                    }
                }
            }
        }

        let vertices = mesh_chunk(&data);
        assert_eq!(vertices.len(), MAX_VERTICES);
    }

    #[test]
    fn a_neighbor_above_darkens_the_corners_it_touches() {
        let mut data = single_block_data(BlockType::Dirt);
        data.set_block(Point3::new(1, 1, 0), BlockType::Dirt);

        // On the origin block's top face, the two corners at x == 1 sample
        // the diagonal neighbor as a side cell and drop to occlusion 2; the
        // far corners stay unoccluded.
        let top_face: Vec<_> = vertices_of_face(&data, Direction::PositiveY, 1);
        assert_eq!(top_face.len(), 4);
        for vertex in top_face {
            let expected = if vertex.x() == 1 { 2 } else { 3 };
            assert_eq!(vertex.ao(), expected, "corner {:?}", vertex.position());
        }
    }

    fn vertices_of_face(data: &MeshingData, direction: Direction, plane_y: i32) -> Vec<PackedVertex> {
        mesh_chunk(data)
            .into_iter()
            .filter(|v| v.direction_index() == direction as u8 && v.y() == plane_y)
            .collect()
    }

    #[test]
    fn index_buffer_repeats_the_quad_pattern() {
        let buffer = generate_index_buffer();
        assert_eq!(buffer.len(), MAX_INDICES);
        assert_eq!(&buffer[0..6], &[0, 1, 3, 1, 2, 3]);
        assert_eq!(&buffer[6..12], &[4, 5, 7, 5, 6, 7]);
    }
}
