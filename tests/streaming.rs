//! End-to-end exercise of the streaming path: generate a world, drain the
//! dirty queue through the mesh store, then edit blocks and check that only
//! the affected meshes are rebuilt and that the shared buffer's bookkeeping
//! stays consistent throughout.

use cgmath::{Point3, Vector3};
use quadcraft::rendering::mesh_store::{MeshStore, MeshUpload};
use quadcraft::rendering::meshing::{generate_index_buffer, MAX_INDICES, MAX_VERTICES};
use quadcraft::voxels::block::BlockType;
use quadcraft::voxels::chunk::CHUNK_SIZE;
use quadcraft::voxels::generation;
use quadcraft::voxels::world::World;

const VIEWER: Point3<i32> = Point3::new(0, 0, 0);

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn drain(store: &mut MeshStore, world: &mut World) -> Vec<MeshUpload> {
    let mut uploads = Vec::new();
    while world.dirty_len() > 0 {
        uploads.extend(
            store
                .process_dirty_chunks(world, VIEWER, 4)
                .expect("buffer sized for the whole world"),
        );
    }
    uploads
}

#[test]
fn generated_world_streams_into_the_buffer_and_edits_restream_it() {
    init_logging();
    let mut world = World::with_size(Vector3::new(2, 1, 2));
    let mut store = MeshStore::new(MAX_VERTICES as u32 * 8);

    generation::generate_flat(&mut world, 8);
    assert_eq!(world.dirty_len(), 4);

    let uploads = drain(&mut store, &mut world);

    // Every chunk holds terrain, so every chunk produced an upload.
    assert_eq!(uploads.len(), 4);
    for upload in &uploads {
        assert_eq!(upload.range.size as usize, upload.vertices.len());
        assert_eq!(
            upload.byte_offset(),
            upload.range.start as u64 * std::mem::size_of::<u32>() as u64
        );
    }
    let resident: u32 = uploads.iter().map(|u| u.range.size).sum();
    assert_eq!(store.used_vertices(), resident);

    // Digging one block out of the ground dirties exactly one chunk; the
    // edit is interior to chunk (0,0,0).
    world.set_block(Point3::new(5, 7, 5), BlockType::Air);
    assert_eq!(world.dirty_len(), 1);

    let uploads = drain(&mut store, &mut world);
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].chunk_coord, Point3::new(0, 0, 0));

    // The hole exposes five new faces and removes the block's top face, so
    // the chunk's mesh grew and was reallocated.
    assert!(uploads[0].range.size > 0);
    assert_eq!(
        world.get_chunk(Point3::new(0, 0, 0)).unwrap().mesh,
        uploads[0].range
    );
}

#[test]
fn boundary_edit_restreams_both_touching_chunks() {
    init_logging();
    let mut world = World::with_size(Vector3::new(2, 1, 1));
    let mut store = MeshStore::new(MAX_VERTICES as u32 * 4);

    generation::generate_flat(&mut world, 8);
    drain(&mut store, &mut world);

    // An edit on the shared face of chunks (0,0,0) and (1,0,0).
    world.set_block(Point3::new(CHUNK_SIZE - 1, 7, 3), BlockType::Air);
    assert_eq!(world.dirty_len(), 2);

    let uploads = drain(&mut store, &mut world);
    let mut coords: Vec<_> = uploads.iter().map(|u| u.chunk_coord).collect();
    coords.sort_by_key(|c| c.x);
    assert_eq!(coords, vec![Point3::new(0, 0, 0), Point3::new(1, 0, 0)]);
}

#[test]
fn raycast_edit_cycle_places_a_block_against_the_hit_face() {
    init_logging();
    let mut world = World::with_size(Vector3::new(1, 1, 1));
    generation::generate_flat(&mut world, 8);

    let hit = world
        .raycast(Point3::new(10.5, 12.0, 10.5), Vector3::new(0.0, -1.0, 0.0))
        .expect("ray pointed at the ground");
    assert_eq!(hit.position, Point3::new(10, 7, 10));
    assert_eq!(hit.normal, Vector3::new(0, 1, 0));

    // Build against the face the ray entered through.
    world.set_block(hit.position + hit.normal, BlockType::Brick);
    assert_eq!(world.get_block(Point3::new(10, 8, 10)), BlockType::Brick);
}

#[test]
fn worst_case_world_fits_the_static_index_buffer() {
    init_logging();
    let mut world = World::with_size(Vector3::new(1, 1, 1));
    let mut store = MeshStore::new(MAX_VERTICES as u32);

    generation::generate_checkerboard(&mut world, BlockType::Stone);
    let uploads = drain(&mut store, &mut world);

    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].range.size as usize, MAX_VERTICES);

    // The shared index buffer covers the worst case: 6 indices per quad of
    // 4 vertices.
    let indices = generate_index_buffer();
    assert_eq!(indices.len(), MAX_INDICES);
    assert_eq!(indices.len(), uploads[0].vertices.len() / 4 * 6);
    assert!(indices.iter().all(|&i| (i as usize) < MAX_VERTICES));
}
