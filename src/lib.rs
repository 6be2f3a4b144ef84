#![warn(missing_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Quadcraft
//!
//! The CPU core of a chunked voxel renderer: block storage, dirty-chunk
//! tracking, face-culling mesh generation with ambient occlusion, and the
//! allocator that packs every chunk mesh into one shared vertex buffer.
//!
//! ## Key Modules
//!
//! * `voxels` - The block registry, chunk storage, world grid with its
//!   dirty-chunk queue and raycast, and world generation
//! * `rendering` - Vertex packing, the chunk mesher, and shared-buffer range
//!   management
//!
//! ## Streaming model
//!
//! Block edits mark the affected chunks dirty; each frame the render loop
//! drains a few of the dirtiest chunks (nearest the viewer first), remeshes
//! them, and gets back upload commands describing which buffer ranges to
//! overwrite. The GPU side stays a dumb executor of those commands.
//!
//! ```rust
//! use cgmath::{Point3, Vector3};
//! use quadcraft::rendering::mesh_store::MeshStore;
//! use quadcraft::rendering::meshing::MAX_VERTICES;
//! use quadcraft::voxels::block::BlockType;
//! use quadcraft::voxels::world::World;
//!
//! let mut world = World::with_size(Vector3::new(2, 1, 2));
//! let mut store = MeshStore::new(MAX_VERTICES as u32 * 4);
//!
//! world.set_block(Point3::new(0, 0, 0), BlockType::Dirt);
//!
//! let viewer = Point3::new(0, 0, 0);
//! let uploads = store.process_dirty_chunks(&mut world, viewer, 2).unwrap();
//! assert_eq!(uploads.len(), 1);
//! assert_eq!(uploads[0].vertices.len(), 24);
//! ```

pub mod rendering;
pub mod voxels;
