//! # World Generation Module
//!
//! Fills a freshly created world with blocks and enqueues every chunk for
//! meshing, so the first frames stream the whole world through the normal
//! dirty-chunk path.
//!
//! Several fill strategies are provided:
//! - Perlin noise for natural-looking terrain with caves and overhangs
//! - A flat layered ground plane
//! - A 3-D checkerboard, the worst case for vertex count
//! - Solid and random fills for testing

use cgmath::{Point3, Vector3};
use log::info;
use noise::{NoiseFn, Perlin};

use super::block::BlockType;
use super::chunk::CHUNK_SIZE;
use super::world::World;

/// Noise samples outside `[-THRESHOLD, THRESHOLD]` become solid blocks.
pub const PERLIN_THRESHOLD: f64 = 0.2;
/// Scaling factor applied to world coordinates when sampling Perlin noise.
pub const PERLIN_SCALE_FACTOR: f64 = 0.02;

/// Fraction of blocks left as air by [`generate_random`].
const RANDOM_SPARSENESS: f64 = 0.9;

fn fill_world<F>(world: &mut World, mut block_at: F)
where
    F: FnMut(Point3<i32>) -> BlockType,
{
    let size = world.size();
    for chunk_z in 0..size.z {
        for chunk_y in 0..size.y {
            for chunk_x in 0..size.x {
                let coord = Point3::new(chunk_x, chunk_y, chunk_z);
                let origin = Vector3::new(
                    chunk_x * CHUNK_SIZE,
                    chunk_y * CHUNK_SIZE,
                    chunk_z * CHUNK_SIZE,
                );

                let chunk = world
                    .get_chunk_mut(coord)
                    .expect("chunk coordinate within grid");
                for z in 0..CHUNK_SIZE {
                    for y in 0..CHUNK_SIZE {
                        for x in 0..CHUNK_SIZE {
                            let local = Point3::new(x, y, z);
                            chunk.set_block_unchecked(local, block_at(local + origin));
                        }
                    }
                }
            }
        }
    }

    mark_all_dirty(world);
}

fn mark_all_dirty(world: &mut World) {
    let size = world.size();
    for chunk_z in 0..size.z {
        for chunk_y in 0..size.y {
            for chunk_x in 0..size.x {
                world.push_dirty(Point3::new(chunk_x, chunk_y, chunk_z));
            }
        }
    }
}

/// Generates terrain by thresholding 3-D Perlin noise.
///
/// Blocks whose noise sample falls outside the `[-PERLIN_THRESHOLD,
/// PERLIN_THRESHOLD]` band become stone; the rest stay air. The result
/// resembles natural terrain with caves and overhangs.
pub fn generate_perlin(world: &mut World, seed: u32) {
    let perlin = Perlin::new(seed);
    fill_world(world, |position| {
        let sample = perlin.get([
            position.x as f64 * PERLIN_SCALE_FACTOR,
            position.y as f64 * PERLIN_SCALE_FACTOR,
            position.z as f64 * PERLIN_SCALE_FACTOR,
        ]);
        if (-PERLIN_THRESHOLD..=PERLIN_THRESHOLD).contains(&sample) {
            BlockType::Air
        } else {
            BlockType::Stone
        }
    });
    let size = world.size();
    info!(
        "generated perlin terrain, {} chunks enqueued",
        size.x * size.y * size.z
    );
}

/// Generates a flat ground plane: grass on top of a few layers of dirt on
/// top of stone, with air above `ground_height`.
pub fn generate_flat(world: &mut World, ground_height: i32) {
    fill_world(world, |position| {
        if position.y >= ground_height {
            BlockType::Air
        } else if position.y == ground_height - 1 {
            BlockType::Grass
        } else if position.y >= ground_height - 4 {
            BlockType::Dirt
        } else {
            BlockType::Stone
        }
    });
}

/// Fills the world with a 3-D checkerboard of `block` and air.
///
/// Every solid block has all six faces exposed, which is the worst case the
/// mesher and the shared vertex buffer are sized against.
pub fn generate_checkerboard(world: &mut World, block: BlockType) {
    fill_world(world, |position| {
        if (position.x + position.y + position.z) % 2 == 0 {
            block
        } else {
            BlockType::Air
        }
    });
}

/// Fills the entire world with `block`.
pub fn generate_solid(world: &mut World, block: BlockType) {
    fill_world(world, |_| block);
}

/// Scatters random solid blocks through the world, leaving most of it air.
pub fn generate_random(world: &mut World, seed: u64) {
    let mut rng = fastrand::Rng::with_seed(seed);
    fill_world(world, |_| {
        if rng.f64() < RANDOM_SPARSENESS {
            BlockType::Air
        } else {
            BlockType::random_solid(&mut rng)
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_enqueues_every_chunk() {
        let mut world = World::with_size(Vector3::new(2, 1, 2));
        generate_flat(&mut world, 8);
        assert_eq!(world.dirty_len(), 4);
    }

    #[test]
    fn flat_terrain_is_layered() {
        let mut world = World::with_size(Vector3::new(1, 1, 1));
        generate_flat(&mut world, 8);

        assert_eq!(world.get_block(Point3::new(3, 8, 3)), BlockType::Air);
        assert_eq!(world.get_block(Point3::new(3, 7, 3)), BlockType::Grass);
        assert_eq!(world.get_block(Point3::new(3, 5, 3)), BlockType::Dirt);
        assert_eq!(world.get_block(Point3::new(3, 0, 3)), BlockType::Stone);
    }

    #[test]
    fn perlin_terrain_is_deterministic_per_seed() {
        let mut a = World::with_size(Vector3::new(1, 1, 1));
        let mut b = World::with_size(Vector3::new(1, 1, 1));
        generate_perlin(&mut a, 7);
        generate_perlin(&mut b, 7);

        for z in 0..CHUNK_SIZE {
            for y in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    let position = Point3::new(x, y, z);
                    assert_eq!(a.get_block(position), b.get_block(position));
                }
            }
        }
    }
}
