//! # Block Type Module
//!
//! This module defines the block types of the voxel world and the static
//! registry mapping each type to its render-relevant properties: whether the
//! block is transparent, and which texture each of its six faces uses.

use num_derive::FromPrimitive;

use super::direction::Direction;

/// The underlying integer type used to represent block types in memory.
/// Chunks store blocks as this compact type rather than the full enum width.
pub type BlockTypeSize = u8;

/// Identifier of a texture in the external texture atlas.
///
/// Texture ids are packed into 9 bits of the vertex encoding, so every id in
/// the registry must stay below 512.
pub type TextureId = u16;

/// Dirt, also the grass underside.
pub const TEXTURE_DIRT: TextureId = 0;
/// The side faces of a grass block.
pub const TEXTURE_GRASS_SIDE: TextureId = 1;
/// The top face of a grass block.
pub const TEXTURE_GRASS: TextureId = 2;
/// Stone, all faces.
pub const TEXTURE_STONE: TextureId = 3;
/// The bark sides of a log block.
pub const TEXTURE_LOG_SIDE: TextureId = 4;
/// The ring ends of a log block.
pub const TEXTURE_LOG: TextureId = 5;
/// Plank, all faces.
pub const TEXTURE_PLANK: TextureId = 6;
/// Brick, all faces.
pub const TEXTURE_BRICK: TextureId = 7;

/// The number of distinct block types.
pub const BLOCK_TYPE_COUNT: usize = 7;

/// Enumerates all possible block types in the voxel world.
///
/// The discriminant doubles as the stored byte value, and `FromPrimitive`
/// provides the reverse conversion when reading blocks back out of a chunk.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// An air block, non-solid and always transparent.
    Air,
    /// A dirt block.
    Dirt,
    /// A stone block.
    Stone,
    /// A grass block with different textures on top, sides, and bottom.
    Grass,
    /// A log block with bark sides and ring ends.
    Log,
    /// A plank block.
    Plank,
    /// A brick block.
    Brick,
}

/// Render-relevant properties of a block type.
///
/// Face textures are indexed by [`Direction`] in its enum order.
pub struct BlockProperties {
    /// Whether faces adjacent to this block remain visible.
    pub is_transparent: bool,
    /// Texture id of each face, indexed by `Direction` discriminant.
    pub face_textures: [TextureId; 6],
}

const fn faces_uniform(texture: TextureId) -> [TextureId; 6] {
    [texture; 6]
}

const fn faces_side_top_bottom(side: TextureId, top: TextureId, bottom: TextureId) -> [TextureId; 6] {
    [side, top, side, side, bottom, side]
}

static BLOCK_PROPERTY_TABLE: [BlockProperties; BLOCK_TYPE_COUNT] = [
    // Air
    BlockProperties {
        is_transparent: true,
        face_textures: faces_uniform(0),
    },
    // Dirt
    BlockProperties {
        is_transparent: false,
        face_textures: faces_uniform(TEXTURE_DIRT),
    },
    // Stone
    BlockProperties {
        is_transparent: false,
        face_textures: faces_uniform(TEXTURE_STONE),
    },
    // Grass
    BlockProperties {
        is_transparent: false,
        face_textures: faces_side_top_bottom(TEXTURE_GRASS_SIDE, TEXTURE_GRASS, TEXTURE_DIRT),
    },
    // Log
    BlockProperties {
        is_transparent: false,
        face_textures: faces_side_top_bottom(TEXTURE_LOG_SIDE, TEXTURE_LOG, TEXTURE_LOG),
    },
    // Plank
    BlockProperties {
        is_transparent: false,
        face_textures: faces_uniform(TEXTURE_PLANK),
    },
    // Brick
    BlockProperties {
        is_transparent: false,
        face_textures: faces_uniform(TEXTURE_BRICK),
    },
];

impl BlockType {
    /// Looks up the static properties for this block type.
    pub fn properties(self) -> &'static BlockProperties {
        &BLOCK_PROPERTY_TABLE[self as usize]
    }

    /// Returns whether faces adjacent to this block are visible.
    pub fn is_transparent(self) -> bool {
        self.properties().is_transparent
    }

    /// Returns the texture id for the face of this block pointing in `direction`.
    pub fn face_texture(self, direction: Direction) -> TextureId {
        self.properties().face_textures[direction as usize]
    }

    /// Converts a stored block byte back to a `BlockType`.
    ///
    /// # Panics
    /// Panics if the byte does not correspond to a valid block type. Block
    /// bytes only ever come from prior enum writes, so an invalid value is a
    /// programming error, not a runtime condition.
    pub fn from_int(btype: BlockTypeSize) -> Self {
        num::FromPrimitive::from_u8(btype).expect("invalid block type byte")
    }

    /// Picks a random non-air block type, for test worlds and noise fills.
    pub fn random_solid(rng: &mut fastrand::Rng) -> Self {
        num::FromPrimitive::from_u8(rng.u8(1..BLOCK_TYPE_COUNT as u8)).unwrap()
    }
}
