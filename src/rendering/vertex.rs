//! Bit-packed vertex encoding for chunk meshes.
//!
//! Every vertex a chunk mesh emits fits in a single 32-bit scalar, which the
//! render loop uploads verbatim and the vertex shader unpacks.

use cgmath::Point3;

use crate::voxels::block::{Direction, TextureId};

/// A single mesh vertex packed into 32 bits.
///
/// Layout, from the most significant bit down:
///
/// | Data              | Size   | Bits  | Max value |
/// |-------------------|--------|-------|-----------|
/// | x                 | 6 bits | 31..26| 64        |
/// | y                 | 6 bits | 25..20| 64        |
/// | z                 | 6 bits | 19..14| 64        |
/// | direction         | 3 bits | 13..11| 8         |
/// | ambient occlusion | 2 bits | 10..9 | 4         |
/// | texture id        | 9 bits | 8..0  | 512       |
///
/// Positions are chunk-local; the 6-bit range leaves room for face corners
/// one unit beyond the chunk edge. Overflowing any field is a contract
/// violation of the block registry or world configuration, checked with
/// assertions rather than surfaced as a recoverable error.
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PackedVertex(u32);

impl PackedVertex {
    /// Packs one vertex.
    ///
    /// # Panics
    /// Panics if any field exceeds its bit width.
    pub fn pack(position: Point3<i32>, direction: Direction, ao: u8, texture: TextureId) -> Self {
        assert!(
            (0..64).contains(&position.x)
                && (0..64).contains(&position.y)
                && (0..64).contains(&position.z),
            "vertex position {:?} outside the 6-bit range",
            position
        );
        assert!(ao < 4, "ambient occlusion level {} outside the 2-bit range", ao);
        assert!(texture < 512, "texture id {} outside the 9-bit range", texture);

        PackedVertex(
            (position.x as u32) << 26
                | (position.y as u32) << 20
                | (position.z as u32) << 14
                | (direction as u32) << 11
                | (ao as u32) << 9
                | texture as u32,
        )
    }

    /// The x component of the vertex position.
    pub fn x(self) -> i32 {
        (self.0 >> 26 & 0x3f) as i32
    }

    /// The y component of the vertex position.
    pub fn y(self) -> i32 {
        (self.0 >> 20 & 0x3f) as i32
    }

    /// The z component of the vertex position.
    pub fn z(self) -> i32 {
        (self.0 >> 14 & 0x3f) as i32
    }

    /// The unpacked chunk-local vertex position.
    pub fn position(self) -> Point3<i32> {
        Point3::new(self.x(), self.y(), self.z())
    }

    /// The 3-bit direction field, matching `Direction`'s discriminant.
    pub fn direction_index(self) -> u8 {
        (self.0 >> 11 & 0x7) as u8
    }

    /// The ambient occlusion level, 0 (fully occluded) to 3 (unoccluded).
    pub fn ao(self) -> u8 {
        (self.0 >> 9 & 0x3) as u8
    }

    /// The 9-bit texture id of the face this vertex belongs to.
    pub fn texture(self) -> TextureId {
        (self.0 & 0x1ff) as TextureId
    }

    /// The raw 32-bit encoding, exactly as uploaded to the vertex buffer.
    pub fn raw(self) -> u32 {
        self.0
    }
}
