//! # Direction Module
//!
//! This module defines the six axis-aligned face directions used for face
//! orientation, neighbor-offset lookups, and per-face texture selection.

use cgmath::Vector3;

/// The number of axis-aligned directions.
pub const DIRECTION_COUNT: usize = 6;

/// One of the six axis-aligned unit directions.
///
/// The discriminant is used both as a table index (face-corner and ambient
/// occlusion offset tables) and as the 3-bit direction field of the packed
/// vertex encoding.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards positive x.
    PositiveX = 0,
    /// Towards positive y (up).
    PositiveY = 1,
    /// Towards positive z.
    PositiveZ = 2,
    /// Towards negative x.
    NegativeX = 3,
    /// Towards negative y (down).
    NegativeY = 4,
    /// Towards negative z.
    NegativeZ = 5,
}

impl Direction {
    /// Returns all six directions in discriminant order.
    pub fn all() -> [Direction; DIRECTION_COUNT] {
        [
            Direction::PositiveX,
            Direction::PositiveY,
            Direction::PositiveZ,
            Direction::NegativeX,
            Direction::NegativeY,
            Direction::NegativeZ,
        ]
    }

    /// Returns the integer unit vector pointing in this direction.
    pub fn to_vector(self) -> Vector3<i32> {
        match self {
            Direction::PositiveX => Vector3::new(1, 0, 0),
            Direction::PositiveY => Vector3::new(0, 1, 0),
            Direction::PositiveZ => Vector3::new(0, 0, 1),
            Direction::NegativeX => Vector3::new(-1, 0, 0),
            Direction::NegativeY => Vector3::new(0, -1, 0),
            Direction::NegativeZ => Vector3::new(0, 0, -1),
        }
    }

    /// Returns the direction pointing opposite to this one.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::PositiveX => Direction::NegativeX,
            Direction::PositiveY => Direction::NegativeY,
            Direction::PositiveZ => Direction::NegativeZ,
            Direction::NegativeX => Direction::PositiveX,
            Direction::NegativeY => Direction::PositiveY,
            Direction::NegativeZ => Direction::PositiveZ,
        }
    }
}
