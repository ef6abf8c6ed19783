//! Fixed-point math utilities for deterministic navigation.
//!
//! World coordinates use fixed-point arithmetic so that every peer in a
//! lockstep match converts positions to tiles identically. Grid and search
//! math is plain integer arithmetic.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for world coordinates.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Fixed-point 2D vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Vec2Fixed {
    /// X coordinate.
    pub x: Fixed,
    /// Y coordinate.
    pub y: Fixed,
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

impl Vec2Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Create a vector from whole world units.
    #[must_use]
    pub fn from_ints(x: i32, y: i32) -> Self {
        Self::new(Fixed::from_num(x), Fixed::from_num(y))
    }
}

/// Axis-aligned rectangle in world space.
///
/// Used both for generated terrain features and for building footprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WorldRect {
    /// Left edge.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Top edge.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
    /// Width.
    #[serde(with = "fixed_serde")]
    pub w: Fixed,
    /// Height.
    #[serde(with = "fixed_serde")]
    pub h: Fixed,
}

impl WorldRect {
    /// Create a rectangle from fixed-point components.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed, w: Fixed, h: Fixed) -> Self {
        Self { x, y, w, h }
    }

    /// Create a rectangle from whole world units.
    #[must_use]
    pub fn from_ints(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self::new(
            Fixed::from_num(x),
            Fixed::from_num(y),
            Fixed::from_num(w),
            Fixed::from_num(h),
        )
    }

    /// Mirror across the vertical midline of a world `world_width` wide.
    #[must_use]
    pub fn mirrored_x(self, world_width: Fixed) -> Self {
        Self {
            x: world_width - self.x - self.w,
            ..self
        }
    }

    /// Right edge (`x + w`).
    #[must_use]
    pub fn right(self) -> Fixed {
        self.x.saturating_add(self.w)
    }

    /// Bottom edge (`y + h`).
    #[must_use]
    pub fn bottom(self) -> Fixed {
        self.y.saturating_add(self.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_mirror() {
        let rect = WorldRect::from_ints(100, 40, 64, 32);
        let mirrored = rect.mirrored_x(Fixed::from_num(1000));
        assert_eq!(mirrored, WorldRect::from_ints(836, 40, 64, 32));
        // Mirroring twice is the identity.
        assert_eq!(mirrored.mirrored_x(Fixed::from_num(1000)), rect);
    }

    #[test]
    fn test_rect_edges() {
        let rect = WorldRect::from_ints(10, 20, 30, 40);
        assert_eq!(rect.right(), Fixed::from_num(40));
        assert_eq!(rect.bottom(), Fixed::from_num(60));
    }
}
