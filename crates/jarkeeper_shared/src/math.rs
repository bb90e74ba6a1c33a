//! Geometry for ground scans.

use serde::{Deserialize, Serialize};

/// 3D Vector - world positions
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
}

impl Vec3 {
    /// Creates a new Vec3
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Same value on every axis.
    #[must_use]
    pub const fn splat(v: f32) -> Self {
        Self::new(v, v, v)
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Axis-aligned box used for "nearby" queries.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Bounds {
    /// A cube of the given half-extent centred on `center`.
    #[must_use]
    pub fn cube(center: Vec3, half_extent: f32) -> Self {
        let half = Vec3::splat(half_extent);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_corners() {
        let bounds = Bounds::cube(Vec3::new(1.0, 2.0, 3.0), 2.0);
        assert_eq!(bounds.min, Vec3::new(-1.0, 0.0, 1.0));
        assert_eq!(bounds.max, Vec3::new(3.0, 4.0, 5.0));
    }

    #[test]
    fn test_cube_contains_edges() {
        let bounds = Bounds::cube(Vec3::new(10.0, 0.0, 10.0), 5.0);
        assert!(bounds.contains(Vec3::new(15.0, 5.0, 5.0)));
        assert!(bounds.contains(Vec3::new(10.0, 0.0, 10.0)));
        assert!(!bounds.contains(Vec3::new(15.1, 0.0, 10.0)));
        assert!(!bounds.contains(Vec3::new(10.0, -5.5, 10.0)));
    }
}
