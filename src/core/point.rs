//! Point and index types for the voxel grid.

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use super::axis::Axis;

/// Voxel grid index (integer voxel coordinates)
///
/// Components are signed so that pre-clamp arithmetic (e.g. a coordinate
/// below the volume, or a gradient window reaching past the boundary) can
/// go negative before being folded back into range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridIndex {
    /// X index (column, fastest-varying in the flat voxel id)
    pub x: i32,
    /// Y index
    pub y: i32,
    /// Z index (slowest-varying in the flat voxel id)
    pub z: i32,
}

impl GridIndex {
    /// Create a new grid index
    #[inline]
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Component along the given axis
    #[inline]
    pub fn component(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Set the component along the given axis
    #[inline]
    pub fn set_component(&mut self, axis: Axis, value: i32) {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
            Axis::Z => self.z = value,
        }
    }

    /// Components as an (x, y, z) array
    #[inline]
    pub fn to_array(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }
}

impl Add for GridIndex {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        GridIndex::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for GridIndex {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        GridIndex::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl From<[i32; 3]> for GridIndex {
    #[inline]
    fn from(a: [i32; 3]) -> Self {
        GridIndex::new(a[0], a[1], a[2])
    }
}

/// Physical coordinates (detector frame, f32)
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
    /// Z coordinate
    pub z: f32,
}

impl Point3 {
    /// Zero point (origin)
    pub const ZERO: Point3 = Point3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a new point
    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Component along the given axis
    #[inline]
    pub fn component(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Components as an (x, y, z) array
    #[inline]
    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Component-wise minimum
    #[inline]
    pub fn min(&self, other: Point3) -> Point3 {
        Point3::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    /// Component-wise maximum
    #[inline]
    pub fn max(&self, other: Point3) -> Point3 {
        Point3::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }

    /// Euclidean distance to another point
    #[inline]
    pub fn distance(&self, other: &Point3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl Add for Point3 {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Point3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Point3 {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Point3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f32> for Point3 {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f32) -> Self {
        Point3::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl From<[f32; 3]> for Point3 {
    #[inline]
    fn from(a: [f32; 3]) -> Self {
        Point3::new(a[0], a[1], a[2])
    }
}
