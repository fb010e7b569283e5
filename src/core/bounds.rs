//! Axis-aligned bounding volume for the detector.
//!
//! [`Bounds`] describes the physical box the voxel grid partitions. It is
//! fixed at construction and shared read-only by everything that needs a
//! world-coordinate frame: addressing, normalization, sensor placement.

use serde::{Deserialize, Serialize};

use super::axis::Axis;
use super::point::Point3;

/// Axis-aligned bounding box in detector coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum corner (smallest x, y and z values).
    pub min: Point3,
    /// Maximum corner (largest x, y and z values).
    pub max: Point3,
}

impl Bounds {
    /// Create a new bounding box from min and max corners.
    #[inline]
    pub const fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create bounds from per-axis (min, max) pairs in x, y, z order.
    #[inline]
    pub fn from_ranges(ranges: [(f32, f32); 3]) -> Self {
        Self {
            min: Point3::new(ranges[0].0, ranges[1].0, ranges[2].0),
            max: Point3::new(ranges[0].1, ranges[1].1, ranges[2].1),
        }
    }

    /// The (min, max) pair along one axis.
    #[inline]
    pub fn range(&self, axis: Axis) -> (f32, f32) {
        (self.min.component(axis), self.max.component(axis))
    }

    /// Extent along each axis (max − min).
    #[inline]
    pub fn length(&self) -> Point3 {
        self.max - self.min
    }

    /// Center of the bounding box.
    #[inline]
    pub fn center(&self) -> Point3 {
        Point3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    /// Check if a point is inside the bounding box (inclusive).
    #[inline]
    pub fn contains(&self, point: Point3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Clamp a point to be inside the bounds.
    #[inline]
    pub fn clamp(&self, point: Point3) -> Point3 {
        point.max(self.min).min(self.max)
    }

    /// True iff min < max on every axis.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min.x < self.max.x && self.min.y < self.max.y && self.min.z < self.max.z
    }
}
