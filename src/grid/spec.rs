//! Immutable description of the voxel grid.
//!
//! [`GridSpec`] pairs a voxel resolution per axis with the physical bounding
//! volume it partitions. Shape and bounds are fixed for the lifetime of the
//! spec; every derived quantity (voxel size, bin edges, normalization step)
//! is computed from those two.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{Axis, Bounds, Point3};
use crate::error::{Error, Result};

/// Immutable voxel grid description: per-axis voxel counts plus the
/// physical bounding volume.
///
/// The flat voxel id ordering (x fastest-varying) and the voxel-center
/// coordinate convention are defined by the addressing methods in
/// [`crate::grid::addressing`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Voxel counts along x, y, z.
    shape: [usize; 3],
    /// Physical bounding volume.
    bounds: Bounds,
}

impl GridSpec {
    /// Create a new grid spec.
    ///
    /// Fails if any axis has zero voxels or an inverted/empty range.
    pub fn new(shape: [usize; 3], bounds: Bounds) -> Result<Self> {
        if shape.iter().any(|&n| n == 0) {
            return Err(Error::InvalidGrid(format!(
                "shape has a zero-sized axis: {:?}",
                shape
            )));
        }
        if !bounds.is_valid() {
            return Err(Error::InvalidGrid(format!(
                "bounds must satisfy min < max per axis: {:?}",
                bounds
            )));
        }
        Ok(Self { shape, bounds })
    }

    /// Create a grid spec from per-axis (min, max) pairs.
    pub fn from_ranges(shape: [usize; 3], ranges: [(f32, f32); 3]) -> Result<Self> {
        Self::new(shape, Bounds::from_ranges(ranges))
    }

    /// Voxel counts along x, y, z.
    #[inline]
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Voxel count along one axis.
    #[inline]
    pub fn extent(&self, axis: Axis) -> usize {
        self.shape[axis.index()]
    }

    /// Physical bounding volume.
    #[inline]
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Total number of voxels (nx · ny · nz).
    #[inline]
    pub fn num_voxels(&self) -> usize {
        self.shape[0] * self.shape[1] * self.shape[2]
    }

    /// Physical voxel size along each axis, always > 0.
    #[inline]
    pub fn voxel_size(&self) -> Point3 {
        let len = self.bounds.length();
        Point3::new(
            len.x / self.shape[0] as f32,
            len.y / self.shape[1] as f32,
            len.z / self.shape[2] as f32,
        )
    }

    /// Step size per axis in normalized [-1, 1] coordinates (2 / shape).
    #[inline]
    pub fn norm_step(&self) -> Point3 {
        Point3::new(
            2.0 / self.shape[0] as f32,
            2.0 / self.shape[1] as f32,
            2.0 / self.shape[2] as f32,
        )
    }

    /// Physical extent along each axis (max − min).
    #[inline]
    pub fn length(&self) -> Point3 {
        self.bounds.length()
    }

    /// Voxel bin edges along one axis: shape + 1 evenly spaced values from
    /// min to max inclusive.
    pub fn bin_edges(&self, axis: Axis) -> Vec<f32> {
        let (lo, hi) = self.bounds.range(axis);
        let n = self.extent(axis);
        let step = (hi - lo) / n as f32;
        (0..=n).map(|i| lo + step * i as f32).collect()
    }

    /// Voxel center positions along one axis (midpoints of the bin edges).
    pub fn bin_centers(&self, axis: Axis) -> Vec<f32> {
        let edges = self.bin_edges(axis);
        edges.windows(2).map(|w| (w[0] + w[1]) * 0.5).collect()
    }
}

impl fmt::Display for GridSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GridSpec")?;
        for axis in Axis::ALL {
            let (lo, hi) = self.bounds.range(axis);
            write!(f, " {}:({},{},{})", axis, lo, hi, self.extent(axis))?;
        }
        Ok(())
    }
}
