//! Spatial gradients of the visibility field.
//!
//! The derivative along each axis is a separable smoothing-derivative
//! (Sobel) response: a 3-tap derivative kernel `[-1, 0, 1]` along the
//! queried axis convolved with the 3-tap smoothing kernel `[1, 2, 1]` along
//! the two orthogonal axes. This equals a Gaussian-smoothed finite
//! difference, which keeps derivatives usable on noisy visibility data at
//! the cost of a 3-voxel support window; consumers depend on these exact
//! kernels, not a plain two-point difference.
//!
//! Two query modes exist and are never conflated:
//! - **on-the-fly**: extract the boundary-clamped `[idx−1, idx+2)` window
//!   around the voxel and convolve;
//! - **cached**: O(1) lookup into a precomputed [`GradientCache`]; querying
//!   it without an assigned cache is [`Error::CacheNotLoaded`], not a
//!   silent fallback.
//!
//! At a grid boundary along an axis (index 0) the convolution center
//! collapses to the edge of the window, since no lower neighbor exists.
//! Edges reflect (the out-of-window tap repeats the edge sample), so the
//! boundary derivative degenerates to a one-sided difference.

use crate::core::Axis;
use crate::error::{Error, Result};
use crate::grid::{map_batch, VoxelId};

use super::visibility::{VisibilityField, VolumeView};

/// Precomputed per-axis derivatives, dense over the grid.
///
/// Layout: flat `(num_voxels, 3, num_sensors)` in that C order, i.e. one
/// 3×num_sensors block per voxel, axis-major.
pub struct GradientCache {
    data: Vec<f32>,
    num_voxels: usize,
    num_sensors: usize,
}

impl GradientCache {
    /// Wrap a flat gradient array. `data` must hold
    /// `num_voxels · 3 · num_sensors` values.
    pub fn new(data: Vec<f32>, num_voxels: usize, num_sensors: usize) -> Result<Self> {
        let expected = num_voxels * 3 * num_sensors;
        if data.len() != expected {
            return Err(Error::ShapeMismatch {
                context: "gradient cache array",
                expected,
                found: data.len(),
            });
        }
        Ok(Self {
            data,
            num_voxels,
            num_sensors,
        })
    }

    /// Number of voxels covered.
    #[inline]
    pub fn num_voxels(&self) -> usize {
        self.num_voxels
    }

    /// Sensors per voxel.
    #[inline]
    pub fn num_sensors(&self) -> usize {
        self.num_sensors
    }

    /// The (3, num_sensors) block of one voxel, axis-major.
    #[inline]
    pub fn block(&self, voxel: VoxelId) -> &[f32] {
        let stride = 3 * self.num_sensors;
        &self.data[voxel * stride..(voxel + 1) * stride]
    }

    /// Per-sensor derivatives of one voxel along one axis.
    #[inline]
    pub fn get(&self, voxel: VoxelId, axis: Axis) -> &[f32] {
        let start = (voxel * 3 + axis.index()) * self.num_sensors;
        &self.data[start..start + self.num_sensors]
    }

    #[inline]
    pub(crate) fn data(&self) -> &[f32] {
        &self.data
    }
}

/// Gradient queries over a visibility field.
///
/// Borrows the field read-only; any number of engines may query the same
/// field concurrently.
pub struct GradientEngine<'a> {
    field: &'a VisibilityField,
}

/// Kernel tap weight at `offset` ∈ {-1, 0, 1}: derivative `[-1, 0, 1]` or
/// smoothing `[1, 2, 1]`.
#[inline]
fn tap(offset: i64, derivative: bool) -> f32 {
    if derivative {
        offset as f32
    } else {
        (2 - offset.abs()) as f32
    }
}

impl<'a> GradientEngine<'a> {
    /// Create an engine over `field`.
    pub fn new(field: &'a VisibilityField) -> Self {
        Self { field }
    }

    /// Compute the gradient of one voxel by local convolution.
    ///
    /// Returns a flat (3, num_sensors) block, axis-major, matching the
    /// layout of [`GradientCache::block`].
    pub fn on_the_fly(&self, voxel: VoxelId) -> Vec<f32> {
        let spec = self.field.spec();
        let shape = spec.shape();
        let index = spec.voxel_to_index(voxel).to_array();
        let num_sensors = self.field.num_sensors();
        let view = self.field.vis_view();

        // Window [idx−1, idx+2) per axis, clamped to the grid. The center
        // offset collapses to 0 where idx sits on the lower boundary.
        let mut lo = [0i64; 3];
        let mut len = [0i64; 3];
        let mut center = [0i64; 3];
        for axis in 0..3 {
            let i = index[axis] as i64;
            let l = (i - 1).max(0);
            let h = (i + 2).min(shape[axis] as i64);
            lo[axis] = l;
            len[axis] = h - l;
            center[axis] = if i == 0 { 0 } else { 1 };
        }

        // Window sample position along one axis for a kernel offset,
        // reflecting at the window edges.
        let sample = |axis: usize, offset: i64| -> usize {
            let w = (center[axis] + offset).clamp(0, len[axis] - 1);
            (lo[axis] + w) as usize
        };

        let mut out = vec![0.0f32; 3 * num_sensors];
        if num_sensors == 0 {
            return out;
        }
        for (d_axis, row) in out.chunks_mut(num_sensors).enumerate() {
            for ox in -1i64..=1 {
                for oy in -1i64..=1 {
                    for oz in -1i64..=1 {
                        let w = tap(ox, d_axis == 0) * tap(oy, d_axis == 1) * tap(oz, d_axis == 2);
                        if w == 0.0 {
                            continue;
                        }
                        let (sx, sy, sz) = (sample(0, ox), sample(1, oy), sample(2, oz));
                        for (s, acc) in row.iter_mut().enumerate() {
                            *acc += w * view.get(sx, sy, sz, s);
                        }
                    }
                }
            }
        }
        out
    }

    /// Batched [`GradientEngine::on_the_fly`]; one (3, num_sensors) block
    /// per queried voxel, in input order. Parallelized across the batch
    /// when the field's backend is [`BatchBackend::Parallel`].
    ///
    /// [`BatchBackend::Parallel`]: crate::grid::BatchBackend::Parallel
    pub fn on_the_fly_batch(&self, voxels: &[VoxelId]) -> Vec<Vec<f32>> {
        map_batch(voxels, self.field.backend(), |&voxel| self.on_the_fly(voxel))
    }

    /// Look up one voxel's (3, num_sensors) block in the assigned cache.
    ///
    /// Fails with [`Error::CacheNotLoaded`] when no cache has been
    /// assigned; cached and on-the-fly modes are never conflated.
    pub fn cached(&self, voxel: VoxelId) -> Result<&'a [f32]> {
        let cache = self.field.gradient_cache().ok_or(Error::CacheNotLoaded)?;
        Ok(cache.block(voxel))
    }

    /// Cached per-sensor derivatives of one voxel along one axis.
    pub fn cached_axis(&self, voxel: VoxelId, axis: Axis) -> Result<&'a [f32]> {
        let cache = self.field.gradient_cache().ok_or(Error::CacheNotLoaded)?;
        Ok(cache.get(voxel, axis))
    }

    /// Volumetric (x, y, z, sensor) view of the cached derivative along one
    /// axis, following the same axis convention as the visibility view.
    pub fn grad_view(&self, axis: Axis) -> Result<VolumeView<'a>> {
        let cache = self.field.gradient_cache().ok_or(Error::CacheNotLoaded)?;
        let num_sensors = cache.num_sensors();
        Ok(VolumeView::new(
            cache.data(),
            self.field.spec().shape(),
            num_sensors,
            axis.index() * num_sensors,
            3 * num_sensors,
        ))
    }

    /// Compute the full gradient cache by convolving every voxel, using the
    /// field's batch backend. The result can be assigned with
    /// [`VisibilityField::assign_gradient_cache`].
    pub fn precompute(&self) -> GradientCache {
        let num_voxels = self.field.num_voxels();
        let num_sensors = self.field.num_sensors();
        let ids: Vec<VoxelId> = (0..num_voxels).collect();
        let blocks = map_batch(&ids, self.field.backend(), |&id| self.on_the_fly(id));

        let mut data = Vec::with_capacity(num_voxels * 3 * num_sensors);
        for block in blocks {
            data.extend_from_slice(&block);
        }
        GradientCache {
            data,
            num_voxels,
            num_sensors,
        }
    }
}
