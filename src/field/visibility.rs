//! Dense per-voxel, per-sensor visibility storage.
//!
//! [`VisibilityField`] owns a flat `(num_voxels, num_sensors)` f32 array in
//! flat-voxel-id row order, alongside the [`GridSpec`] that gives the rows
//! spatial meaning. Values are write-once: after construction the only
//! mutation is the one-time gradient-cache assignment.

use log::info;

use crate::core::{GridIndex, Point3};
use crate::error::{Error, Result};
use crate::grid::{BatchBackend, GridSpec, VoxelId};
use crate::transform::LogCompression;

use super::gradient::GradientCache;

/// Per-sensor efficiency multiplier.
///
/// Persisted files may carry either a single scalar applied to every sensor
/// or one value per sensor; absent means 1 everywhere.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Efficiency {
    /// One multiplier for all sensors.
    Uniform(f32),
    /// One multiplier per sensor, indexed by sensor id.
    PerSensor(Vec<f32>),
}

impl Default for Efficiency {
    fn default() -> Self {
        Efficiency::Uniform(1.0)
    }
}

impl Efficiency {
    /// Multiplier for one sensor.
    #[inline]
    pub fn get(&self, sensor: usize) -> f32 {
        match self {
            Efficiency::Uniform(v) => *v,
            Efficiency::PerSensor(values) => values[sensor],
        }
    }
}

/// Dense visibility lookup table over the voxel grid.
pub struct VisibilityField {
    spec: GridSpec,
    /// Flat (num_voxels, num_sensors) array, row order = flat voxel id.
    vis: Vec<f32>,
    num_sensors: usize,
    eff: Efficiency,
    sensor_pos: Option<Vec<Point3>>,
    sensor_pos_norm: Option<Vec<Point3>>,
    /// Codec the stored values were compressed with, if any. Retained so
    /// raw values can be recovered and so save() round-trips the triple.
    compression: Option<LogCompression>,
    grad_cache: Option<GradientCache>,
    backend: BatchBackend,
}

impl VisibilityField {
    /// Create a field from a flat visibility array.
    ///
    /// `vis` must hold `spec.num_voxels() · num_sensors` values in flat
    /// voxel id row order.
    pub fn new(spec: GridSpec, vis: Vec<f32>, num_sensors: usize) -> Result<Self> {
        let expected = spec.num_voxels() * num_sensors;
        if vis.len() != expected {
            return Err(Error::ShapeMismatch {
                context: "visibility array",
                expected,
                found: vis.len(),
            });
        }
        Ok(Self {
            spec,
            vis,
            num_sensors,
            eff: Efficiency::default(),
            sensor_pos: None,
            sensor_pos_norm: None,
            compression: None,
            grad_cache: None,
            backend: BatchBackend::default(),
        })
    }

    /// Compress the stored values in place with `codec` and retain the
    /// codec for later inversion. Call at most once, on raw values.
    pub fn compress(mut self, codec: LogCompression) -> Self {
        info!(
            "compressing visibility: vmax={}, eps={}, sin_out={}",
            codec.vmax, codec.eps, codec.sin_out
        );
        codec.forward_slice(&mut self.vis);
        self.compression = Some(codec);
        self
    }

    /// Record that the stored values are already compressed with `codec`
    /// without touching them (used when loading pre-compressed files).
    pub fn assume_compressed(mut self, codec: LogCompression) -> Self {
        self.compression = Some(codec);
        self
    }

    /// Attach an efficiency multiplier. A per-sensor vector must have one
    /// entry per sensor.
    pub fn with_efficiency(mut self, eff: Efficiency) -> Result<Self> {
        if let Efficiency::PerSensor(values) = &eff {
            if values.len() != self.num_sensors {
                return Err(Error::ShapeMismatch {
                    context: "efficiency array",
                    expected: self.num_sensors,
                    found: values.len(),
                });
            }
        }
        self.eff = eff;
        Ok(self)
    }

    /// Attach sensor positions (one per sensor, row order = sensor id).
    /// Normalized copies are computed once against the grid bounds.
    pub fn with_sensor_positions(mut self, positions: Vec<Point3>) -> Result<Self> {
        if positions.len() != self.num_sensors {
            return Err(Error::ShapeMismatch {
                context: "sensor positions",
                expected: self.num_sensors,
                found: positions.len(),
            });
        }
        let norm = positions.iter().map(|&p| self.spec.norm_coord(p)).collect();
        self.sensor_pos = Some(positions);
        self.sensor_pos_norm = Some(norm);
        Ok(self)
    }

    /// Select the batch execution backend (default: serial).
    pub fn with_backend(mut self, backend: BatchBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Grid description shared by all spatial queries.
    #[inline]
    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Number of voxels (rows).
    #[inline]
    pub fn num_voxels(&self) -> usize {
        self.spec.num_voxels()
    }

    /// Number of sensors (columns).
    #[inline]
    pub fn num_sensors(&self) -> usize {
        self.num_sensors
    }

    /// Alias for [`VisibilityField::num_voxels`].
    #[inline]
    pub fn len(&self) -> usize {
        self.num_voxels()
    }

    /// True if the field holds no voxels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vis.is_empty()
    }

    /// The whole flat visibility array.
    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.vis
    }

    /// Per-sensor visibility row of one voxel.
    ///
    /// Panics if `voxel` is out of range; ids produced by the addressing
    /// layer are always in range.
    #[inline]
    pub fn visibility(&self, voxel: VoxelId) -> &[f32] {
        let start = voxel * self.num_sensors;
        &self.vis[start..start + self.num_sensors]
    }

    /// Stored value for one (voxel, sensor) pair.
    #[inline]
    pub fn value(&self, voxel: VoxelId, sensor: usize) -> f32 {
        self.vis[voxel * self.num_sensors + sensor]
    }

    /// Stored value decompressed back to the raw scale, when a codec is
    /// attached; the stored value otherwise.
    #[inline]
    pub fn value_raw(&self, voxel: VoxelId, sensor: usize) -> f32 {
        let v = self.value(voxel, sensor);
        match &self.compression {
            Some(codec) => codec.inverse(v),
            None => v,
        }
    }

    /// Per-sensor visibility row at a physical position.
    ///
    /// Out-of-volume positions clamp to the nearest boundary voxel (see
    /// [`crate::grid::addressing`] module docs).
    #[inline]
    pub fn visibility_at(&self, coord: Point3) -> &[f32] {
        self.visibility(self.spec.coord_to_voxel(coord))
    }

    /// Efficiency multiplier attached to this field.
    #[inline]
    pub fn efficiency(&self) -> &Efficiency {
        &self.eff
    }

    /// Efficiency multiplier for one sensor.
    #[inline]
    pub fn sensor_efficiency(&self, sensor: usize) -> f32 {
        self.eff.get(sensor)
    }

    /// Codec the stored values were compressed with, if any.
    #[inline]
    pub fn compression(&self) -> Option<&LogCompression> {
        self.compression.as_ref()
    }

    /// Sensor positions in detector coordinates, if loaded.
    #[inline]
    pub fn sensor_positions(&self) -> Option<&[Point3]> {
        self.sensor_pos.as_deref()
    }

    /// Sensor positions in the normalized [-1, 1] frame, if loaded.
    #[inline]
    pub fn sensor_positions_norm(&self) -> Option<&[Point3]> {
        self.sensor_pos_norm.as_deref()
    }

    /// Batch execution backend for gradient and addressing queries.
    #[inline]
    pub fn backend(&self) -> BatchBackend {
        self.backend
    }

    /// Volumetric view of the visibility data in (x, y, z, sensor) axis
    /// order (the flat array reshaped to (nz, ny, nx, sensors) with the
    /// x/z axes swapped).
    #[inline]
    pub fn vis_view(&self) -> VolumeView<'_> {
        VolumeView::new(&self.vis, self.spec.shape(), self.num_sensors, 0, self.num_sensors)
    }

    /// Assign a precomputed gradient cache (one-time initialization).
    ///
    /// Fails if the cache dimensions disagree with this field.
    pub fn assign_gradient_cache(&mut self, cache: GradientCache) -> Result<()> {
        if cache.num_voxels() != self.num_voxels() {
            return Err(Error::ShapeMismatch {
                context: "gradient cache voxels",
                expected: self.num_voxels(),
                found: cache.num_voxels(),
            });
        }
        if cache.num_sensors() != self.num_sensors {
            return Err(Error::ShapeMismatch {
                context: "gradient cache sensors",
                expected: self.num_sensors,
                found: cache.num_sensors(),
            });
        }
        self.grad_cache = Some(cache);
        Ok(())
    }

    /// The assigned gradient cache, if any.
    #[inline]
    pub fn gradient_cache(&self) -> Option<&GradientCache> {
        self.grad_cache.as_ref()
    }
}

/// Read-only 4D view over flat per-voxel channel data, presented in
/// (x, y, z, channel) axis order.
///
/// Because the flat row order is x fastest-varying, element (ix, iy, iz, c)
/// is pure index arithmetic over the underlying slice; nothing is copied.
#[derive(Clone, Copy, Debug)]
pub struct VolumeView<'a> {
    data: &'a [f32],
    shape: [usize; 3],
    channels: usize,
    /// Offset of channel 0 within one voxel's record.
    offset: usize,
    /// Distance between consecutive voxel records.
    voxel_stride: usize,
}

impl<'a> VolumeView<'a> {
    pub(crate) fn new(
        data: &'a [f32],
        shape: [usize; 3],
        channels: usize,
        offset: usize,
        voxel_stride: usize,
    ) -> Self {
        Self {
            data,
            shape,
            channels,
            offset,
            voxel_stride,
        }
    }

    /// Grid shape (nx, ny, nz).
    #[inline]
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Channels per voxel (sensors for the visibility view).
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Value at (ix, iy, iz, channel).
    #[inline]
    pub fn get(&self, ix: usize, iy: usize, iz: usize, channel: usize) -> f32 {
        let [nx, ny, _] = self.shape;
        let id = ix + iy * nx + iz * nx * ny;
        self.data[self.offset + id * self.voxel_stride + channel]
    }

    /// Value at a grid index.
    #[inline]
    pub fn get_index(&self, index: GridIndex, channel: usize) -> f32 {
        self.get(index.x as usize, index.y as usize, index.z as usize, channel)
    }

    /// Materialize as a contiguous array in C order over (x, y, z, channel).
    pub fn to_vec(&self) -> Vec<f32> {
        let [nx, ny, nz] = self.shape;
        let mut out = Vec::with_capacity(nx * ny * nz * self.channels);
        for ix in 0..nx {
            for iy in 0..ny {
                for iz in 0..nz {
                    for c in 0..self.channels {
                        out.push(self.get(ix, iy, iz, c));
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Bounds;

    fn spec_232() -> GridSpec {
        GridSpec::new(
            [2, 3, 2],
            Bounds::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 3.0, 2.0)),
        )
        .unwrap()
    }

    /// vis[voxel][sensor] = voxel * 10 + sensor, two sensors.
    fn ramp_field() -> VisibilityField {
        let spec = spec_232();
        let n = spec.num_voxels();
        let vis: Vec<f32> = (0..n)
            .flat_map(|v| [(v * 10) as f32, (v * 10 + 1) as f32])
            .collect();
        VisibilityField::new(spec, vis, 2).unwrap()
    }

    #[test]
    fn test_new_shape_mismatch() {
        let spec = spec_232();
        let result = VisibilityField::new(spec, vec![0.0; 7], 2);
        assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_row_and_value_access() {
        let field = ramp_field();
        assert_eq!(field.num_voxels(), 12);
        assert_eq!(field.num_sensors(), 2);
        assert_eq!(field.visibility(3), &[30.0, 31.0]);
        assert_eq!(field.value(5, 1), 51.0);
    }

    #[test]
    fn test_visibility_at_clamps() {
        let field = ramp_field();
        // Far below the volume on every axis → voxel 0.
        let row = field.visibility_at(Point3::new(-100.0, -100.0, -100.0));
        assert_eq!(row, field.visibility(0));
        // Far above → last voxel.
        let row = field.visibility_at(Point3::new(100.0, 100.0, 100.0));
        assert_eq!(row, field.visibility(field.num_voxels() - 1));
    }

    #[test]
    fn test_vis_view_axis_order() {
        let field = ramp_field();
        let view = field.vis_view();
        assert_eq!(view.shape(), [2, 3, 2]);
        assert_eq!(view.channels(), 2);

        // View element (ix,iy,iz,s) must address the row of the flat id.
        let spec = field.spec();
        for iz in 0..2 {
            for iy in 0..3 {
                for ix in 0..2 {
                    let id = spec.index_to_voxel(GridIndex::new(ix as i32, iy as i32, iz as i32));
                    assert_eq!(view.get(ix, iy, iz, 0), field.value(id, 0));
                    assert_eq!(view.get(ix, iy, iz, 1), field.value(id, 1));
                }
            }
        }
    }

    #[test]
    fn test_view_to_vec_x_major() {
        let field = ramp_field();
        let arr = field.vis_view().to_vec();
        assert_eq!(arr.len(), 12 * 2);
        // First block is (ix=0): voxels 0, 2, 4, ... in (iy, iz) C order
        // means index arithmetic per (0, iy, iz).
        let spec = field.spec();
        let first = spec.index_to_voxel(GridIndex::new(0, 0, 0));
        assert_eq!(arr[0], field.value(first, 0));
        let second = spec.index_to_voxel(GridIndex::new(0, 0, 1));
        assert_eq!(arr[2], field.value(second, 0));
    }

    #[test]
    fn test_compress_retains_codec() {
        let spec = spec_232();
        let vis = vec![0.5f32; 24];
        let codec = LogCompression::default();
        let field = VisibilityField::new(spec, vis, 2).unwrap().compress(codec);

        assert_eq!(field.compression(), Some(&codec));
        let stored = field.value(0, 0);
        assert!((stored - codec.forward(0.5)).abs() < 1e-6);
        assert!((field.value_raw(0, 0) - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_efficiency_validation() {
        let field = ramp_field().with_efficiency(Efficiency::PerSensor(vec![0.9, 1.1]));
        let field = field.unwrap();
        assert_eq!(field.sensor_efficiency(0), 0.9);
        assert_eq!(field.sensor_efficiency(1), 1.1);

        let bad = ramp_field().with_efficiency(Efficiency::PerSensor(vec![1.0; 3]));
        assert!(matches!(bad, Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_sensor_positions_normalized() {
        let positions = vec![Point3::new(1.0, 1.5, 1.0), Point3::new(0.0, 0.0, 0.0)];
        let field = ramp_field().with_sensor_positions(positions).unwrap();

        let norm = field.sensor_positions_norm().unwrap();
        // Volume center → origin of the normalized frame.
        assert!(norm[0].x.abs() < 1e-6);
        assert!(norm[0].y.abs() < 1e-6);
        assert!(norm[0].z.abs() < 1e-6);
        // Volume min corner → (-1, -1, -1).
        assert!((norm[1].x + 1.0).abs() < 1e-6);

        let bad = ramp_field().with_sensor_positions(vec![Point3::ZERO]);
        assert!(matches!(bad, Err(Error::ShapeMismatch { .. })));
    }
}
