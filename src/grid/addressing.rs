//! Voxel addressing: conversions between flat voxel ids, 3D indices,
//! physical coordinates and normalized coordinates.
//!
//! The flat voxel id encoding is a format invariant shared with persisted
//! files:
//!
//! ```text
//! id = ix + iy·nx + iz·nx·ny        (x fastest-varying)
//! ```
//!
//! Coordinate conversions use the voxel-center convention: index `i` maps to
//! `min + (i + 0.5) · voxel_size`. The reverse mapping truncates
//! `(coord − min) / voxel_size` toward zero and then **clamps** each axis
//! into `[0, shape − 1]`.
//!
//! ## Out-of-volume clamping
//!
//! [`GridSpec::coord_to_index`] and [`GridSpec::digitize`] are total over all
//! of ℝ³: a coordinate outside the bounding volume is silently folded onto
//! the nearest boundary voxel instead of being rejected. This is a
//! compatibility-preserving policy, not an omission. Callers that need
//! rejection semantics must pre-filter with [`Bounds::contains`]; far
//! out-of-volume queries otherwise alias boundary voxels without any signal.
//!
//! [`Bounds::contains`]: crate::core::Bounds::contains

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::{Axis, GridIndex, Point3};

use super::spec::GridSpec;

/// Flat voxel identifier in `[0, nx·ny·nz)`.
pub type VoxelId = usize;

/// Execution strategy for batched queries.
///
/// Batched conversions are embarrassingly parallel; the backend is chosen at
/// construction time and passed by value. There is no shared mutable
/// "active backend" state, so concurrent queries never interfere.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchBackend {
    /// Evaluate batch elements sequentially.
    #[default]
    Serial,
    /// Fan batch elements out across the rayon thread pool.
    Parallel,
}

/// Map a batch through `f`, serially or across the rayon pool.
///
/// Result order always matches input order.
pub(crate) fn map_batch<T, U, F>(items: &[T], backend: BatchBackend, f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    match backend {
        BatchBackend::Serial => items.iter().map(f).collect(),
        BatchBackend::Parallel => items.par_iter().map(f).collect(),
    }
}

impl GridSpec {
    /// Convert a flat voxel id to its 3D index.
    ///
    /// `ix = id mod nx`, `iy = ⌊id/nx⌋ mod ny`, `iz = ⌊id/(nx·ny)⌋`.
    #[inline]
    pub fn voxel_to_index(&self, id: VoxelId) -> GridIndex {
        let [nx, ny, _] = self.shape();
        GridIndex::new(
            (id % nx) as i32,
            ((id / nx) % ny) as i32,
            (id / (nx * ny)) as i32,
        )
    }

    /// Convert a 3D index to its flat voxel id.
    ///
    /// No bounds checking: the caller guarantees index validity (use
    /// [`GridSpec::check_valid_index`] first when in doubt). An invalid
    /// index aliases some other voxel or lands outside `[0, num_voxels)`.
    #[inline]
    pub fn index_to_voxel(&self, index: GridIndex) -> VoxelId {
        debug_assert!(self.check_valid_index(index), "invalid index {:?}", index);
        let [nx, ny, _] = self.shape();
        index.x as usize + index.y as usize * nx + index.z as usize * nx * ny
    }

    /// Physical coordinate of a voxel center.
    #[inline]
    pub fn index_to_coord(&self, index: GridIndex) -> Point3 {
        let size = self.voxel_size();
        let min = self.bounds().min;
        Point3::new(
            min.x + (index.x as f32 + 0.5) * size.x,
            min.y + (index.y as f32 + 0.5) * size.y,
            min.z + (index.z as f32 + 0.5) * size.z,
        )
    }

    /// Normalized [-1, 1] coordinate of a voxel center:
    /// `2·(i + 0.5)/shape − 1` per axis.
    #[inline]
    pub fn index_to_norm_coord(&self, index: GridIndex) -> Point3 {
        let [nx, ny, nz] = self.shape();
        Point3::new(
            2.0 * (index.x as f32 + 0.5) / nx as f32 - 1.0,
            2.0 * (index.y as f32 + 0.5) / ny as f32 - 1.0,
            2.0 * (index.z as f32 + 0.5) / nz as f32 - 1.0,
        )
    }

    /// Voxel index containing a physical coordinate, clamped per axis into
    /// `[0, shape − 1]` (see the module docs on out-of-volume clamping).
    #[inline]
    pub fn coord_to_index(&self, coord: Point3) -> GridIndex {
        let size = self.voxel_size();
        let min = self.bounds().min;
        GridIndex::new(
            self.bin_component((coord.x - min.x) / size.x, Axis::X),
            self.bin_component((coord.y - min.y) / size.y, Axis::Y),
            self.bin_component((coord.z - min.z) / size.z, Axis::Z),
        )
    }

    /// Voxel index containing a normalized [-1, 1] coordinate, with the same
    /// per-axis clamping as [`GridSpec::coord_to_index`].
    #[inline]
    pub fn norm_coord_to_index(&self, coord: Point3) -> GridIndex {
        let step = self.norm_step();
        GridIndex::new(
            self.bin_component((coord.x + 1.0) / step.x, Axis::X),
            self.bin_component((coord.y + 1.0) / step.y, Axis::Y),
            self.bin_component((coord.z + 1.0) / step.z, Axis::Z),
        )
    }

    /// Physical coordinate of a voxel center, by flat id.
    #[inline]
    pub fn voxel_to_coord(&self, id: VoxelId) -> Point3 {
        self.index_to_coord(self.voxel_to_index(id))
    }

    /// Normalized coordinate of a voxel center, by flat id.
    #[inline]
    pub fn voxel_to_norm_coord(&self, id: VoxelId) -> Point3 {
        self.index_to_norm_coord(self.voxel_to_index(id))
    }

    /// Flat voxel id containing a physical coordinate (clamping).
    #[inline]
    pub fn coord_to_voxel(&self, coord: Point3) -> VoxelId {
        self.index_to_voxel(self.coord_to_index(coord))
    }

    /// Flat voxel id containing a normalized coordinate (clamping).
    #[inline]
    pub fn norm_coord_to_voxel(&self, coord: Point3) -> VoxelId {
        self.index_to_voxel(self.norm_coord_to_index(coord))
    }

    /// Rescale a physical coordinate to the normalized [-1, 1] frame:
    /// `2·(x − min)/(max − min) − 1` per axis.
    ///
    /// Unlike [`GridSpec::coord_to_index`] this does not clamp; positions
    /// outside the volume map outside [-1, 1].
    #[inline]
    pub fn norm_coord(&self, coord: Point3) -> Point3 {
        let min = self.bounds().min;
        let len = self.length();
        Point3::new(
            2.0 * (coord.x - min.x) / len.x - 1.0,
            2.0 * (coord.y - min.y) / len.y - 1.0,
            2.0 * (coord.z - min.z) / len.z - 1.0,
        )
    }

    /// True iff every axis component is in `[0, shape)`.
    #[inline]
    pub fn check_valid_index(&self, index: GridIndex) -> bool {
        let mask = self.valid_index_mask(index);
        mask[0] && mask[1] && mask[2]
    }

    /// Per-axis validity of an index: `[x ok, y ok, z ok]`.
    #[inline]
    pub fn valid_index_mask(&self, index: GridIndex) -> [bool; 3] {
        let shape = self.shape();
        let arr = index.to_array();
        let mut mask = [false; 3];
        for axis in 0..3 {
            mask[axis] = arr[axis] >= 0 && (arr[axis] as usize) < shape[axis];
        }
        mask
    }

    /// Bin a scalar coordinate along one axis to a voxel index, with the
    /// same truncate-and-clamp policy as [`GridSpec::coord_to_index`].
    #[inline]
    pub fn digitize(&self, value: f32, axis: Axis) -> usize {
        let (lo, _) = self.bounds().range(axis);
        let step = self.voxel_size().component(axis);
        self.bin_component((value - lo) / step, axis) as usize
    }

    /// Bin a scalar normalized [-1, 1] coordinate along one axis.
    #[inline]
    pub fn digitize_norm(&self, value: f32, axis: Axis) -> usize {
        let step = self.norm_step().component(axis);
        self.bin_component((value + 1.0) / step, axis) as usize
    }

    /// All voxel indices on the 2D slab where `axis` equals `fixed`, the
    /// other two axes ranging over their full extent. The lower-numbered
    /// orthogonal axis varies fastest.
    ///
    /// `fixed` is taken as given; a value outside `[0, shape)` produces
    /// indices that fail [`GridSpec::check_valid_index`].
    pub fn axis_slice(&self, axis: Axis, fixed: usize) -> Vec<GridIndex> {
        let [a, b] = axis.others();
        let (na, nb) = (self.extent(a), self.extent(b));

        let mut out = Vec::with_capacity(na * nb);
        for ib in 0..nb {
            for ia in 0..na {
                let mut index = GridIndex::default();
                index.set_component(axis, fixed as i32);
                index.set_component(a, ia as i32);
                index.set_component(b, ib as i32);
                out.push(index);
            }
        }
        out
    }

    /// Truncate a fractional bin position toward zero and clamp into
    /// `[0, shape − 1]` along `axis`.
    #[inline]
    fn bin_component(&self, fractional: f32, axis: Axis) -> i32 {
        let n = self.extent(axis) as i64;
        // `as i64` truncates toward zero and saturates on overflow/NaN.
        (fractional as i64).clamp(0, n - 1) as i32
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Batched conversions
// ─────────────────────────────────────────────────────────────────────────────

impl GridSpec {
    /// Batched [`GridSpec::voxel_to_index`]; output order matches input.
    pub fn voxels_to_indices(&self, ids: &[VoxelId], backend: BatchBackend) -> Vec<GridIndex> {
        map_batch(ids, backend, |&id| self.voxel_to_index(id))
    }

    /// Batched [`GridSpec::index_to_voxel`]; output order matches input.
    pub fn indices_to_voxels(&self, indices: &[GridIndex], backend: BatchBackend) -> Vec<VoxelId> {
        map_batch(indices, backend, |&index| self.index_to_voxel(index))
    }

    /// Batched [`GridSpec::voxel_to_coord`]; output order matches input.
    pub fn voxels_to_coords(&self, ids: &[VoxelId], backend: BatchBackend) -> Vec<Point3> {
        map_batch(ids, backend, |&id| self.voxel_to_coord(id))
    }

    /// Batched [`GridSpec::coord_to_voxel`]; output order matches input.
    pub fn coords_to_voxels(&self, coords: &[Point3], backend: BatchBackend) -> Vec<VoxelId> {
        map_batch(coords, backend, |&coord| self.coord_to_voxel(coord))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSpec;
    use rand::Rng;

    fn cube2() -> GridSpec {
        GridSpec::from_ranges([2, 2, 2], [(0.0, 2.0), (0.0, 2.0), (0.0, 2.0)]).unwrap()
    }

    fn skewed() -> GridSpec {
        GridSpec::from_ranges([5, 3, 4], [(-10.0, 10.0), (0.0, 6.0), (-2.0, 2.0)]).unwrap()
    }

    #[test]
    fn test_voxel_index_bijection_exhaustive() {
        let spec = skewed();
        for id in 0..spec.num_voxels() {
            let index = spec.voxel_to_index(id);
            assert!(spec.check_valid_index(index));
            assert_eq!(spec.index_to_voxel(index), id);
        }
    }

    #[test]
    fn test_reference_voxel_5() {
        // id 5 on a (2,2,2) grid: 5 = 1 + 0·2 + 1·4 → index (1, 0, 1),
        // center (1.5, 0.5, 1.5) for unit voxels.
        let spec = cube2();
        let index = spec.voxel_to_index(5);
        assert_eq!(index, GridIndex::new(1, 0, 1));
        assert_eq!(spec.voxel_to_coord(5), Point3::new(1.5, 0.5, 1.5));
    }

    #[test]
    fn test_coord_round_trip_random() {
        let spec = skewed();
        let size = spec.voxel_size();
        let mut rng = rand::rng();

        for _ in 0..1000 {
            let p = Point3::new(
                rng.random_range(-10.0..10.0),
                rng.random_range(0.0..6.0),
                rng.random_range(-2.0..2.0),
            );
            let center = spec.voxel_to_coord(spec.coord_to_voxel(p));
            assert!((center.x - p.x).abs() < size.x);
            assert!((center.y - p.y).abs() < size.y);
            assert!((center.z - p.z).abs() < size.z);
        }
    }

    #[test]
    fn test_out_of_volume_clamps_to_boundary() {
        let spec = skewed();

        let below = spec.coord_to_index(Point3::new(-1e6, -1e6, -1e6));
        assert_eq!(below, GridIndex::new(0, 0, 0));

        let above = spec.coord_to_index(Point3::new(1e6, 1e6, 1e6));
        assert_eq!(above, GridIndex::new(4, 2, 3));

        // Mixed: only the out-of-range axis folds.
        let mixed = spec.coord_to_index(Point3::new(0.0, 1e6, 0.0));
        assert_eq!(mixed.y, 2);
        assert_eq!(mixed.x, spec.coord_to_index(Point3::new(0.0, 3.0, 0.0)).x);
    }

    #[test]
    fn test_norm_coord_round_trip() {
        let spec = skewed();
        // Center of the volume normalizes to the origin.
        let center = spec.bounds().center();
        let n = spec.norm_coord(center);
        assert!(n.x.abs() < 1e-6 && n.y.abs() < 1e-6 && n.z.abs() < 1e-6);

        // Voxel centers agree between the two normalized paths.
        for id in [0, 7, 31, spec.num_voxels() - 1] {
            let index = spec.voxel_to_index(id);
            let via_index = spec.index_to_norm_coord(index);
            let via_coord = spec.norm_coord(spec.voxel_to_coord(id));
            assert!((via_index.x - via_coord.x).abs() < 1e-5);
            assert!((via_index.y - via_coord.y).abs() < 1e-5);
            assert!((via_index.z - via_coord.z).abs() < 1e-5);
        }
    }

    #[test]
    fn test_norm_coord_to_index_matches_physical() {
        let spec = skewed();
        let mut rng = rand::rng();
        for _ in 0..200 {
            let p = Point3::new(
                rng.random_range(-10.0..10.0),
                rng.random_range(0.0..6.0),
                rng.random_range(-2.0..2.0),
            );
            let direct = spec.coord_to_index(p);
            let via_norm = spec.norm_coord_to_index(spec.norm_coord(p));
            // Identical up to f32 rounding at bin boundaries.
            assert!((direct.x - via_norm.x).abs() <= 1);
            assert!((direct.y - via_norm.y).abs() <= 1);
            assert!((direct.z - via_norm.z).abs() <= 1);
        }
    }

    #[test]
    fn test_digitize_matches_coord_to_index() {
        let spec = skewed();
        let mut rng = rand::rng();
        for _ in 0..200 {
            let p = Point3::new(
                rng.random_range(-15.0..15.0),
                rng.random_range(-2.0..8.0),
                rng.random_range(-4.0..4.0),
            );
            let index = spec.coord_to_index(p);
            assert_eq!(spec.digitize(p.x, Axis::X), index.x as usize);
            assert_eq!(spec.digitize(p.y, Axis::Y), index.y as usize);
            assert_eq!(spec.digitize(p.z, Axis::Z), index.z as usize);
        }
    }

    #[test]
    fn test_digitize_clamps() {
        let spec = skewed();
        assert_eq!(spec.digitize(-1e9, Axis::X), 0);
        assert_eq!(spec.digitize(1e9, Axis::X), 4);
        assert_eq!(spec.digitize_norm(-5.0, Axis::Y), 0);
        assert_eq!(spec.digitize_norm(5.0, Axis::Y), 2);
    }

    #[test]
    fn test_valid_index_mask() {
        let spec = skewed();
        assert_eq!(
            spec.valid_index_mask(GridIndex::new(0, 0, 0)),
            [true, true, true]
        );
        assert_eq!(
            spec.valid_index_mask(GridIndex::new(-1, 2, 4)),
            [false, true, false]
        );
        assert!(!spec.check_valid_index(GridIndex::new(5, 0, 0)));
    }

    #[test]
    fn test_axis_slice() {
        let spec = skewed();
        let slab = spec.axis_slice(Axis::Y, 1);
        // x and z range over their full extents.
        assert_eq!(slab.len(), 5 * 4);
        assert!(slab.iter().all(|i| i.y == 1));
        assert!(slab.iter().all(|&i| spec.check_valid_index(i)));
        // Lower-numbered orthogonal axis (x) varies fastest.
        assert_eq!(slab[0], GridIndex::new(0, 1, 0));
        assert_eq!(slab[1], GridIndex::new(1, 1, 0));
        assert_eq!(slab[5], GridIndex::new(0, 1, 1));

        // Slabs along every axis cover distinct voxels.
        let slab_x = spec.axis_slice(Axis::X, 0);
        assert_eq!(slab_x.len(), 3 * 4);
        assert!(slab_x.iter().all(|i| i.x == 0));
    }

    #[test]
    fn test_batched_matches_scalar() {
        let spec = skewed();
        let ids: Vec<VoxelId> = (0..spec.num_voxels()).collect();

        for backend in [BatchBackend::Serial, BatchBackend::Parallel] {
            let indices = spec.voxels_to_indices(&ids, backend);
            let back = spec.indices_to_voxels(&indices, backend);
            assert_eq!(back, ids);

            let coords = spec.voxels_to_coords(&ids, backend);
            let voxels = spec.coords_to_voxels(&coords, backend);
            assert_eq!(voxels, ids);
        }
    }
}
