//! # Jyoti-Map: Voxel-Addressed Photon Visibility Maps
//!
//! A lookup-table library mapping 3D positions inside a bounded detector
//! volume to per-sensor photon-visibility values, for use by simulation
//! and reconstruction pipelines.
//!
//! ## Features
//!
//! - **Bijective Voxel Addressing**: flat id ↔ 3D index ↔ physical /
//!   normalized coordinates, total over all of ℝ³ via boundary clamping
//! - **Dynamic-Range Compression**: invertible logarithmic codec taming
//!   visibilities that span many orders of magnitude (including zero)
//! - **Gradient Queries**: smoothed finite-difference derivatives per axis
//!   and sensor, on the fly or from a precomputed cache
//! - **Batch Friendly**: batched conversions and gradient queries run
//!   serially or across a rayon pool, selected at construction
//!
//! ## Quick Start
//!
//! ```rust
//! use jyoti_map::{GradientEngine, GridSpec, Point3, VisibilityField};
//!
//! // 2×2×2 grid over a 2 m cube, one sensor
//! let spec = GridSpec::from_ranges([2, 2, 2], [(0.0, 2.0), (0.0, 2.0), (0.0, 2.0)]).unwrap();
//! let field = VisibilityField::new(spec, vec![0.0; 8], 1).unwrap();
//!
//! // Flat voxel id 5 → index (1, 0, 1) → center (1.5, 0.5, 1.5)
//! assert_eq!(field.spec().voxel_to_coord(5), Point3::new(1.5, 0.5, 1.5));
//!
//! // Position → per-sensor visibility row; out-of-volume positions clamp
//! // to the nearest boundary voxel.
//! let row = field.visibility_at(Point3::new(10.0, 10.0, 10.0));
//! assert_eq!(row.len(), 1);
//!
//! // Per-axis, per-sensor spatial gradient at a voxel
//! let engine = GradientEngine::new(&field);
//! assert_eq!(engine.on_the_fly(5).len(), 3);
//! ```
//!
//! ## Coordinate Conventions
//!
//! - Flat voxel id: `id = ix + iy·nx + iz·nx·ny` (x fastest-varying), a
//!   format invariant shared with persisted files
//! - Index → coordinate uses the voxel-center convention
//! - Normalized coordinates rescale each axis to [-1, 1]
//! - Coordinate → index truncates and clamps; it never fails (see
//!   [`grid::addressing`] for the fine print on out-of-volume queries)
//!
//! ## Architecture
//!
//! - [`core`]: fundamental types (Axis, Point3, GridIndex, Bounds)
//! - [`grid`]: the immutable grid description and all addressing math
//! - [`transform`]: the dynamic-range compression codec
//! - [`field`]: dense visibility storage, volumetric views, gradients
//! - [`io`]: the native .jyoti binary format and sensor-position tables
//! - [`config`]: YAML configuration for load-time construction
//!
//! ## Data Flow
//!
//! ```text
//!  .jyoti file ──► io::load ──► VisibilityField ◄── LogCompression
//!  sensors.csv ──► io::sensors ──────┘                (optional, at load)
//!
//!  Point3 ──► GridSpec addressing ──► VoxelId ──► visibility row
//!                                        │
//!                                        └──► GradientEngine ──► (3, sensors)
//!                                              on-the-fly │ cached
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod field;
pub mod grid;
pub mod io;
pub mod transform;

// Re-export main types at crate root
pub use crate::core::{Axis, Bounds, GridIndex, Point3};
pub use crate::error::{Error, Result};
pub use crate::field::{Efficiency, GradientCache, GradientEngine, VisibilityField, VolumeView};
pub use crate::grid::{BatchBackend, GridSpec, VoxelId};
pub use crate::transform::LogCompression;

pub use crate::config::JyotiConfig;
