//! Fundamental types shared across the crate.
//!
//! - [`Axis`]: tagged axis selector (x/y/z), parsed fail-closed
//! - [`Point3`]: physical coordinate in the detector frame
//! - [`GridIndex`]: integer voxel index triple
//! - [`Bounds`]: the axis-aligned detector bounding volume

mod axis;
mod bounds;
mod point;

pub use axis::Axis;
pub use bounds::Bounds;
pub use point::{GridIndex, Point3};
