//! Visibility field storage and gradient queries.

mod gradient;
mod visibility;

pub use gradient::{GradientCache, GradientEngine};
pub use visibility::{Efficiency, VisibilityField, VolumeView};
