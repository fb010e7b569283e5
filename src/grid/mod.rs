//! Voxel grid description and addressing.

mod addressing;
mod spec;

pub use addressing::{BatchBackend, VoxelId};
pub use spec::GridSpec;

pub(crate) use addressing::map_batch;
