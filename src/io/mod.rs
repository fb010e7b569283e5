//! Persistence: the native .jyoti binary format and sensor-position tables.

pub mod format;
pub mod sensors;

pub use format::{load, save};
pub use sensors::load_sensor_positions;
