//! Error types for jyoti-map.

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// jyoti-map error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Axis selector is not one of x/y/z (or 0/1/2)
    #[error("unknown axis: {0}")]
    UnknownAxis(String),

    /// Cached-mode gradient requested but no cache has been assigned
    #[error("gradient cache not loaded")]
    CacheNotLoaded,

    /// Degenerate grid description (zero-sized axis, inverted range)
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// Array length disagrees with the grid shape or sensor count
    #[error("shape mismatch for {context}: expected {expected}, found {found}")]
    ShapeMismatch {
        /// What was being sized (e.g. "visibility array")
        context: &'static str,
        /// Expected element count
        expected: usize,
        /// Actual element count
        found: usize,
    },

    /// Sensor-position table is missing a required column
    #[error("missing column: {0}")]
    MissingColumn(&'static str),

    /// Persisted file violates the format schema
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// Persisted file was written by an incompatible format version
    #[error("version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected format version
        expected: u8,
        /// Found format version
        found: u8,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration could not be parsed
    #[error("config error: {0}")]
    Config(String),

    /// Numeric field could not be parsed
    #[error("parse error: {0}")]
    Parse(String),
}
