//! Axis selection for slab extraction and gradient queries.
//!
//! Axis selectors arrive either as numeric indices (0/1/2) or as symbolic
//! labels ("x"/"y"/"z"). Both parse into the [`Axis`] enum and anything else
//! fails closed with [`Error::UnknownAxis`]; there is no silent default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One of the three spatial axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(usize)]
pub enum Axis {
    /// X axis (fastest-varying in the flat voxel id)
    X = 0,
    /// Y axis
    Y = 1,
    /// Z axis (slowest-varying in the flat voxel id)
    Z = 2,
}

impl Axis {
    /// All three axes in x, y, z order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Numeric index of this axis (x=0, y=1, z=2).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The two axes orthogonal to this one, in ascending order.
    #[inline]
    pub fn others(self) -> [Axis; 2] {
        match self {
            Axis::X => [Axis::Y, Axis::Z],
            Axis::Y => [Axis::X, Axis::Z],
            Axis::Z => [Axis::X, Axis::Y],
        }
    }

    /// Parse a numeric selector. Anything outside 0..=2 is an error.
    pub fn from_index(index: usize) -> Result<Self, Error> {
        match index {
            0 => Ok(Axis::X),
            1 => Ok(Axis::Y),
            2 => Ok(Axis::Z),
            other => Err(Error::UnknownAxis(other.to_string())),
        }
    }

    /// Single character label ('x', 'y' or 'z').
    #[inline]
    pub fn as_char(self) -> char {
        match self {
            Axis::X => 'x',
            Axis::Y => 'y',
            Axis::Z => 'z',
        }
    }
}

impl FromStr for Axis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "x" | "X" => Ok(Axis::X),
            "y" | "Y" => Ok(Axis::Y),
            "z" | "Z" => Ok(Axis::Z),
            other => Err(Error::UnknownAxis(other.to_string())),
        }
    }
}

impl TryFrom<usize> for Axis {
    type Error = Error;

    fn try_from(index: usize) -> Result<Self, Error> {
        Axis::from_index(index)
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
