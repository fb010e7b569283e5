//! Dynamic-range compression for visibility values.
//!
//! Raw visibilities span many orders of magnitude and include exact zeros.
//! [`LogCompression`] maps them into a bounded, roughly linear-perceptual
//! range before storage or training use:
//!
//! ```text
//! y = (log10(x + eps) − log10(eps)) / (log10(vmax + eps) − log10(eps))
//! ```
//!
//! optionally remapped to [-1, 1] with `y' = 2y − 1`. The `eps` floor keeps
//! `x = 0` finite (`y ≈ 0`), and the transform is exactly invertible up to
//! floating-point rounding. The `(vmax, eps, sin_out)` triple must travel
//! with transformed data: inversion with different parameters silently
//! produces wrong values. The persisted format carries the triple in its
//! header for this reason (see [`crate::io::format`]).

use serde::{Deserialize, Serialize};

/// Invertible logarithmic range compression.
///
/// Stateless and element-wise; the same instance can be reused across any
/// number of arrays.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogCompression {
    /// Expected maximum raw value (maps to the top of the output range).
    pub vmax: f32,
    /// Small positive floor keeping log10 finite at x = 0.
    pub eps: f32,
    /// If true the output range is [-1, 1] instead of [0, 1].
    pub sin_out: bool,
}

impl Default for LogCompression {
    fn default() -> Self {
        Self {
            vmax: 1.0,
            eps: 1e-7,
            sin_out: false,
        }
    }
}

impl LogCompression {
    /// Create a codec with explicit parameters.
    pub fn new(vmax: f32, eps: f32, sin_out: bool) -> Self {
        Self { vmax, eps, sin_out }
    }

    /// Lower log endpoint, log10(eps).
    #[inline]
    fn y0(&self) -> f32 {
        self.eps.log10()
    }

    /// Upper log endpoint, log10(vmax + eps).
    #[inline]
    fn y1(&self) -> f32 {
        (self.vmax + self.eps).log10()
    }

    /// Compress one value. Monotonically increasing in `x`; tolerates
    /// `x = 0` (maps to ≈0, never -inf).
    #[inline]
    pub fn forward(&self, x: f32) -> f32 {
        let y = ((x + self.eps).log10() - self.y0()) / (self.y1() - self.y0());
        if self.sin_out {
            2.0 * y - 1.0
        } else {
            y
        }
    }

    /// Recover the raw value from a compressed one.
    #[inline]
    pub fn inverse(&self, y: f32) -> f32 {
        let y = if self.sin_out { (y + 1.0) / 2.0 } else { y };
        10f32.powf(y * (self.y1() - self.y0()) + self.y0()) - self.eps
    }

    /// Compress a slice in place, element-wise.
    pub fn forward_slice(&self, values: &mut [f32]) {
        for v in values.iter_mut() {
            *v = self.forward(*v);
        }
    }

    /// Decompress a slice in place, element-wise.
    pub fn inverse_slice(&self, values: &mut [f32]) {
        for v in values.iter_mut() {
            *v = self.inverse(*v);
        }
    }
}
