// SPDX-License-Identifier: GPL-3.0-or-later

use super::color::Color;
use super::format::PixelFormat;

/// Largest scaled per-channel difference still accepted as agreement
/// between the continuous oracle and a fixed-point engine.
pub const TOLERANCE: f64 = 3.0;

/// Per-channel scale factors for the difference metric, reflecting the
/// quantization granularity assumed for the destination.
///
/// The default assumes a 5-6-5 color layout with a 32-step alpha, which
/// is coarse enough to absorb rounding differences for every 8-bit
/// format as well.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DiffScales {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Default for DiffScales {
    fn default() -> Self {
        DiffScales {
            r: (1 << 5) as f64,
            g: (1 << 6) as f64,
            b: (1 << 5) as f64,
            a: 32.0,
        }
    }
}

impl DiffScales {
    /// Scales matched to a destination format's real bit depths, for
    /// callers that want the metric tighter than the coarse default.
    ///
    /// Absent channels keep the default 32-step scale: their values are
    /// forced constants, so any disagreement there is a whole-channel
    /// error, not a rounding one.
    pub fn for_format(format: PixelFormat) -> DiffScales {
        fn channel(bits: u32) -> f64 {
            if bits == 0 {
                32.0
            } else {
                (1u64 << bits) as f64
            }
        }

        DiffScales {
            r: channel(format.r),
            g: channel(format.g),
            b: channel(format.b),
            a: if format.has_alpha() {
                channel(format.a)
            } else {
                32.0
            },
        }
    }
}

/// Scaled maximum channel distance between an expected and an actual
/// color. Symmetric under swapping the arguments.
pub fn eval_diff(expected: Color, actual: Color, scales: DiffScales) -> f64 {
    let rdiff = (actual.r - expected.r).abs() * scales.r;
    let gdiff = (actual.g - expected.g).abs() * scales.g;
    let bdiff = (actual.b - expected.b).abs() * scales.b;
    let adiff = (actual.a - expected.a).abs() * scales.a;

    rdiff.max(gdiff).max(bdiff).max(adiff)
}

pub fn within_tolerance(expected: Color, actual: Color, scales: DiffScales) -> bool {
    eval_diff(expected, actual, scales) <= TOLERANCE
}
