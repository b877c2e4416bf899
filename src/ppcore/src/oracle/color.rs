// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt;

/// An RGBA color with unclamped floating point channels.
///
/// Channels are nominally in [0, 1], but premultiplication and operator
/// math may transiently step outside that range; the blend evaluator
/// clamps on the way out.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    pub const RED: Self = Self::new(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Self = Self::new(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Self = Self::new(0.0, 0.0, 1.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Color {
        Color { r, g, b, a }
    }

    /// This color with the color channels multiplied by alpha.
    pub fn premultiplied(&self) -> Color {
        Color {
            r: self.r * self.a,
            g: self.g * self.a,
            b: self.b * self.a,
            a: self.a,
        }
    }

    /// Alpha broadcast into every channel, including alpha itself.
    ///
    /// This is the "source alpha" operand vector the composition model
    /// feeds to the blend evaluator when no mask is present.
    pub fn splat_alpha(&self) -> Color {
        Color {
            r: self.a,
            g: self.a,
            b: self.a,
            a: self.a,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2} {:.2} {:.2} {:.2}",
            self.r, self.g, self.b, self.a
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_premultiplied() {
        let c = Color::new(1.0, 0.5, 0.0, 0.5).premultiplied();
        assert_eq!(c, Color::new(0.5, 0.25, 0.0, 0.5));

        // Opaque colors are unchanged.
        assert_eq!(Color::RED.premultiplied(), Color::RED);
    }

    #[test]
    fn test_splat_alpha() {
        let c = Color::new(0.1, 0.2, 0.3, 0.7).splat_alpha();
        assert_eq!(c, Color::new(0.7, 0.7, 0.7, 0.7));
    }
}
