// SPDX-License-Identifier: GPL-3.0-or-later

use super::engine::{CompositeEngine, Rectangle, Repeat};
use crate::oracle::{Color, PixelFormat};

/// One test input: either a solid color with no backing buffer, or an
/// NxN buffer in a concrete format uniformly filled with the color,
/// optionally tiling when sampled outside its bounds.
///
/// Fixtures are created per test level and dropped before the next
/// sibling iteration, so at most one destination, source and mask exist
/// at a time.
pub struct TestImage<E: CompositeEngine> {
    pub image: E::Image,
    pub color: Color,
    pub format: Option<PixelFormat>,
    pub size: u32,
    pub repeat: bool,
}

impl<E: CompositeEngine> TestImage<E> {
    pub fn solid(engine: &mut E, color: Color) -> Self {
        TestImage {
            image: engine.create_solid(color),
            color,
            format: None,
            size: 0,
            repeat: false,
        }
    }

    pub fn bits(
        engine: &mut E,
        color: Color,
        format: PixelFormat,
        size: u32,
        repeat: bool,
    ) -> Self {
        assert!(size > 0);
        let mut image = engine.create_image(format, size, size);
        engine.fill_rect(
            &mut image,
            color,
            Rectangle::new(0, 0, size as i32, size as i32),
        );
        if repeat {
            engine.set_repeat(&mut image, Repeat::Normal);
        }
        TestImage {
            image,
            color,
            format: Some(format),
            size,
            repeat,
        }
    }

    pub fn is_solid(&self) -> bool {
        self.size == 0
    }

    /// The color the oracle should assume for this input: buffer-backed
    /// images lose precision to their format's grid, solids do not.
    pub fn effective_color(&self) -> Color {
        match self.format {
            Some(format) if !self.is_solid() => format.quantize(self.color),
            _ => self.color,
        }
    }

    pub fn describe(&self) -> String {
        match self.format {
            Some(format) if !self.is_solid() => format!(
                "{} {}x{}{}",
                format,
                self.size,
                self.size,
                if self.repeat { "R" } else { "" }
            ),
            _ => "solid".to_owned(),
        }
    }
}
