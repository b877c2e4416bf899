// SPDX-License-Identifier: GPL-3.0-or-later

use super::engine::{CompositeEngine, Rectangle, Repeat};
use crate::oracle::{compose, Color, CompositeOp, PixelFormat, Target};

/// A plain scalar software compositor implementing `CompositeEngine`.
///
/// This is the stand-in device the harness runs against when no real
/// engine is wired up: pixels live in packed buffers in their declared
/// formats, so every fill and composite goes through the same
/// quantization a real engine's stores do. It is deliberately
/// unoptimized.
pub struct SoftEngine {
    target: Target,
}

enum Backing {
    Solid(Color),
    Bits {
        format: PixelFormat,
        width: u32,
        height: u32,
        /// Canonically packed pixels (used bits at bit 0).
        pixels: Vec<u64>,
    },
}

pub struct SoftImage {
    backing: Backing,
    repeat: Repeat,
    component_alpha: bool,
}

impl SoftEngine {
    pub fn new(target: Target) -> SoftEngine {
        SoftEngine { target }
    }

    /// Samples an image at the given coordinates. Out-of-bounds reads
    /// are transparent unless the image repeats.
    fn sample(image: &SoftImage, x: i32, y: i32) -> Color {
        match &image.backing {
            Backing::Solid(color) => *color,
            Backing::Bits {
                format,
                width,
                height,
                pixels,
            } => {
                let (w, h) = (*width as i32, *height as i32);
                let (x, y) = match image.repeat {
                    Repeat::Normal => (x.rem_euclid(w), y.rem_euclid(h)),
                    _ => {
                        if x < 0 || y < 0 || x >= w || y >= h {
                            return Color::TRANSPARENT;
                        }
                        (x, y)
                    }
                };
                let packed = pixels[(y * w + x) as usize];
                format.decode(packed, Target::LITTLE32)
            }
        }
    }

    /// The mask color the compositing path sees at the given position.
    ///
    /// Alpha-only buffer masks in component-alpha mode spread their
    /// alpha into every color channel; this follows the red-width-zero
    /// predicate rather than a broader alpha-only rule.
    fn sample_mask(mask: &SoftImage, x: i32, y: i32) -> Color {
        let mut color = Self::sample(mask, x, y);
        if mask.component_alpha {
            if let Backing::Bits { format, .. } = &mask.backing {
                if !format.has_color() {
                    color.r = color.a;
                    color.g = color.a;
                    color.b = color.a;
                }
            }
        }
        color
    }
}

impl CompositeEngine for SoftEngine {
    type Image = SoftImage;

    fn create_image(&mut self, format: PixelFormat, width: u32, height: u32) -> SoftImage {
        SoftImage {
            backing: Backing::Bits {
                format,
                width,
                height,
                pixels: vec![0; (width * height) as usize],
            },
            repeat: Repeat::None,
            component_alpha: false,
        }
    }

    fn create_solid(&mut self, color: Color) -> SoftImage {
        SoftImage {
            backing: Backing::Solid(color),
            repeat: Repeat::None,
            component_alpha: false,
        }
    }

    fn fill_rect(&mut self, image: &mut SoftImage, color: Color, rect: Rectangle) {
        match &mut image.backing {
            Backing::Solid(_) => panic!("fill_rect on a solid image"),
            Backing::Bits {
                format,
                width,
                height,
                pixels,
            } => {
                let packed = format.encode(color, Target::LITTLE32);
                let (w, h) = (*width as i32, *height as i32);
                for y in rect.y.max(0)..(rect.y + rect.h).min(h) {
                    for x in rect.x.max(0)..(rect.x + rect.w).min(w) {
                        pixels[(y * w + x) as usize] = packed;
                    }
                }
            }
        }
    }

    fn set_repeat(&mut self, image: &mut SoftImage, repeat: Repeat) {
        image.repeat = repeat;
    }

    fn set_component_alpha(&mut self, image: &mut SoftImage, enabled: bool) {
        image.component_alpha = enabled;
    }

    #[allow(clippy::too_many_arguments)]
    fn composite(
        &mut self,
        op: CompositeOp,
        src: &SoftImage,
        mask: Option<&SoftImage>,
        dst: &mut SoftImage,
        src_offset: (i32, i32),
        mask_offset: (i32, i32),
        dst_offset: (i32, i32),
        width: u32,
        height: u32,
    ) {
        let (dst_format, dst_w, dst_h) = match &dst.backing {
            Backing::Solid(_) => panic!("composite into a solid image"),
            Backing::Bits {
                format,
                width,
                height,
                ..
            } => (*format, *width as i32, *height as i32),
        };
        let component_alpha = mask.map(|m| m.component_alpha).unwrap_or(false);

        for dy in 0..height as i32 {
            for dx in 0..width as i32 {
                let (x, y) = (dst_offset.0 + dx, dst_offset.1 + dy);
                if x < 0 || y < 0 || x >= dst_w || y >= dst_h {
                    continue;
                }

                let src_color = Self::sample(src, src_offset.0 + dx, src_offset.1 + dy);
                let mask_color =
                    mask.map(|m| Self::sample_mask(m, mask_offset.0 + dx, mask_offset.1 + dy));

                let dst_color = Self::sample(dst, x, y);
                let out = compose(op, src_color, mask_color, dst_color, component_alpha);
                let packed = dst_format.encode(out, Target::LITTLE32);

                if let Backing::Bits { pixels, .. } = &mut dst.backing {
                    pixels[(y * dst_w + x) as usize] = packed;
                }
            }
        }
    }

    fn read_pixel(&self, image: &SoftImage) -> u64 {
        match &image.backing {
            Backing::Solid(_) => panic!("read_pixel on a solid image"),
            Backing::Bits { format, pixels, .. } => {
                // Re-emit the canonical pixel the way a native-word read
                // on the target would see it.
                format.encode(format.decode(pixels[0], Target::LITTLE32), self.target)
            }
        }
    }
}
