// SPDX-License-Identifier: GPL-3.0-or-later

use super::blendop::{evaluate, CompositeOp};
use super::color::Color;

/// Reference composition of one premultiplied source pixel over one
/// destination pixel, with an optional mask.
///
/// With no mask the source alpha operand is the source's own alpha,
/// broadcast across all four channels. A plain mask scales both the
/// source value and its alpha by the mask alpha. A component-alpha mask
/// instead modulates each channel by the corresponding mask channel, so
/// every channel gets its own effective source alpha.
///
/// The destination alpha is the real one for all four channel
/// evaluations; alpha is composited like any other channel, against
/// itself.
pub fn compose(
    op: CompositeOp,
    src: Color,
    mask: Option<Color>,
    dst: Color,
    component_alpha: bool,
) -> Color {
    let (srcval, srcalpha) = match mask {
        None => (src, src.splat_alpha()),
        Some(mask) if component_alpha => (
            Color {
                r: src.r * mask.r,
                g: src.g * mask.g,
                b: src.b * mask.b,
                a: src.a * mask.a,
            },
            Color {
                r: src.a * mask.r,
                g: src.a * mask.g,
                b: src.a * mask.b,
                a: src.a * mask.a,
            },
        ),
        Some(mask) => (
            Color {
                r: src.r * mask.a,
                g: src.g * mask.a,
                b: src.b * mask.a,
                a: src.a * mask.a,
            },
            Color {
                r: src.a * mask.a,
                g: src.a * mask.a,
                b: src.a * mask.a,
                a: src.a * mask.a,
            },
        ),
    };

    Color {
        r: evaluate(op, srcval.r, dst.r, srcalpha.r, dst.a),
        g: evaluate(op, srcval.g, dst.g, srcalpha.g, dst.a),
        b: evaluate(op, srcval.b, dst.b, srcalpha.b, dst.a),
        a: evaluate(op, srcval.a, dst.a, srcalpha.a, dst.a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_source_over_occludes() {
        let result = compose(
            CompositeOp::Over,
            Color::RED,
            None,
            Color::WHITE,
            false,
        );
        assert_eq!(result, Color::RED);
    }

    #[test]
    fn test_mask_alpha_scales_source() {
        let mask = Color::new(1.0, 1.0, 1.0, 0.5);
        let result = compose(CompositeOp::Src, Color::RED, Some(mask), Color::BLACK, false);
        assert_eq!(result, Color::new(0.5, 0.0, 0.0, 0.5));
    }

    #[test]
    fn test_component_alpha_mask_is_per_channel() {
        // Each mask channel gates its own source channel.
        let mask = Color::new(1.0, 0.5, 0.0, 1.0);
        let result = compose(
            CompositeOp::Src,
            Color::WHITE,
            Some(mask),
            Color::BLACK,
            true,
        );
        assert_eq!(result, Color::new(1.0, 0.5, 0.0, 1.0));
    }

    #[test]
    fn test_component_alpha_uses_mask_channel_for_alpha_operand() {
        // Under OVER with a half-transparent source, the per-channel
        // effective source alpha is src.a * mask channel, not mask alpha.
        let src = Color::new(0.5, 0.5, 0.5, 0.5); // premultiplied grey
        let mask = Color::new(1.0, 0.0, 1.0, 1.0);
        let dst = Color::new(1.0, 1.0, 1.0, 1.0);
        let result = compose(CompositeOp::Over, src, Some(mask), dst, true);

        // r: 0.5*1 + 1*(1-0.5); g: 0 + 1*(1-0); b same as r.
        assert!((result.r - 1.0).abs() < 1e-12);
        assert!((result.g - 1.0).abs() < 1e-12);
        assert!((result.b - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_alpha_composited_against_destination_alpha() {
        let src = Color::new(0.0, 0.0, 0.0, 0.5);
        let dst = Color::new(0.0, 0.0, 0.0, 0.5);
        let result = compose(CompositeOp::Over, src, None, dst, false);
        assert!((result.a - 0.75).abs() < 1e-12);
    }
}
