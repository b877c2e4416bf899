// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt;

use tracing::{debug, warn};

use super::engine::{CompositeEngine, Rectangle};
use super::fixture::TestImage;
use crate::oracle::{
    compose, eval_diff, format, Color, CompositeOp, DiffScales, PixelFormat, Target, TOLERANCE,
};

/// Size-table flag bit: the fixture tiles when sampled out of bounds.
pub const REPEAT: u32 = 0x0100_0000;
const FLAGS: u32 = 0xff00_0000;

/// The combinatorial space the driver enumerates: every destination
/// color x format against every source and mask color x format x size x
/// repeat (plus solid variants), under every component-alpha selector
/// and every operator.
#[derive(Clone, Debug)]
pub struct MatrixConfig {
    /// Premultiplied test colors.
    pub colors: Vec<Color>,
    pub formats: Vec<PixelFormat>,
    /// Fixture edge lengths, optionally tagged with `REPEAT`.
    pub sizes: Vec<u32>,
    pub operators: Vec<CompositeOp>,
    pub target: Target,
    pub scales: DiffScales,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        let colors = [
            Color::WHITE,
            Color::RED,
            Color::GREEN,
            Color::BLUE,
            Color::BLACK,
            Color::new(0.5, 0.0, 0.0, 0.5),
        ];
        MatrixConfig {
            colors: colors.iter().map(|c| c.premultiplied()).collect(),
            formats: vec![
                format::A8,
                format::A8R8G8B8,
                format::X8R8G8B8,
                format::A8B8G8R8,
                format::X8B8G8R8,
                format::B8G8R8A8,
                format::B8G8R8X8,
            ],
            sizes: vec![1, 1 | REPEAT, 10],
            operators: CompositeOp::SUPPORTED.to_vec(),
            target: Target::default(),
            scales: DiffScales::default(),
        }
    }
}

/// Diagnostic record of one divergence between oracle and engine.
#[derive(Clone, Debug)]
pub struct CaseFailure {
    pub op: CompositeOp,
    pub component_alpha: bool,
    pub diff: f64,
    pub got: Color,
    pub expected: Color,
    pub raw: u64,
    pub src_color: Color,
    pub src_desc: String,
    pub mask: Option<(Color, String)>,
    pub dst_color: Color,
    pub dst_desc: String,
}

impl fmt::Display for CaseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {}composite test error of {:.4} --",
            self.op,
            if self.component_alpha { "CA " } else { "" },
            self.diff
        )?;
        writeln!(f, "           R    G    B    A")?;
        writeln!(f, "got:       {} [{:08x}]", self.got, self.raw)?;
        writeln!(f, "expected:  {}", self.expected)?;
        writeln!(f, "src color: {}", self.src_color)?;
        if let Some((color, _)) = &self.mask {
            writeln!(f, "msk color: {}", color)?;
        }
        writeln!(f, "dst color: {}", self.dst_color)?;
        write!(f, "src: {}, ", self.src_desc)?;
        if let Some((_, desc)) = &self.mask {
            write!(f, "mask: {}, ", desc)?;
        }
        write!(f, "dst: {}", self.dst_desc)
    }
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub total: u64,
    pub passed: u64,
    pub failures: Vec<CaseFailure>,
}

impl RunSummary {
    pub fn failed(&self) -> u64 {
        self.total - self.passed
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}

impl MatrixConfig {
    /// Closed form of the case count `run` produces, used as a sanity
    /// check that no enumeration bound regressed.
    pub fn expected_case_count(&self) -> u64 {
        let colors = self.colors.len() as u64;
        let formats = self.formats.len() as u64;
        let sizes = self.sizes.len() as u64;
        let ops = self.operators.len() as u64;

        let dst_count = colors * formats;
        let input_count = colors + sizes * colors * formats;
        dst_count * input_count * input_count * 3 * ops
    }

    fn image_for_index<E: CompositeEngine>(&self, engine: &mut E, index: i64) -> TestImage<E> {
        if index < 0 {
            return TestImage::solid(engine, self.colors[(-index - 1) as usize]);
        }
        let index = index as usize;
        let sizes = self.sizes.len();
        let formats = self.formats.len();

        let color = self.colors[index / sizes / formats];
        let fmt = self.formats[index / sizes % formats];
        let size = self.sizes[index % sizes];
        TestImage::bits(
            engine,
            color,
            fmt,
            size & !FLAGS,
            size & REPEAT != 0,
        )
    }

    /// Runs one comparison: composite through the engine, recompute
    /// through the oracle, judge by the scaled difference metric.
    ///
    /// The destination fixture is refilled first, so it can be reused
    /// across the inner loops.
    pub fn composite_case<E: CompositeEngine>(
        &self,
        engine: &mut E,
        dst: &mut TestImage<E>,
        op: CompositeOp,
        src: &TestImage<E>,
        mask: Option<&mut TestImage<E>>,
        component_alpha: bool,
    ) -> Result<(), Box<CaseFailure>> {
        let size = dst.size as i32;
        engine.fill_rect(&mut dst.image, dst.color, Rectangle::new(0, 0, size, size));

        let mut expected_mask = None;
        match mask {
            Some(mask) => {
                engine.set_component_alpha(&mut mask.image, component_alpha);
                engine.composite(
                    op,
                    &src.image,
                    Some(&mask.image),
                    &mut dst.image,
                    (0, 0),
                    (0, 0),
                    (0, 0),
                    dst.size,
                    dst.size,
                );

                let mut tmsk = mask.effective_color();
                if !mask.is_solid() {
                    // Ax component-alpha masks expand alpha into all
                    // color channels. Keyed off a zero red width, not
                    // off the alpha-only channel order.
                    let zero_red = mask.format.map(|f| !f.has_color()).unwrap_or(false);
                    if component_alpha && zero_red {
                        tmsk.r = tmsk.a;
                        tmsk.g = tmsk.a;
                        tmsk.b = tmsk.a;
                    }
                }
                expected_mask = Some((tmsk, mask.describe(), mask.color));
            }
            None => {
                engine.composite(
                    op,
                    &src.image,
                    None,
                    &mut dst.image,
                    (0, 0),
                    (0, 0),
                    (0, 0),
                    dst.size,
                    dst.size,
                );
            }
        }

        let dst_format = dst.format.expect("destination must be buffer-backed");
        let raw = engine.read_pixel(&dst.image);
        let got = dst_format.decode(raw, self.target);

        let tdst = dst.effective_color();
        let tsrc = src.effective_color();
        let expected = dst_format.quantize(compose(
            op,
            tsrc,
            expected_mask.as_ref().map(|(c, _, _)| *c),
            tdst,
            component_alpha,
        ));

        let diff = eval_diff(expected, got, self.scales);
        if diff <= TOLERANCE {
            Ok(())
        } else {
            Err(Box::new(CaseFailure {
                op,
                component_alpha,
                diff,
                got,
                expected,
                raw,
                src_color: src.color,
                src_desc: src.describe(),
                mask: expected_mask.map(|(_, desc, color)| (color, desc)),
                dst_color: dst.color,
                dst_desc: dst.describe(),
            }))
        }
    }

    /// Enumerates the whole matrix against the given engine.
    ///
    /// Never aborts on a mismatch: every failure is recorded and the
    /// enumeration continues, so one run reports as much as possible.
    pub fn run<E: CompositeEngine>(&self, engine: &mut E) -> RunSummary {
        let mut summary = RunSummary::default();
        let num_combos = (self.colors.len() * self.formats.len()) as i64;
        let input_range = -(self.colors.len() as i64)..self.sizes.len() as i64 * num_combos;

        for d in 0..num_combos {
            let formats = self.formats.len() as i64;
            let mut dst = TestImage::bits(
                engine,
                self.colors[(d / formats) as usize],
                self.formats[(d % formats) as usize],
                1,
                false,
            );
            debug!(
                "destination {}/{}: {} {}",
                d + 1,
                num_combos,
                dst.describe(),
                dst.color
            );

            for s in input_range.clone() {
                let src = self.image_for_index(engine, s);

                for m in input_range.clone() {
                    let mut mask = self.image_for_index(engine, m);

                    // -1: no mask at all; 0: mask without component
                    // alpha; 1: component alpha, where the mask has a
                    // buffer to carry per-channel coverage.
                    for ca in -1i32..=1 {
                        for &op in &self.operators {
                            let result = match ca {
                                -1 => self.composite_case(engine, &mut dst, op, &src, None, false),
                                0 => self.composite_case(
                                    engine,
                                    &mut dst,
                                    op,
                                    &src,
                                    Some(&mut mask),
                                    false,
                                ),
                                _ => {
                                    let component_alpha = !mask.is_solid();
                                    self.composite_case(
                                        engine,
                                        &mut dst,
                                        op,
                                        &src,
                                        Some(&mut mask),
                                        component_alpha,
                                    )
                                }
                            };

                            summary.total += 1;
                            match result {
                                Ok(()) => summary.passed += 1,
                                Err(failure) => {
                                    warn!("{}", failure);
                                    summary.failures.push(*failure);
                                }
                            }
                        }
                    }
                }
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::soft::SoftEngine;

    fn small_config() -> MatrixConfig {
        MatrixConfig {
            colors: vec![
                Color::WHITE.premultiplied(),
                Color::new(0.5, 0.0, 0.0, 0.5).premultiplied(),
            ],
            formats: vec![format::A8R8G8B8, format::A8],
            sizes: vec![1, 1 | REPEAT],
            operators: vec![
                CompositeOp::Over,
                CompositeOp::Saturate,
                CompositeOp::DisjointAtop,
                CompositeOp::ConjointXor,
            ],
            target: Target::LITTLE32,
            scales: DiffScales::default(),
        }
    }

    #[test]
    fn test_case_count_matches_formula() {
        let config = small_config();
        let mut engine = SoftEngine::new(config.target);
        let summary = config.run(&mut engine);
        assert_eq!(summary.total, config.expected_case_count());
        // 2 colors x 2 formats destinations, (2 + 2*2*2) inputs each
        // for src and mask, 3 selectors, 4 operators.
        assert_eq!(summary.total, 4 * 10 * 10 * 3 * 4);
    }

    #[test]
    fn test_soft_engine_passes_small_matrix() {
        let config = small_config();
        let mut engine = SoftEngine::new(config.target);
        let summary = config.run(&mut engine);
        assert!(
            summary.all_passed(),
            "{} failures, first: {}",
            summary.failed(),
            summary.failures[0]
        );
    }

    #[test]
    fn test_component_alpha_selector_follows_mask_backing() {
        // The third selector enables component alpha only for masks
        // with a buffer to carry per-channel coverage; the flag is
        // derived from the mask that is then handed over mutably.
        let config = MatrixConfig::default();
        let mut engine = SoftEngine::new(config.target);
        let mut dst = TestImage::bits(&mut engine, Color::WHITE, format::A8R8G8B8, 1, false);
        let src = TestImage::solid(&mut engine, Color::RED);

        let mut solid_mask = TestImage::solid(&mut engine, Color::WHITE);
        let ca = !solid_mask.is_solid();
        assert!(!ca);
        config
            .composite_case(
                &mut engine,
                &mut dst,
                CompositeOp::Over,
                &src,
                Some(&mut solid_mask),
                ca,
            )
            .expect("solid mask without component alpha");

        let mut bits_mask = TestImage::bits(&mut engine, Color::WHITE, format::A8, 1, false);
        let ca = !bits_mask.is_solid();
        assert!(ca);
        config
            .composite_case(
                &mut engine,
                &mut dst,
                CompositeOp::Over,
                &src,
                Some(&mut bits_mask),
                ca,
            )
            .expect("buffer mask with component alpha");
    }

    #[test]
    fn test_opaque_red_over_white() {
        let config = MatrixConfig::default();
        let mut engine = SoftEngine::new(config.target);

        let mut dst = TestImage::bits(&mut engine, Color::WHITE, format::A8R8G8B8, 1, false);
        let src = TestImage::solid(&mut engine, Color::RED);
        config
            .composite_case(&mut engine, &mut dst, CompositeOp::Over, &src, None, false)
            .expect("opaque red OVER white must fully occlude");
    }

    #[test]
    fn test_clear_on_alphaless_destination() {
        let config = MatrixConfig::default();
        let mut engine = SoftEngine::new(config.target);

        // CLEAR computes zero in every channel, but an x8r8g8b8
        // destination has no alpha bits, so the expected alpha snaps
        // back to fully opaque.
        let mut dst = TestImage::bits(&mut engine, Color::BLUE, format::X8R8G8B8, 1, false);
        let src = TestImage::solid(&mut engine, Color::GREEN);
        config
            .composite_case(&mut engine, &mut dst, CompositeOp::Clear, &src, None, false)
            .expect("CLEAR into x8r8g8b8");

        let raw = engine.read_pixel(&dst.image);
        let got = format::X8R8G8B8.decode(raw, config.target);
        assert_eq!(got, Color::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_failure_report_contains_context() {
        let failure = CaseFailure {
            op: CompositeOp::DisjointXor,
            component_alpha: true,
            diff: 12.5,
            got: Color::BLACK,
            expected: Color::WHITE,
            raw: 0xff000000,
            src_color: Color::RED,
            src_desc: "solid".to_owned(),
            mask: Some((Color::WHITE, "a8 10x10R".to_owned())),
            dst_color: Color::BLUE,
            dst_desc: "a8r8g8b8 1x1".to_owned(),
        };
        let text = failure.to_string();
        assert!(text.contains("DISJOINT_XOR CA composite"));
        assert!(text.contains("12.5000"));
        assert!(text.contains("[ff000000]"));
        assert!(text.contains("mask: a8 10x10R"));
    }
}
