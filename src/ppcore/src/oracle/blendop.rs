// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt;
use std::str::FromStr;

use num_enum::IntoPrimitive;
use num_enum::TryFromPrimitive;

/// Porter-Duff compositing operators, numbered the way render protocols
/// number them: plain operators in 0x00-0x0d, the disjoint family in
/// 0x10-0x1b, the conjoint family in 0x20-0x2b and the non-separable
/// blend modes from 0x30 up.
///
/// The non-separable modes are enumerable so operator tables can carry
/// them, but the evaluator has no formula for them and aborts if one
/// reaches it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum CompositeOp {
    Clear = 0x00,
    Src,
    Dst,
    Over,
    OverReverse,
    In,
    InReverse,
    Out,
    OutReverse,
    Atop,
    AtopReverse,
    Xor,
    Add,
    Saturate,

    DisjointClear = 0x10,
    DisjointSrc,
    DisjointDst,
    DisjointOver,
    DisjointOverReverse,
    DisjointIn,
    DisjointInReverse,
    DisjointOut,
    DisjointOutReverse,
    DisjointAtop,
    DisjointAtopReverse,
    DisjointXor,

    ConjointClear = 0x20,
    ConjointSrc,
    ConjointDst,
    ConjointOver,
    ConjointOverReverse,
    ConjointIn,
    ConjointInReverse,
    ConjointOut,
    ConjointOutReverse,
    ConjointAtop,
    ConjointAtopReverse,
    ConjointXor,

    Multiply = 0x30,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    HslHue,
    HslSaturation,
    HslColor,
    HslLuminosity,
}

/// Which of the two input alphas a coefficient rule divides by.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Leg {
    Src,
    Dst,
}

impl Leg {
    fn own_other(self, srca: f64, dsta: f64) -> (f64, f64) {
        match self {
            Leg::Src => (srca, dsta),
            Leg::Dst => (dsta, srca),
        }
    }
}

/// A blend coefficient rule. The rational rules all have a removable
/// singularity at their own alpha = 0; the interpreter substitutes the
/// limit value instead of dividing.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Coeff {
    Zero,
    One,
    SrcAlpha,
    DstAlpha,
    OneMinusSrcAlpha,
    OneMinusDstAlpha,
    /// min(1, (1 - otherA) / ownA), with limit 1.
    DisjointOut(Leg),
    /// max(0, 1 - (1 - otherA) / ownA), with limit 0.
    DisjointIn(Leg),
    /// min(1, otherA / ownA), with limit 1.
    ConjointIn(Leg),
    /// max(0, 1 - otherA / ownA), with limit 0.
    ConjointOut(Leg),
}

impl Coeff {
    fn eval(self, srca: f64, dsta: f64) -> f64 {
        match self {
            Coeff::Zero => 0.0,
            Coeff::One => 1.0,
            Coeff::SrcAlpha => srca,
            Coeff::DstAlpha => dsta,
            Coeff::OneMinusSrcAlpha => 1.0 - srca,
            Coeff::OneMinusDstAlpha => 1.0 - dsta,
            Coeff::DisjointOut(leg) => {
                let (own, other) = leg.own_other(srca, dsta);
                if own == 0.0 {
                    1.0
                } else {
                    ((1.0 - other) / own).min(1.0)
                }
            }
            Coeff::DisjointIn(leg) => {
                let (own, other) = leg.own_other(srca, dsta);
                if own == 0.0 {
                    0.0
                } else {
                    (1.0 - (1.0 - other) / own).max(0.0)
                }
            }
            Coeff::ConjointIn(leg) => {
                let (own, other) = leg.own_other(srca, dsta);
                if own == 0.0 {
                    1.0
                } else {
                    (other / own).min(1.0)
                }
            }
            Coeff::ConjointOut(leg) => {
                let (own, other) = leg.own_other(srca, dsta);
                if own == 0.0 {
                    0.0
                } else {
                    (1.0 - other / own).max(0.0)
                }
            }
        }
    }
}

impl CompositeOp {
    pub const SUPPORTED: [CompositeOp; 38] = [
        CompositeOp::Clear,
        CompositeOp::Src,
        CompositeOp::Dst,
        CompositeOp::Over,
        CompositeOp::OverReverse,
        CompositeOp::In,
        CompositeOp::InReverse,
        CompositeOp::Out,
        CompositeOp::OutReverse,
        CompositeOp::Atop,
        CompositeOp::AtopReverse,
        CompositeOp::Xor,
        CompositeOp::Add,
        CompositeOp::Saturate,
        CompositeOp::DisjointClear,
        CompositeOp::DisjointSrc,
        CompositeOp::DisjointDst,
        CompositeOp::DisjointOver,
        CompositeOp::DisjointOverReverse,
        CompositeOp::DisjointIn,
        CompositeOp::DisjointInReverse,
        CompositeOp::DisjointOut,
        CompositeOp::DisjointOutReverse,
        CompositeOp::DisjointAtop,
        CompositeOp::DisjointAtopReverse,
        CompositeOp::DisjointXor,
        CompositeOp::ConjointClear,
        CompositeOp::ConjointSrc,
        CompositeOp::ConjointDst,
        CompositeOp::ConjointOver,
        CompositeOp::ConjointOverReverse,
        CompositeOp::ConjointIn,
        CompositeOp::ConjointInReverse,
        CompositeOp::ConjointOut,
        CompositeOp::ConjointOutReverse,
        CompositeOp::ConjointAtop,
        CompositeOp::ConjointAtopReverse,
        CompositeOp::ConjointXor,
    ];

    /// The (Fa, Fb) coefficient rules for this operator.
    ///
    /// Panics for the non-separable blend modes: an unsupported operator
    /// reaching the evaluator means the operator table outgrew the
    /// oracle, which must never pass silently.
    pub fn coefficients(self) -> (Coeff, Coeff) {
        use CompositeOp::*;

        const SRC_OUT: Coeff = Coeff::DisjointOut(Leg::Src);
        const DST_OUT: Coeff = Coeff::DisjointOut(Leg::Dst);
        const SRC_IN: Coeff = Coeff::DisjointIn(Leg::Src);
        const DST_IN: Coeff = Coeff::DisjointIn(Leg::Dst);
        const C_SRC_IN: Coeff = Coeff::ConjointIn(Leg::Src);
        const C_DST_IN: Coeff = Coeff::ConjointIn(Leg::Dst);
        const C_SRC_OUT: Coeff = Coeff::ConjointOut(Leg::Src);
        const C_DST_OUT: Coeff = Coeff::ConjointOut(Leg::Dst);

        match self {
            Clear | DisjointClear | ConjointClear => (Coeff::Zero, Coeff::Zero),
            Src | DisjointSrc | ConjointSrc => (Coeff::One, Coeff::Zero),
            Dst | DisjointDst | ConjointDst => (Coeff::Zero, Coeff::One),
            Over => (Coeff::One, Coeff::OneMinusSrcAlpha),
            OverReverse => (Coeff::OneMinusDstAlpha, Coeff::One),
            In => (Coeff::DstAlpha, Coeff::Zero),
            InReverse => (Coeff::Zero, Coeff::SrcAlpha),
            Out => (Coeff::OneMinusDstAlpha, Coeff::Zero),
            OutReverse => (Coeff::Zero, Coeff::OneMinusSrcAlpha),
            Atop => (Coeff::DstAlpha, Coeff::OneMinusSrcAlpha),
            AtopReverse => (Coeff::OneMinusDstAlpha, Coeff::SrcAlpha),
            Xor => (Coeff::OneMinusDstAlpha, Coeff::OneMinusSrcAlpha),
            Add => (Coeff::One, Coeff::One),

            Saturate | DisjointOverReverse => (SRC_OUT, Coeff::One),
            DisjointOver => (Coeff::One, DST_OUT),
            DisjointIn => (SRC_IN, Coeff::Zero),
            DisjointInReverse => (Coeff::Zero, DST_IN),
            DisjointOut => (SRC_OUT, Coeff::Zero),
            DisjointOutReverse => (Coeff::Zero, DST_OUT),
            DisjointAtop => (SRC_IN, DST_OUT),
            DisjointAtopReverse => (SRC_OUT, DST_IN),
            DisjointXor => (SRC_OUT, DST_OUT),

            ConjointOver => (Coeff::One, C_DST_OUT),
            ConjointOverReverse => (C_SRC_OUT, Coeff::One),
            ConjointIn => (C_SRC_IN, Coeff::Zero),
            ConjointInReverse => (Coeff::Zero, C_DST_IN),
            ConjointOut => (C_SRC_OUT, Coeff::Zero),
            ConjointOutReverse => (Coeff::Zero, C_DST_OUT),
            ConjointAtop => (C_SRC_IN, C_DST_OUT),
            ConjointAtopReverse => (C_SRC_OUT, C_DST_IN),
            ConjointXor => (C_SRC_OUT, C_DST_OUT),

            op => panic!("no separable blend formula for operator {}", op),
        }
    }

    pub fn name(self) -> &'static str {
        use CompositeOp::*;
        match self {
            Clear => "CLEAR",
            Src => "SRC",
            Dst => "DST",
            Over => "OVER",
            OverReverse => "OVER_REVERSE",
            In => "IN",
            InReverse => "IN_REVERSE",
            Out => "OUT",
            OutReverse => "OUT_REVERSE",
            Atop => "ATOP",
            AtopReverse => "ATOP_REVERSE",
            Xor => "XOR",
            Add => "ADD",
            Saturate => "SATURATE",
            DisjointClear => "DISJOINT_CLEAR",
            DisjointSrc => "DISJOINT_SRC",
            DisjointDst => "DISJOINT_DST",
            DisjointOver => "DISJOINT_OVER",
            DisjointOverReverse => "DISJOINT_OVER_REVERSE",
            DisjointIn => "DISJOINT_IN",
            DisjointInReverse => "DISJOINT_IN_REVERSE",
            DisjointOut => "DISJOINT_OUT",
            DisjointOutReverse => "DISJOINT_OUT_REVERSE",
            DisjointAtop => "DISJOINT_ATOP",
            DisjointAtopReverse => "DISJOINT_ATOP_REVERSE",
            DisjointXor => "DISJOINT_XOR",
            ConjointClear => "CONJOINT_CLEAR",
            ConjointSrc => "CONJOINT_SRC",
            ConjointDst => "CONJOINT_DST",
            ConjointOver => "CONJOINT_OVER",
            ConjointOverReverse => "CONJOINT_OVER_REVERSE",
            ConjointIn => "CONJOINT_IN",
            ConjointInReverse => "CONJOINT_IN_REVERSE",
            ConjointOut => "CONJOINT_OUT",
            ConjointOutReverse => "CONJOINT_OUT_REVERSE",
            ConjointAtop => "CONJOINT_ATOP",
            ConjointAtopReverse => "CONJOINT_ATOP_REVERSE",
            ConjointXor => "CONJOINT_XOR",
            Multiply => "MULTIPLY",
            Screen => "SCREEN",
            Overlay => "OVERLAY",
            Darken => "DARKEN",
            Lighten => "LIGHTEN",
            ColorDodge => "COLOR_DODGE",
            ColorBurn => "COLOR_BURN",
            HardLight => "HARD_LIGHT",
            SoftLight => "SOFT_LIGHT",
            Difference => "DIFFERENCE",
            Exclusion => "EXCLUSION",
            HslHue => "HSL_HUE",
            HslSaturation => "HSL_SATURATION",
            HslColor => "HSL_COLOR",
            HslLuminosity => "HSL_LUMINOSITY",
        }
    }
}

impl fmt::Display for CompositeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CompositeOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        for op in 0u8..=0x3eu8 {
            if let Ok(op) = CompositeOp::try_from_primitive(op) {
                if op.name() == upper {
                    return Ok(op);
                }
            }
        }
        Err(format!("unknown operator: {}", s))
    }
}

/// Composite one channel: min(src * Fa + dst * Fb, 1).
///
/// Pure in all four arguments. `srca` is the effective source alpha for
/// this channel (which differs per channel under component alpha), `dsta`
/// the real destination alpha.
pub fn evaluate(op: CompositeOp, src: f64, dst: f64, srca: f64, dsta: f64) -> f64 {
    let (fa, fb) = op.coefficients();
    (src * fa.eval(srca, dsta) + dst * fb.eval(srca, dsta)).min(1.0)
}
