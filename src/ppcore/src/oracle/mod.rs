// SPDX-License-Identifier: GPL-3.0-or-later

pub mod blendop;
pub mod color;
pub mod compose;
pub mod diff;
pub mod format;

pub use blendop::CompositeOp;
pub use color::Color;
pub use compose::compose;
pub use diff::{eval_diff, DiffScales, TOLERANCE};
pub use format::{ByteOrder, ChannelOrder, PixelFormat, Target};
