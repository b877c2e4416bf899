// SPDX-License-Identifier: GPL-3.0-or-later

pub mod engine;
pub mod fixture;
pub mod matrix;
pub mod soft;

pub use engine::{CompositeEngine, Rectangle, Repeat};
pub use fixture::TestImage;
pub use matrix::{CaseFailure, MatrixConfig, RunSummary, REPEAT};
pub use soft::SoftEngine;
