// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::{bail, Result};
use clap::Parser;
use tracing::Level;

use ppcore::harness::{MatrixConfig, SoftEngine, REPEAT};
use ppcore::oracle::{ByteOrder, CompositeOp, Target};

/// Exhaustive differential test of a pixel compositing engine against
/// an exact floating point oracle.
#[derive(Parser)]
#[clap(version, about)]
struct Cli {
    /// Only test the given operators (e.g. OVER,DISJOINT_XOR)
    #[clap(long, value_parser, use_value_delimiter = true)]
    ops: Vec<CompositeOp>,

    /// Only run 1x1 fixtures, skipping the repeat and 10x10 variants
    #[clap(long)]
    quick: bool,

    /// Decode raw pixels as read on a big-endian target
    #[clap(long)]
    big_endian: bool,

    /// Width in bits of a raw pixel read on the target
    #[clap(long, value_parser, default_value_t = 32)]
    word_bits: u32,

    /// Log every test case as it runs
    #[clap(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt::Subscriber::builder()
        .with_max_level(if cli.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .init();

    let mut config = MatrixConfig {
        target: Target {
            byte_order: if cli.big_endian {
                ByteOrder::Big
            } else {
                ByteOrder::Little
            },
            word_bits: cli.word_bits,
        },
        ..MatrixConfig::default()
    };
    if !cli.ops.is_empty() {
        config.operators = cli.ops.clone();
    }
    if cli.quick {
        config.sizes = vec![1];
    } else {
        config.sizes = vec![1, 1 | REPEAT, 10];
    }

    let expected = config.expected_case_count();
    tracing::info!(
        "running {} cases ({} operators, {} formats, {} colors)",
        expected,
        config.operators.len(),
        config.formats.len(),
        config.colors.len()
    );

    let mut engine = SoftEngine::new(config.target);
    let summary = config.run(&mut engine);

    println!(
        "{} of {} composite tests passed ({} failed)",
        summary.passed,
        summary.total,
        summary.failed()
    );
    for failure in &summary.failures {
        println!("{}\n", failure);
    }

    if !summary.all_passed() {
        bail!("{} composite tests failed", summary.failed());
    }
    Ok(())
}
