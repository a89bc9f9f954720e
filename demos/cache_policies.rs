//! Cache policy comparison example.
//!
//! Counts generator invocations for the same access pattern under each
//! cache policy.
//!
//! Usage:
//! ```bash
//! RUST_LOG=debug cargo run --example cache_policies
//! ```

use sequence_engine::prelude::*;
use std::cell::Cell;
use std::rc::Rc;

/// Naturals from 1 with an invocation counter.
fn counted(calls: Rc<Cell<usize>>) -> Source<u64> {
    Source::new(move || {
        let calls = Rc::clone(&calls);
        let mut n = 0u64;
        move || -> Result<Option<u64>> {
            calls.set(calls.get() + 1);
            n += 1;
            Ok(Some(n))
        }
    })
}

fn run(label: &str, builder: SequenceBuilder, reads: &[usize]) -> Result<()> {
    let calls = Rc::new(Cell::new(0));
    let seq = builder.build(counted(Rc::clone(&calls)))?;

    for &i in reads {
        seq.get(i)?;
    }

    let stats = seq.cache_stats();
    println!(
        "  {:<18} calls={:<6} misses={:<4} regenerations={:<3} held={:?}",
        label,
        calls.get(),
        stats.misses,
        stats.regenerations,
        seq.materialized(),
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    println!("Sequence Engine: cache policies\n");
    println!("{}", "=".repeat(72));

    let patterns: [(&str, Vec<usize>); 3] = [
        ("forward scan 0..500", (0..500).collect()),
        ("repeat get(300) x 10", vec![300; 10]),
        ("get(0), get(100), get(0)", vec![0, 100, 0]),
    ];

    for (name, reads) in &patterns {
        println!("\n{name}");
        run("none", SequenceBuilder::new(), reads)?;
        run("memo", SequenceBuilder::new().memo(), reads)?;
        run("memo (batch 8)", SequenceBuilder::new().memo_batch(8), reads)?;
        run("window (5)", SequenceBuilder::new().sliding_window(5), reads)?;
        run("window (64)", SequenceBuilder::new().sliding_window(64), reads)?;
    }

    // =========================================================================
    // Options loaded from TOML
    // =========================================================================
    let options: SequenceOptions = toml::from_str("memo = 16\nfinite = 40")
        .map_err(SequenceError::from)?;
    println!("\nFrom TOML: {}", SequenceBuilder::from_options(&options)?.summary());

    println!("\n{}", "=".repeat(72));
    Ok(())
}
