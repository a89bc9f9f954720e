//! Lazy combinator pipeline example.
//!
//! Builds derived sequences over infinite sources and consumes bounded
//! prefixes of them.
//!
//! Usage:
//! ```bash
//! RUST_LOG=debug cargo run --example basic_pipeline
//! ```

use sequence_engine::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    println!("Sequence Engine: basic pipeline\n");
    println!("{}", "=".repeat(60));

    // =========================================================================
    // 1. Map + take + sum
    // =========================================================================
    let squares = sources::naturals().map(|x| x * x);
    println!("\n1. Squares of 1..=10");
    println!("   elements: {:?}", squares.take(10).to_vec()?);
    println!("   sum:      {}", squares.take(10).sum()?);

    // =========================================================================
    // 2. Filter over an infinite source
    // =========================================================================
    let odd_squares = squares.filter(|x| x % 2 == 1);
    println!("\n2. First five odd squares: {:?}", odd_squares.take(5).to_vec()?);
    println!("   length marker: {}", odd_squares.length());

    // =========================================================================
    // 3. Zip truncates to the shorter operand
    // =========================================================================
    let a = sources::from_vec(vec![1, 2, 3]);
    let b = sources::from_vec(vec![10, 20]);
    let sums = a.zip(&b, |x, y| x + y);
    println!("\n3. zip([1, 2, 3], [10, 20], +) = {:?}", sums.to_vec()?);
    println!("   count = {}", sums.count()?);

    // =========================================================================
    // 4. Reduce and scale over a finite range
    // =========================================================================
    let grid = sources::linspace(0.0, 1.0, 5).scale(10.0);
    println!("\n4. linspace(0, 1, 5) * 10 = {:?}", grid.to_vec()?);
    println!(
        "   max = {:?}",
        grid.reduce(|acc: f64, x| acc.max(x), f64::MIN)?
    );

    // =========================================================================
    // 5. Strict operations refuse infinite sequences
    // =========================================================================
    match sources::naturals().sum() {
        Ok(_) => unreachable!(),
        Err(err) => println!("\n5. naturals().sum() -> {err}"),
    }

    // =========================================================================
    // 6. Restartability
    // =========================================================================
    let mut cursor = squares.restart();
    let first: Vec<u64> = (&mut cursor).take(3).collect::<Result<_>>()?;
    let again = squares.take(3).to_vec()?;
    println!("\n6. Two independent passes: {first:?} / {again:?}");

    println!("\n{}", "=".repeat(60));
    Ok(())
}
