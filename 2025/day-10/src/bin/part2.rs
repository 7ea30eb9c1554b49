use miette::*;

use aoc2025_day_10::{config::SolverConfig, part2};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let config = SolverConfig::from_env()?;
    let input = include_str!("../../input2.txt");
    let result = part2::process_with(input, &config)?;
    println!("Result: {}", result);
    Ok(())
}
