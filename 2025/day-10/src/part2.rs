use miette::*;
use tracing::info;

use crate::config::SolverConfig;
use crate::parser::parse_machines;
use crate::schema::JoltageSchema;
use crate::solver::{solve_batch, total_presses};

pub fn process(input: &str) -> Result<String> {
    process_with(input, &SolverConfig::default())
}

#[tracing::instrument(skip(input))]
pub fn process_with(input: &str, config: &SolverConfig) -> Result<String> {
    let parsed = parse_machines(input);
    if let Some(failure) = parsed.failure {
        if parsed.machines.is_empty() {
            return Err(failure).wrap_err("no machines could be read");
        }
    }

    let schemas: Vec<JoltageSchema> = parsed
        .machines
        .iter()
        .map(|m| m.joltage_schema())
        .collect();
    info!(machines = schemas.len(), "solving joltage schemas");

    let outcomes = solve_batch(&schemas, config);
    Ok(total_presses(&outcomes).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    use crate::config::Engine;

    const EXAMPLE: &str = "[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}
[...#.] (0,2,3,4) (2,3) (0,4) (0,1,2) (1,2,3,4) {7,5,12,7,2}
[.###.#] (0,1,2,3,4) (0,3,4) (0,1,2,4,5) (1,2) {10,11,11,5,10,5}";

    #[test]
    fn it_works() -> Result<()> {
        assert_eq!("33", process(EXAMPLE)?);
        Ok(())
    }

    #[rstest]
    #[case(Engine::Elimination)]
    #[case(Engine::BruteForce)]
    #[case(Engine::CrossCheck)]
    fn every_engine_answers_the_example(#[case] engine: Engine) -> Result<()> {
        let config = SolverConfig::with_engine(engine);
        assert_eq!("33", process_with(EXAMPLE, &config)?);
        Ok(())
    }

    #[test]
    fn keeps_machines_before_a_malformed_line() -> Result<()> {
        let input = format!("{}\n[#] this is not a machine\n[#] (0) {{4}}", EXAMPLE);
        assert_eq!("33", process(&input)?);
        Ok(())
    }

    #[test]
    fn skips_unsolvable_machines() -> Result<()> {
        let input = format!("{}\n[.] (0) {{0}}\n[#] {{3}}", EXAMPLE);
        assert_eq!("33", process(&input)?);
        Ok(())
    }
}
