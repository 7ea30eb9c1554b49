use chumsky::prelude::*;
use itertools::Itertools;
use tracing::warn;

use crate::error::ParseFailure;
use crate::schema::Machine;

/// Machines read so far, plus the failure that stopped reading, if any.
#[derive(Debug, Default)]
pub struct ParsedInput {
    pub machines: Vec<Machine>,
    pub failure: Option<ParseFailure>,
}

type RawMachine = (Vec<bool>, (Vec<Vec<usize>>, Vec<u64>));

fn machine<'a>() -> impl Parser<'a, &'a str, RawMachine, extra::Err<Rich<'a, char>>> {
    let light = choice((just('.').to(false), just('#').to(true)));

    // [.##.]
    let diagram = light
        .repeated()
        .collect::<Vec<bool>>()
        .delimited_by(just('['), just(']'));

    // (0,2,3)
    let index = text::int(10).try_map(|s: &str, span| {
        s.parse::<usize>()
            .map_err(|e| Rich::custom(span, format!("counter index {s}: {e}")))
    });
    let button = index
        .separated_by(just(','))
        .collect::<Vec<usize>>()
        .delimited_by(just('('), just(')'));

    // {3,5,4,7}
    let joltage = text::int(10).try_map(|s: &str, span| {
        s.parse::<u64>()
            .map_err(|e| Rich::custom(span, format!("joltage {s}: {e}")))
    });
    let joltages = joltage
        .separated_by(just(','))
        .collect::<Vec<u64>>()
        .delimited_by(just('{'), just('}'));

    diagram
        .then(button.repeated().collect::<Vec<_>>().then(joltages))
        .then_ignore(end())
}

/// Parses a single line. Whitespace anywhere in the line is ignored.
pub fn parse_line(line: &str) -> Result<Machine, String> {
    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();

    let (lights, (wiring, joltages)) = machine()
        .parse(compact.as_str())
        .into_result()
        .map_err(|errs| errs.iter().map(ToString::to_string).join("; "))?;

    if lights.len() != joltages.len() {
        return Err(format!(
            "{} lights but {} joltage targets",
            lights.len(),
            joltages.len()
        ));
    }
    let counters = joltages.len();
    if let Some(bad) = wiring.iter().flatten().find(|&&i| i >= counters) {
        return Err(format!(
            "button wired to counter {bad}, but there are only {counters} counters"
        ));
    }

    Ok(Machine {
        lights,
        wiring,
        joltages,
    })
}

/// Reads machines line by line, stopping at the first malformed line.
///
/// Blank lines are skipped. Machines parsed before a failure are kept.
#[tracing::instrument(skip(input))]
pub fn parse_machines(input: &str) -> ParsedInput {
    let mut parsed = ParsedInput::default();

    for (idx, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Ok(machine) => parsed.machines.push(machine),
            Err(message) => {
                let failure = ParseFailure {
                    line: idx + 1,
                    message,
                };
                warn!(%failure, kept = parsed.machines.len(), "stopped reading input");
                parsed.failure = Some(failure);
                break;
            }
        }
    }

    parsed
}
