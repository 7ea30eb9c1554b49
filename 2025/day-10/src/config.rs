use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use miette::{miette, IntoDiagnostic, Result, WrapErr};

use crate::error::SolveError;

/// Which algorithm answers the joltage puzzle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Engine {
    /// Integer Gauss-Jordan reduction, then enumeration of the free variables.
    #[default]
    Elimination,
    /// Depth-first search over press counts with reachability pruning.
    BruteForce,
    /// Runs both and fails when they disagree.
    CrossCheck,
}

impl FromStr for Engine {
    type Err = miette::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "elimination" => Ok(Self::Elimination),
            "brute-force" | "bruteforce" => Ok(Self::BruteForce),
            "cross-check" | "crosscheck" => Ok(Self::CrossCheck),
            other => Err(miette!(
                help = "expected one of: elimination, brute-force, cross-check",
                "unknown engine '{}'",
                other
            )),
        }
    }
}

/// Limits on how long a single schema may be searched.
#[derive(Debug, Clone, Default)]
pub struct Budget {
    /// Enumerated assignments (elimination) or visited nodes (brute force).
    pub max_steps: Option<u64>,
    pub timeout: Option<Duration>,
    /// Set to `true` from another thread to abort running searches.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Budget {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn steps(max_steps: u64) -> Self {
        Self {
            max_steps: Some(max_steps),
            ..Self::default()
        }
    }

    pub(crate) fn start(&self) -> Meter<'_> {
        Meter {
            budget: self,
            steps: 0,
            started: Instant::now(),
        }
    }
}

/// Running step count for one search against its [`Budget`].
pub(crate) struct Meter<'a> {
    budget: &'a Budget,
    steps: u64,
    started: Instant,
}

impl Meter<'_> {
    /// Time and cancellation are polled every this many steps.
    const POLL_INTERVAL: u64 = 1024;

    pub(crate) fn tick(&mut self) -> Result<(), SolveError> {
        self.steps += 1;

        let mut exhausted = self.budget.max_steps.is_some_and(|max| self.steps > max);
        if !exhausted && self.steps % Self::POLL_INTERVAL == 0 {
            exhausted = self
                .budget
                .timeout
                .is_some_and(|t| self.started.elapsed() > t)
                || self
                    .budget
                    .cancel
                    .as_ref()
                    .is_some_and(|flag| flag.load(Ordering::Relaxed));
        }

        if exhausted {
            Err(SolveError::BudgetExhausted { steps: self.steps })
        } else {
            Ok(())
        }
    }

    pub(crate) fn steps(&self) -> u64 {
        self.steps
    }
}

#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub engine: Engine,
    pub budget: Budget,
    /// Solve the machines of one input on the rayon pool.
    pub parallel: bool,
    /// Draw a progress bar while solving a batch.
    pub progress: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            engine: Engine::default(),
            budget: Budget::unlimited(),
            parallel: true,
            progress: false,
        }
    }
}

impl SolverConfig {
    pub fn with_engine(engine: Engine) -> Self {
        Self {
            engine,
            ..Self::default()
        }
    }

    /// Defaults overridden by `DAY10_ENGINE`, `DAY10_MAX_STEPS`,
    /// `DAY10_TIMEOUT_MS` and `DAY10_PROGRESS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(engine) = lookup("DAY10_ENGINE") {
            config.engine = engine.parse()?;
        }
        if let Some(steps) = lookup("DAY10_MAX_STEPS") {
            config.budget.max_steps = Some(
                steps
                    .trim()
                    .parse()
                    .into_diagnostic()
                    .wrap_err("DAY10_MAX_STEPS must be a non-negative integer")?,
            );
        }
        if let Some(ms) = lookup("DAY10_TIMEOUT_MS") {
            let ms: u64 = ms
                .trim()
                .parse()
                .into_diagnostic()
                .wrap_err("DAY10_TIMEOUT_MS must be a number of milliseconds")?;
            config.budget.timeout = Some(Duration::from_millis(ms));
        }
        if let Some(progress) = lookup("DAY10_PROGRESS") {
            config.progress = matches!(progress.trim(), "1" | "true" | "yes");
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use rstest::rstest;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[rstest]
    #[case("elimination", Engine::Elimination)]
    #[case("Brute-Force", Engine::BruteForce)]
    #[case(" cross-check ", Engine::CrossCheck)]
    fn parses_engine_names(#[case] name: &str, #[case] expected: Engine) -> Result<()> {
        assert_eq!(name.parse::<Engine>()?, expected);
        Ok(())
    }

    #[test]
    fn reads_overrides() -> Result<()> {
        let config = SolverConfig::from_lookup(lookup(&[
            ("DAY10_ENGINE", "brute-force"),
            ("DAY10_MAX_STEPS", "500"),
            ("DAY10_TIMEOUT_MS", "250"),
            ("DAY10_PROGRESS", "1"),
        ]))?;
        assert_eq!(config.engine, Engine::BruteForce);
        assert_eq!(config.budget.max_steps, Some(500));
        assert_eq!(config.budget.timeout, Some(Duration::from_millis(250)));
        assert!(config.progress);
        assert!(config.parallel);
        Ok(())
    }

    #[test]
    fn rejects_bad_values() {
        assert!(SolverConfig::from_lookup(lookup(&[("DAY10_ENGINE", "simplex")])).is_err());
        assert!(SolverConfig::from_lookup(lookup(&[("DAY10_MAX_STEPS", "-3")])).is_err());
    }

    #[test]
    fn meter_stops_at_step_limit() {
        let budget = Budget::steps(2);
        let mut meter = budget.start();
        assert!(meter.tick().is_ok());
        assert!(meter.tick().is_ok());
        assert_eq!(
            meter.tick(),
            Err(SolveError::BudgetExhausted { steps: 3 })
        );
    }

    #[test]
    fn meter_honours_cancellation() {
        let flag = Arc::new(AtomicBool::new(true));
        let budget = Budget {
            cancel: Some(flag),
            ..Budget::default()
        };
        let mut meter = budget.start();
        let outcome = (0..Meter::POLL_INTERVAL).try_for_each(|_| meter.tick());
        assert!(matches!(outcome, Err(SolveError::BudgetExhausted { .. })));
    }
}
