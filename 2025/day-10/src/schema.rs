use bitvec::prelude::*;

/// A bit vector backed by `usize` words with Least Significant Bit first ordering.
pub type Row = BitVec<usize, Lsb0>;

/// One parsed input line: `[.##.] (1,3) (2) {3,5,4}`.
///
/// Both puzzles read the same line but use disjoint parts of it, so the
/// machine hands out two independent schemas instead of one merged model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    /// Indicator diagram, `#` = on.
    pub lights: Vec<bool>,
    /// Counter indices listed by each button, in input order.
    pub wiring: Vec<Vec<usize>>,
    /// Joltage targets, one per counter.
    pub joltages: Vec<u64>,
}

impl Machine {
    pub fn light_schema(&self) -> LightSchema {
        let len = self.lights.len();
        let buttons = self
            .wiring
            .iter()
            .map(|idxs| {
                let mut row = Row::repeat(false, len);
                for &i in idxs {
                    row.set(i, true);
                }
                row
            })
            .collect();
        LightSchema {
            target: self.lights.iter().copied().collect(),
            buttons,
        }
    }

    pub fn joltage_schema(&self) -> JoltageSchema {
        let counters = self.joltages.len();
        let buttons = self
            .wiring
            .iter()
            .map(|idxs| {
                let mut weights = vec![0; counters];
                for &i in idxs {
                    weights[i] += 1;
                }
                Button::new(weights)
            })
            .collect();
        JoltageSchema::new(buttons, self.joltages.clone())
    }
}

/// Toggle puzzle: every press XORs the button mask into the lights.
#[derive(Debug, Clone)]
pub struct LightSchema {
    /// Target configuration (b vector)
    pub target: Row,
    /// Button configurations (A matrix columns)
    pub buttons: Vec<Row>,
}

/// A button of the joltage puzzle: how much one press adds to each counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    weights: Vec<u32>,
}

impl Button {
    pub fn new(weights: Vec<u32>) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &[u32] {
        &self.weights
    }

    pub fn weight(&self, counter: usize) -> u32 {
        self.weights[counter]
    }

    /// Most presses this button can take before overshooting some counter it
    /// feeds. A button that feeds nothing never helps, so its bound is 0.
    pub fn upper_bound(&self, targets: &[u64]) -> u64 {
        self.weights
            .iter()
            .zip(targets)
            .filter(|&(&w, _)| w > 0)
            .map(|(&w, &t)| t / u64::from(w))
            .min()
            .unwrap_or(0)
    }
}

/// Additive puzzle: presses accumulate into counters that must hit their
/// targets exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoltageSchema {
    buttons: Vec<Button>,
    targets: Vec<u64>,
}

impl JoltageSchema {
    /// Panics when a button's weight vector does not have one entry per counter.
    pub fn new(buttons: Vec<Button>, targets: Vec<u64>) -> Self {
        assert!(
            buttons.iter().all(|b| b.weights.len() == targets.len()),
            "every button needs one weight per counter"
        );
        Self { buttons, targets }
    }

    pub fn from_weights(weights: &[Vec<u32>], targets: Vec<u64>) -> Self {
        Self::new(
            weights.iter().cloned().map(Button::new).collect(),
            targets,
        )
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    pub fn targets(&self) -> &[u64] {
        &self.targets
    }

    pub fn counters(&self) -> usize {
        self.targets.len()
    }

    pub fn upper_bounds(&self) -> Vec<u64> {
        self.buttons
            .iter()
            .map(|b| b.upper_bound(&self.targets))
            .collect()
    }
}

/// Press counts per button, in the schema's original button order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    presses: Vec<u64>,
}

impl Solution {
    pub fn new(presses: Vec<u64>) -> Self {
        Self { presses }
    }

    pub fn presses(&self) -> &[u64] {
        &self.presses
    }

    pub fn total(&self) -> u64 {
        self.presses.iter().sum()
    }

    /// Whether pressing the buttons this many times reproduces the targets.
    pub fn satisfies(&self, schema: &JoltageSchema) -> bool {
        if self.presses.len() != schema.buttons.len() {
            return false;
        }
        (0..schema.counters()).all(|c| {
            let sum: u128 = schema
                .buttons
                .iter()
                .zip(&self.presses)
                .map(|(b, &p)| u128::from(b.weight(c)) * u128::from(p))
                .sum();
            sum == u128::from(schema.targets[c])
        })
    }
}
