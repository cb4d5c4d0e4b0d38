use std::cell::OnceCell;

use crate::{
    canvas::Canvas,
    error::{Error, Result},
};

/// Scores rendered canvases against the goal.
///
/// The fitness baseline is the sum of every goal channel byte. It is taken once, on the
/// first difference request, and never recomputed; percentages are only comparable
/// within one run.
#[derive(Debug)]
pub struct Evaluator {
    goal: Canvas,
    baseline: OnceCell<u64>,
}

impl Evaluator {
    pub fn new(goal: Canvas) -> Evaluator {
        Evaluator {
            goal,
            baseline: OnceCell::new(),
        }
    }

    pub fn goal(&self) -> &Canvas {
        &self.goal
    }

    /// Sum of absolute per-channel differences over every pixel.
    pub fn difference(&self, test: &Canvas) -> Result<u64> {
        self.baseline
            .get_or_init(|| max_fitness_baseline(&self.goal));
        difference(test, &self.goal)
    }

    pub fn baseline(&self) -> u64 {
        *self
            .baseline
            .get_or_init(|| max_fitness_baseline(&self.goal))
    }

    /// `(baseline - difference) / baseline * 100`, negative when the test canvas is
    /// further from the goal than the baseline.
    pub fn fitness_percent(&self, difference: u64) -> f64 {
        let baseline = self.baseline();
        if baseline == 0 {
            return if difference == 0 { 100.0 } else { 0.0 };
        }
        (baseline as f64 - difference as f64) / baseline as f64 * 100.0
    }
}

pub fn difference(test: &Canvas, goal: &Canvas) -> Result<u64> {
    if !test.same_size(goal) {
        return Err(Error::DimensionMismatch {
            test_w: test.width(),
            test_h: test.height(),
            goal_w: goal.width(),
            goal_h: goal.height(),
        });
    }
    Ok(test
        .data()
        .iter()
        .zip(goal.data())
        .map(|(&t, &g)| t.abs_diff(g) as u64)
        .sum())
}

pub fn max_fitness_baseline(goal: &Canvas) -> u64 {
    goal.data().iter().map(|&b| b as u64).sum()
}
