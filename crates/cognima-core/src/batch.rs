//! Per-input outcomes of a batch run.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::RetrievalError;

/// The result for one batch input, kept alongside the input itself.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome<I, T> {
    /// Position of the input in the original slice.
    pub index: usize,
    pub input: I,
    pub result: Result<T, RetrievalError>,
}

impl<I, T> BatchOutcome<I, T> {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self.result, Err(RetrievalError::Skipped))
    }
}

/// Tally of a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl BatchSummary {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }
}

/// Every outcome of a batch, in input order.
#[derive(Debug, Clone)]
pub struct BatchReport<I, T> {
    pub outcomes: Vec<BatchOutcome<I, T>>,
    pub elapsed: Duration,
}

impl<I, T> BatchReport<I, T> {
    /// Count successes, failures and skipped inputs.
    #[must_use]
    pub fn summary(&self) -> BatchSummary {
        self.outcomes
            .iter()
            .fold(BatchSummary::default(), |mut acc, outcome| {
                match &outcome.result {
                    Ok(_) => acc.succeeded += 1,
                    Err(RetrievalError::Skipped) => acc.skipped += 1,
                    Err(_) => acc.failed += 1,
                }
                acc
            })
    }

    /// Successful values in input order.
    pub fn successes(&self) -> impl Iterator<Item = (&I, &T)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|value| (&o.input, value)))
    }

    /// Failed inputs with their errors, skipped ones included.
    pub fn failures(&self) -> impl Iterator<Item = (&I, &RetrievalError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|err| (&o.input, err)))
    }
}
