use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use super::types::{CRORE, LAKH};

pub const MIN_EXPENSE_YEAR: u32 = 1;
pub const MAX_EXPENSE_YEAR: u32 = 50;

/// Rejections raised when an expense entry is added.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseError {
    #[error("Please enter a valid year (1-50)")]
    InvalidYear,
    #[error("Please enter a valid amount")]
    InvalidAmount,
}

/// One-off expenses keyed by simulation year, stated in today's money.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EmergencyExpenses {
    entries: BTreeMap<u32, f64>,
}

impl EmergencyExpenses {
    pub fn new() -> Self {
        Self::default()
    }

    /// The schedule every scenario starts with in the web calculator.
    pub fn reference_schedule() -> Self {
        let mut entries = BTreeMap::new();
        for (year, amount) in [
            (5, 5.0 * LAKH),
            (8, 25.0 * LAKH),
            (10, 5.0 * LAKH),
            (15, 5.0 * LAKH),
            (16, 25.0 * LAKH),
            (20, 45.0 * LAKH),
            (25, 30.0 * LAKH),
            (28, CRORE),
        ] {
            entries.insert(year, amount);
        }
        Self { entries }
    }

    /// Registers `amount` for `year`, replacing any amount already there.
    pub fn insert(&mut self, year: u32, amount: f64) -> Result<Option<f64>, ExpenseError> {
        if !(MIN_EXPENSE_YEAR..=MAX_EXPENSE_YEAR).contains(&year) {
            return Err(ExpenseError::InvalidYear);
        }
        if amount.is_nan() || amount <= 0.0 {
            return Err(ExpenseError::InvalidAmount);
        }
        Ok(self.entries.insert(year, amount))
    }

    pub fn remove(&mut self, year: u32) -> Option<f64> {
        self.entries.remove(&year)
    }

    pub fn amount_for(&self, year: u32) -> f64 {
        self.entries.get(&year).copied().unwrap_or(0.0)
    }

    /// Entries in ascending year order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.entries.iter().map(|(&year, &amount)| (year, amount))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
