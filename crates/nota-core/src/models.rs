//! Domain models for Nota
//!
//! These mirror the aggregation payloads served by the bookkeeping backend.
//! The backend is the system of record; nothing here is persisted locally.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of calendar months in an analyzed year
pub const MONTHS_PER_YEAR: u8 = 12;

/// Expense recorded for a single month
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MonthlyExpense {
    #[serde(default)]
    pub expense: f64,
}

/// Month-indexed expense breakdown for one analyzed year
///
/// Keys are calendar months (1-12). Absent months count as zero expense.
/// Keys outside 1-12 are rejected when the breakdown is built or deserialized,
/// so consumers can rely on every stored month being valid.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<u8, MonthlyExpense>",
    into = "BTreeMap<u8, MonthlyExpense>"
)]
pub struct MonthlyBreakdown {
    months: BTreeMap<u8, MonthlyExpense>,
}

impl MonthlyBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a breakdown from twelve amounts, January first
    pub fn from_monthly_amounts(amounts: [f64; 12]) -> Self {
        let months = amounts
            .iter()
            .enumerate()
            .map(|(i, &expense)| (i as u8 + 1, MonthlyExpense { expense }))
            .collect();
        Self { months }
    }

    /// Builder-style variant of [`MonthlyBreakdown::set`]
    pub fn with_month(mut self, month: u8, expense: f64) -> Result<Self> {
        self.set(month, expense)?;
        Ok(self)
    }

    /// Set the expense for a month, replacing any previous value
    pub fn set(&mut self, month: u8, expense: f64) -> Result<()> {
        validate_month(month)?;
        self.months.insert(month, MonthlyExpense { expense });
        Ok(())
    }

    /// Expense for a month (zero when the month is absent)
    pub fn expense(&self, month: u8) -> f64 {
        self.months.get(&month).map(|m| m.expense).unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Number of months present in the breakdown (including zero entries)
    pub fn len(&self) -> usize {
        self.months.len()
    }

    /// Iterate `(month, expense)` pairs in calendar order
    pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.months.iter().map(|(&month, m)| (month, m.expense))
    }

    /// Add another breakdown's expenses month by month
    pub fn merge(&mut self, other: &MonthlyBreakdown) {
        for (month, expense) in other.iter() {
            self.months.entry(month).or_default().expense += expense;
        }
    }
}

fn validate_month(month: u8) -> Result<()> {
    if (1..=MONTHS_PER_YEAR).contains(&month) {
        Ok(())
    } else {
        Err(Error::InvalidData(format!(
            "Month must be between 1 and {}, got {}",
            MONTHS_PER_YEAR, month
        )))
    }
}

impl TryFrom<BTreeMap<u8, MonthlyExpense>> for MonthlyBreakdown {
    type Error = Error;

    fn try_from(months: BTreeMap<u8, MonthlyExpense>) -> Result<Self> {
        for &month in months.keys() {
            validate_month(month)?;
        }
        Ok(Self { months })
    }
}

impl From<MonthlyBreakdown> for BTreeMap<u8, MonthlyExpense> {
    fn from(breakdown: MonthlyBreakdown) -> Self {
        breakdown.months
    }
}

/// Annual expense aggregate for one category (optionally narrowed to a subject)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryExpenses {
    pub category: String,
    /// Counterparty or sub-account the aggregate refers to, if any
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub total_expense: f64,
    #[serde(default)]
    pub monthly_breakdown: Option<MonthlyBreakdown>,
}

/// Response of the backend's monthly expense aggregation endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSummary {
    pub year: i32,
    #[serde(default)]
    pub categories: Vec<CategoryExpenses>,
}
