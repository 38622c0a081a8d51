//! Expense Pattern Classifier
//!
//! Turns an annual expense total plus its monthly breakdown into a single
//! representative monthly figure. The shape of the breakdown decides how that
//! figure is computed:
//!
//! - **Occasional budget** - sparse or spiky spending; the figure is a monthly
//!   set-aside (`total / 12`), not an actual monthly spend
//! - **Full year** - spending in most months; `total / 12`
//! - **Seasonal** - spending concentrated in part of the year;
//!   `total / last active month`
//!
//! Degenerate inputs (no total, no breakdown, all-zero breakdown) map to
//! sentinel methods instead of errors, so callers branch on
//! [`ClassificationResult::method`] and never need error handling.
//!
//! ## Usage
//!
//! ```rust
//! use nota_core::classifier::{classify, ClassifyOptions, Method};
//! use nota_core::models::MonthlyBreakdown;
//!
//! let breakdown = MonthlyBreakdown::new().with_month(3, 2000.0).unwrap();
//! let result = classify(2000.0, Some(&breakdown), &ClassifyOptions::default());
//! assert_eq!(result.method, Method::OccasionalBudget);
//! assert_eq!(result.average, 166.67);
//! ```

pub mod pattern;
pub mod types;

pub use pattern::PatternAnalysis;
pub use types::{
    ClassificationResult, ClassifierThresholds, ClassifyOptions, Method, Reliability,
    ReliabilityLevel,
};

use crate::models::{MonthlyBreakdown, MONTHS_PER_YEAR};

/// Scaled values at or above 2^52 carry no fractional part
const MAX_FRACTIONAL_SCALED: f64 = 4_503_599_627_370_496.0;

/// Round half away from zero to two decimals
///
/// Values too large to carry cents (including those whose scaled form would
/// overflow) are returned unchanged.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if !scaled.is_finite() || scaled.abs() >= MAX_FRACTIONAL_SCALED {
        return value;
    }
    scaled.round() / 100.0
}

/// Classify with the default thresholds
pub fn classify(
    total_expense: f64,
    breakdown: Option<&MonthlyBreakdown>,
    options: &ClassifyOptions,
) -> ClassificationResult {
    ExpenseClassifier::default().classify(total_expense, breakdown, options)
}

/// Expense pattern classifier with configurable thresholds
///
/// Stateless: the same inputs always produce the same result, and a single
/// instance can be shared freely across threads.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExpenseClassifier {
    thresholds: ClassifierThresholds,
}

impl ExpenseClassifier {
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ClassifierThresholds {
        &self.thresholds
    }

    /// Compute the pattern analysis used for mode selection, if any month is active
    pub fn analyze(&self, breakdown: &MonthlyBreakdown) -> Option<PatternAnalysis> {
        PatternAnalysis::analyze(breakdown, &self.thresholds)
    }

    pub fn classify(
        &self,
        total_expense: f64,
        breakdown: Option<&MonthlyBreakdown>,
        options: &ClassifyOptions,
    ) -> ClassificationResult {
        // NaN fails this comparison too
        if !(total_expense > 0.0) {
            return no_data();
        }

        let breakdown = match breakdown {
            Some(b) if !b.is_empty() => b,
            _ => return fallback(total_expense),
        };

        let analysis = match self.analyze(breakdown) {
            Some(a) => a,
            None => return no_expenses(total_expense),
        };

        let computation = options
            .forced_method
            .and_then(Computation::from_method)
            .unwrap_or_else(|| self.select_computation(&analysis));

        match computation {
            Computation::OccasionalBudget => occasional_budget(total_expense, &analysis),
            Computation::FullYear => full_year(total_expense, &analysis),
            Computation::Seasonal => seasonal(total_expense, &analysis),
        }
    }

    /// First matching rule wins: occasional, then full year, then seasonal
    fn select_computation(&self, analysis: &PatternAnalysis) -> Computation {
        if analysis.is_occasional {
            Computation::OccasionalBudget
        } else if analysis.active_months >= self.thresholds.full_year_min_active_months {
            Computation::FullYear
        } else {
            Computation::Seasonal
        }
    }
}

/// Methods that compute an average from an active breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Computation {
    OccasionalBudget,
    FullYear,
    Seasonal,
}

impl Computation {
    /// `None` for sentinel methods, which describe input rather than a computation
    fn from_method(method: Method) -> Option<Self> {
        match method {
            Method::OccasionalBudget => Some(Computation::OccasionalBudget),
            Method::FullYear => Some(Computation::FullYear),
            Method::Seasonal => Some(Computation::Seasonal),
            Method::NoData | Method::Fallback | Method::NoExpenses => None,
        }
    }
}

fn no_data() -> ClassificationResult {
    ClassificationResult {
        average: 0.0,
        method: Method::NoData,
        explanation: "No expense recorded".to_string(),
        reliability: Reliability::new(ReliabilityLevel::NotApplicable, "Nothing to evaluate"),
        is_occasional: false,
        pattern: "no data".to_string(),
    }
}

fn fallback(total_expense: f64) -> ClassificationResult {
    ClassificationResult {
        average: round2(total_expense / f64::from(MONTHS_PER_YEAR)),
        method: Method::Fallback,
        explanation: format!(
            "Annual average without monthly detail ({:.2} / {})",
            total_expense, MONTHS_PER_YEAR
        ),
        reliability: Reliability::new(ReliabilityLevel::Low, "Monthly detail unavailable"),
        is_occasional: false,
        pattern: "no monthly detail".to_string(),
    }
}

fn no_expenses(total_expense: f64) -> ClassificationResult {
    ClassificationResult {
        average: 0.0,
        method: Method::NoExpenses,
        explanation: format!(
            "No monthly expenses recorded against an annual total of {:.2}",
            total_expense
        ),
        reliability: Reliability::new(
            ReliabilityLevel::NotApplicable,
            "Monthly detail does not match the annual total",
        ),
        is_occasional: false,
        pattern: format!("0 of {} months active (0%)", MONTHS_PER_YEAR),
    }
}

fn occasional_budget(total_expense: f64, analysis: &PatternAnalysis) -> ClassificationResult {
    let average = round2(total_expense / f64::from(MONTHS_PER_YEAR));
    ClassificationResult {
        average,
        method: Method::OccasionalBudget,
        explanation: format!(
            "Set aside {:.2} per month to cover an occasional cost of {:.2} a year",
            average, total_expense
        ),
        reliability: Reliability::new(
            ReliabilityLevel::Medium,
            "For budgeting purposes, not an actual monthly spend",
        ),
        is_occasional: true,
        pattern: analysis.describe(),
    }
}

fn full_year(total_expense: f64, analysis: &PatternAnalysis) -> ClassificationResult {
    ClassificationResult {
        average: round2(total_expense / f64::from(MONTHS_PER_YEAR)),
        method: Method::FullYear,
        explanation: format!(
            "Recurring monthly cost: {:.2} spread over {} months",
            total_expense, MONTHS_PER_YEAR
        ),
        reliability: Reliability::new(
            ReliabilityLevel::High,
            "Spending recurs through most of the year",
        ),
        is_occasional: false,
        pattern: analysis.describe(),
    }
}

fn seasonal(total_expense: f64, analysis: &PatternAnalysis) -> ClassificationResult {
    let months = analysis.last_active_month;
    ClassificationResult {
        average: round2(total_expense / f64::from(months)),
        method: Method::Seasonal,
        explanation: format!(
            "Seasonal cost: {:.2} spread over the first {} months of the year",
            total_expense, months
        ),
        reliability: Reliability::new(
            ReliabilityLevel::Medium,
            "Spending concentrated in part of the year",
        ),
        is_occasional: false,
        pattern: analysis.describe(),
    }
}
