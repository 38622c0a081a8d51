//! Core types for the expense pattern classifier

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::models::MONTHS_PER_YEAR;

/// How the representative monthly figure was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Annual total missing or not positive
    NoData,
    /// Annual total known but no monthly detail
    Fallback,
    /// Monthly detail present but every month is zero
    NoExpenses,
    /// Sparse spending: monthly set-aside for an irregular annual cost
    OccasionalBudget,
    /// Spending recurs through most of the year
    FullYear,
    /// Spending concentrated in part of the year
    Seasonal,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::NoData => "no_data",
            Method::Fallback => "fallback",
            Method::NoExpenses => "no_expenses",
            Method::OccasionalBudget => "occasional_budget",
            Method::FullYear => "full_year",
            Method::Seasonal => "seasonal",
        }
    }

    /// Human-readable label for tables and tooltips
    pub fn label(&self) -> &'static str {
        match self {
            Method::NoData => "No data",
            Method::Fallback => "Annual average",
            Method::NoExpenses => "No expenses",
            Method::OccasionalBudget => "Occasional (budget)",
            Method::FullYear => "Full year",
            Method::Seasonal => "Seasonal",
        }
    }

    /// Sentinel methods describe degenerate input rather than a computation,
    /// so they cannot be forced.
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Method::NoData | Method::Fallback | Method::NoExpenses)
    }

    /// Methods that can be requested through [`ClassifyOptions::forced_method`]
    pub fn forceable() -> &'static [Method] {
        &[Method::OccasionalBudget, Method::FullYear, Method::Seasonal]
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "no_data" => Ok(Method::NoData),
            "fallback" => Ok(Method::Fallback),
            "no_expenses" => Ok(Method::NoExpenses),
            "occasional_budget" | "occasional" => Ok(Method::OccasionalBudget),
            "full_year" => Ok(Method::FullYear),
            "seasonal" => Ok(Method::Seasonal),
            _ => Err(format!("Unknown method: {}", s)),
        }
    }
}

/// Qualitative confidence in the computed average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReliabilityLevel {
    #[serde(rename = "high")]
    High,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "n/a")]
    NotApplicable,
}

impl ReliabilityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReliabilityLevel::High => "high",
            ReliabilityLevel::Medium => "medium",
            ReliabilityLevel::Low => "low",
            ReliabilityLevel::NotApplicable => "n/a",
        }
    }
}

impl fmt::Display for ReliabilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reliability label plus a short rationale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reliability {
    pub level: ReliabilityLevel,
    pub note: String,
}

impl Reliability {
    pub fn new(level: ReliabilityLevel, note: impl Into<String>) -> Self {
        Self {
            level,
            note: note.into(),
        }
    }
}

/// Outcome of classifying one annual expense pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Representative monthly amount, rounded to two decimals
    pub average: f64,
    pub method: Method,
    pub explanation: String,
    pub reliability: Reliability,
    pub is_occasional: bool,
    /// Summary of the detected shape, e.g. "1 of 12 months active (8%)"
    pub pattern: String,
}

/// Per-call classifier options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyOptions {
    /// Skip mode selection and use this computation directly
    #[serde(default)]
    pub forced_method: Option<Method>,
}

impl ClassifyOptions {
    pub fn forced(method: Method) -> Self {
        Self {
            forced_method: Some(method),
        }
    }
}

/// Tunable cutoffs used by pattern analysis and mode selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    /// Active-month share at or below which spending counts as occasional
    pub sparsity_threshold: f64,
    /// max/min ratio above which active amounts count as highly variable
    pub variability_ratio: f64,
    /// Multiple of the active-month mean above which a month is an outlier
    pub outlier_factor: f64,
    /// Active-month count at or below which variability alone marks spending occasional
    pub occasional_max_active_months: u8,
    /// Active-month count from which spending is treated as full-year
    pub full_year_min_active_months: u8,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            sparsity_threshold: 0.25,
            variability_ratio: 2.5,
            outlier_factor: 2.0,
            occasional_max_active_months: 3,
            full_year_min_active_months: 9,
        }
    }
}

impl ClassifierThresholds {
    /// Reject combinations that would make mode selection meaningless
    pub fn validate(&self) -> Result<()> {
        if !(self.sparsity_threshold > 0.0 && self.sparsity_threshold <= 1.0) {
            return Err(Error::Config(format!(
                "sparsity_threshold must be in (0, 1], got {}",
                self.sparsity_threshold
            )));
        }
        if !(self.variability_ratio > 1.0) {
            return Err(Error::Config(format!(
                "variability_ratio must be greater than 1, got {}",
                self.variability_ratio
            )));
        }
        if !(self.outlier_factor > 1.0) {
            return Err(Error::Config(format!(
                "outlier_factor must be greater than 1, got {}",
                self.outlier_factor
            )));
        }
        for (name, value) in [
            (
                "occasional_max_active_months",
                self.occasional_max_active_months,
            ),
            (
                "full_year_min_active_months",
                self.full_year_min_active_months,
            ),
        ] {
            if !(1..=MONTHS_PER_YEAR).contains(&value) {
                return Err(Error::Config(format!(
                    "{} must be between 1 and {}, got {}",
                    name, MONTHS_PER_YEAR, value
                )));
            }
        }
        if self.occasional_max_active_months >= self.full_year_min_active_months {
            return Err(Error::Config(format!(
                "occasional_max_active_months ({}) must be below full_year_min_active_months ({})",
                self.occasional_max_active_months, self.full_year_min_active_months
            )));
        }
        Ok(())
    }
}
