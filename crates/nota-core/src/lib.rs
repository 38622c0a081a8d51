//! Nota Core Library
//!
//! Shared functionality for the Nota bookkeeping console:
//! - Expense pattern classifier (representative monthly figure per category)
//! - Category averages report built on the classifier
//! - Console configuration with explicit, injectable settings
//! - HTTP client for the bookkeeping backend (system of record)
//! - Locale-aware currency formatting

pub mod averages;
pub mod backend;
pub mod classifier;
pub mod config;
pub mod error;
pub mod format;
pub mod models;

/// Test utilities including mock backend server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use averages::{summarize, AveragesReport, CategoryAverage};
pub use backend::{BackendClient, ExpenseSource, ForwardRequest, ForwardedResponse};
pub use classifier::{
    classify, ClassificationResult, ClassifierThresholds, ClassifyOptions, ExpenseClassifier,
    Method, PatternAnalysis, Reliability, ReliabilityLevel,
};
pub use config::{BackendConfig, ConfigSource, ConsoleConfig, DisplayConfig, FeatureAccess};
pub use error::{Error, Result};
pub use format::CurrencyFormat;
pub use models::{CategoryExpenses, ExpenseSummary, MonthlyBreakdown, MonthlyExpense};
