//! Category averages report
//!
//! Applies the expense pattern classifier to every category of a backend
//! expense summary and totals the result into a monthly budget.

use serde::Serialize;
use tracing::debug;

use crate::classifier::{round2, ClassificationResult, ClassifyOptions, ExpenseClassifier, Method};
use crate::format::CurrencyFormat;
use crate::models::{CategoryExpenses, ExpenseSummary};

/// Classified monthly figure for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAverage {
    pub category: String,
    pub subject: Option<String>,
    pub total_expense: f64,
    pub result: ClassificationResult,
    /// Display string for `result.average`, filled by [`AveragesReport::format_amounts`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_average: Option<String>,
}

/// Averages for every category of one year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AveragesReport {
    pub year: i32,
    /// Sorted by average, highest first
    pub categories: Vec<CategoryAverage>,
    /// Sum of all category averages
    pub monthly_budget: f64,
    /// Categories classified as occasional spending
    pub occasional_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_monthly_budget: Option<String>,
}

impl AveragesReport {
    /// Fill the display strings using a currency format
    pub fn format_amounts(&mut self, fmt: &CurrencyFormat) {
        for category in &mut self.categories {
            category.formatted_average = Some(fmt.format(category.result.average));
        }
        self.formatted_monthly_budget = Some(fmt.format(self.monthly_budget));
    }

    /// Categories whose result used the given method
    pub fn with_method(&self, method: Method) -> impl Iterator<Item = &CategoryAverage> {
        self.categories
            .iter()
            .filter(move |c| c.result.method == method)
    }
}

/// Classify every category of a summary
pub fn summarize(
    summary: &ExpenseSummary,
    classifier: &ExpenseClassifier,
    options: &ClassifyOptions,
) -> AveragesReport {
    let rows = merge_duplicates(&summary.categories);

    let mut categories: Vec<CategoryAverage> = rows
        .into_iter()
        .map(|row| {
            let result =
                classifier.classify(row.total_expense, row.monthly_breakdown.as_ref(), options);
            debug!(
                category = %row.category,
                subject = ?row.subject,
                method = %result.method,
                average = result.average,
                "Classified category"
            );
            CategoryAverage {
                category: row.category,
                subject: row.subject,
                total_expense: row.total_expense,
                result,
                formatted_average: None,
            }
        })
        .collect();

    categories.sort_by(|a, b| {
        b.result
            .average
            .partial_cmp(&a.result.average)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
            .then_with(|| a.subject.cmp(&b.subject))
    });

    let monthly_budget = round2(categories.iter().map(|c| c.result.average).sum());
    let occasional_count = categories.iter().filter(|c| c.result.is_occasional).count();

    AveragesReport {
        year: summary.year,
        categories,
        monthly_budget,
        occasional_count,
        formatted_monthly_budget: None,
    }
}

/// Combine rows that share `(category, subject)`, keeping first-seen order
fn merge_duplicates(rows: &[CategoryExpenses]) -> Vec<CategoryExpenses> {
    let mut merged: Vec<CategoryExpenses> = Vec::with_capacity(rows.len());

    for row in rows {
        let existing = merged
            .iter_mut()
            .find(|m| m.category == row.category && m.subject == row.subject);

        match existing {
            Some(target) => {
                target.total_expense += row.total_expense;
                if let Some(from) = &row.monthly_breakdown {
                    match target.monthly_breakdown.as_mut() {
                        Some(into) => into.merge(from),
                        None => target.monthly_breakdown = Some(from.clone()),
                    }
                }
            }
            None => merged.push(row.clone()),
        }
    }

    merged
}
