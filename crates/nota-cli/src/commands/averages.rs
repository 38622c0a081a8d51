//! Averages command implementation

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use nota_core::{
    summarize, AveragesReport, BackendClient, ClassifyOptions, ConsoleConfig, ExpenseSource,
};

use super::{parse_method, truncate};

/// Fetch a year's summary from the backend and classify every category
pub async fn fetch_report(
    console: &ConsoleConfig,
    year: Option<i32>,
    token: Option<&str>,
    method: Option<&str>,
) -> Result<AveragesReport> {
    let year = year.unwrap_or_else(|| Utc::now().year());
    let options = ClassifyOptions {
        forced_method: parse_method(method)?,
    };

    let client = BackendClient::new(&console.backend)?;
    let authorization = token.map(|t| format!("Bearer {}", t));
    let summary = client
        .fetch_expense_summary(year, authorization.as_deref())
        .await
        .with_context(|| format!("Failed to fetch expenses for {} from {}", year, client.base_url()))?;

    let mut report = summarize(&summary, &console.classifier(), &options);
    report.format_amounts(&console.display.currency_format());
    Ok(report)
}

pub async fn cmd_averages(
    console: &ConsoleConfig,
    year: Option<i32>,
    token: Option<&str>,
    method: Option<&str>,
    json: bool,
) -> Result<()> {
    let report = fetch_report(console, year, token, method).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("📊 Monthly averages for {}", report.year);
    println!();

    if report.categories.is_empty() {
        println!("No expense categories found.");
        return Ok(());
    }

    println!(
        "{:<30} {:>14} {:<20} {:<11} Pattern",
        "Category", "Average", "Method", "Reliability"
    );
    println!("{}", "-".repeat(100));

    for row in &report.categories {
        let name = match &row.subject {
            Some(subject) => format!("{} / {}", row.category, subject),
            None => row.category.clone(),
        };
        let average = row.formatted_average.clone().unwrap_or_default();
        let marker = if row.result.is_occasional { "*" } else { " " };
        println!(
            "{:<30} {:>14}{} {:<20} {:<11} {}",
            truncate(&name, 30),
            average,
            marker,
            row.result.method.label(),
            row.result.reliability.level.as_str(),
            row.result.pattern
        );
    }

    println!("{}", "-".repeat(100));
    println!(
        "{:<30} {:>14}",
        "Monthly budget",
        report.formatted_monthly_budget.as_deref().unwrap_or_default()
    );
    if report.occasional_count > 0 {
        println!();
        println!(
            "* {} occasional cost(s): the average is a monthly set-aside, not a monthly spend",
            report.occasional_count
        );
    }

    Ok(())
}
