//! Classify command implementation

use std::path::Path;

use anyhow::{Context, Result};
use nota_core::{ClassificationResult, ClassifyOptions, ConsoleConfig, MonthlyBreakdown};

use super::parse_method;

/// Parse a `MONTH=AMOUNT` argument
pub fn parse_month_arg(arg: &str) -> Result<(u8, f64)> {
    let (month, amount) = arg
        .split_once('=')
        .with_context(|| format!("Invalid month '{}' (expected MONTH=AMOUNT)", arg))?;
    let month: u8 = month
        .trim()
        .parse()
        .with_context(|| format!("Invalid month number in '{}'", arg))?;
    let amount: f64 = amount
        .trim()
        .parse()
        .with_context(|| format!("Invalid amount in '{}'", arg))?;
    Ok((month, amount))
}

/// Build a breakdown from an optional JSON file plus `--month` arguments
///
/// `--month` values replace the file's value for the same month.
/// Returns `None` when neither source is given.
pub fn build_breakdown(months: &[String], file: Option<&Path>) -> Result<Option<MonthlyBreakdown>> {
    let mut breakdown = match file {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let parsed: MonthlyBreakdown = serde_json::from_str(&content)
                .with_context(|| format!("Invalid monthly breakdown in {}", path.display()))?;
            Some(parsed)
        }
        None => None,
    };

    for arg in months {
        let (month, amount) = parse_month_arg(arg)?;
        breakdown
            .get_or_insert_with(MonthlyBreakdown::new)
            .set(month, amount)?;
    }

    Ok(breakdown)
}

/// Classify from command-line arguments
pub fn classify_args(
    console: &ConsoleConfig,
    total: f64,
    months: &[String],
    file: Option<&Path>,
    method: Option<&str>,
) -> Result<ClassificationResult> {
    let breakdown = build_breakdown(months, file)?;
    let options = ClassifyOptions {
        forced_method: parse_method(method)?,
    };
    Ok(console
        .classifier()
        .classify(total, breakdown.as_ref(), &options))
}

pub fn cmd_classify(
    console: &ConsoleConfig,
    total: f64,
    months: &[String],
    file: Option<&Path>,
    method: Option<&str>,
    json: bool,
) -> Result<()> {
    let result = classify_args(console, total, months, file, method)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let currency = console.display.currency_format();
    println!(
        "📊 {}: {} / month",
        result.method.label(),
        currency.format(result.average)
    );
    println!("   Pattern:     {}", result.pattern);
    println!(
        "   Reliability: {} ({})",
        result.reliability.level, result.reliability.note
    );
    println!("   {}", result.explanation);
    if result.is_occasional {
        println!();
        println!("   💡 Occasional cost: budget the monthly set-aside, don't expect it every month");
    }

    Ok(())
}
