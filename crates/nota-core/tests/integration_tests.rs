//! Integration tests for nota-core
//!
//! These tests exercise the full payload → classify → report workflow.

use nota_core::{
    summarize, ClassifyOptions, ConsoleConfig, CurrencyFormat, ExpenseSummary, Method,
    ReliabilityLevel,
};

/// Backend payload for a small studio's year of expenses
///
/// Covers every classifier outcome:
/// - Affitto: rent paid every month (full year)
/// - Assicurazione RC: single annual premium (occasional)
/// - Riscaldamento: winter months only (seasonal)
/// - Consulenze: two large invoices (occasional)
/// - Bolli: annual total without detail (fallback)
/// - Rimborsi: detail says nothing was spent (no expenses)
/// - Omaggi: nothing at all (no data)
fn studio_payload() -> &'static str {
    r#"{
        "year": 2024,
        "categories": [
            {
                "category": "Affitto",
                "subject": "Immobiliare Rossi",
                "total_expense": 9600.0,
                "monthly_breakdown": {
                    "1": {"expense": 800}, "2": {"expense": 800}, "3": {"expense": 800},
                    "4": {"expense": 800}, "5": {"expense": 800}, "6": {"expense": 800},
                    "7": {"expense": 800}, "8": {"expense": 800}, "9": {"expense": 800},
                    "10": {"expense": 800}, "11": {"expense": 800}, "12": {"expense": 800}
                }
            },
            {
                "category": "Assicurazione RC",
                "total_expense": 1450.0,
                "monthly_breakdown": {"4": {"expense": 1450}}
            },
            {
                "category": "Riscaldamento",
                "total_expense": 1750.0,
                "monthly_breakdown": {
                    "1": {"expense": 420}, "2": {"expense": 380}, "3": {"expense": 300},
                    "11": {"expense": 250}, "12": {"expense": 400}
                }
            },
            {
                "category": "Consulenze",
                "total_expense": 5000.0,
                "monthly_breakdown": {"2": {"expense": 1000}, "9": {"expense": 4000}}
            },
            {
                "category": "Bolli",
                "total_expense": 240.0
            },
            {
                "category": "Rimborsi",
                "total_expense": 300.0,
                "monthly_breakdown": {"5": {"expense": 0}, "6": {"expense": 0}}
            },
            {
                "category": "Omaggi",
                "total_expense": 0
            }
        ]
    }"#
}

#[test]
fn test_full_payload_workflow() {
    let summary: ExpenseSummary = serde_json::from_str(studio_payload()).unwrap();
    assert_eq!(summary.categories.len(), 7);

    let config = ConsoleConfig::default();
    let mut report = summarize(&summary, &config.classifier(), &ClassifyOptions::default());
    report.format_amounts(&config.display.currency_format());

    let method_of = |name: &str| {
        report
            .categories
            .iter()
            .find(|c| c.category == name)
            .map(|c| c.result.method)
            .unwrap()
    };

    assert_eq!(method_of("Affitto"), Method::FullYear);
    assert_eq!(method_of("Assicurazione RC"), Method::OccasionalBudget);
    assert_eq!(method_of("Riscaldamento"), Method::Seasonal);
    assert_eq!(method_of("Consulenze"), Method::OccasionalBudget);
    assert_eq!(method_of("Bolli"), Method::Fallback);
    assert_eq!(method_of("Rimborsi"), Method::NoExpenses);
    assert_eq!(method_of("Omaggi"), Method::NoData);

    // 800 + 120.83 + 145.83 + 416.67 + 20 + 0 + 0
    assert_eq!(report.monthly_budget, 1503.33);
    assert_eq!(report.occasional_count, 2);
    assert_eq!(report.formatted_monthly_budget.as_deref(), Some("1.503,33 €"));

    // Highest average first
    assert_eq!(report.categories[0].category, "Affitto");
    assert_eq!(
        report.categories[0].result.reliability.level,
        ReliabilityLevel::High
    );
}

#[test]
fn test_seasonal_uses_last_active_month() {
    let summary: ExpenseSummary = serde_json::from_str(studio_payload()).unwrap();
    let report = summarize(
        &summary,
        &ConsoleConfig::default().classifier(),
        &ClassifyOptions::default(),
    );

    let heating = report
        .categories
        .iter()
        .find(|c| c.category == "Riscaldamento")
        .unwrap();
    // 1750 / 12 (December is the last active month)
    assert_eq!(heating.result.average, 145.83);
    assert_eq!(heating.result.pattern, "5 of 12 months active (42%)");
}

#[test]
fn test_configured_thresholds_change_outcome() {
    let config = ConsoleConfig::from_toml_str(
        r#"
[classifier]
full_year_min_active_months = 5
"#,
    )
    .unwrap();

    let summary: ExpenseSummary = serde_json::from_str(studio_payload()).unwrap();
    let report = summarize(&summary, &config.classifier(), &ClassifyOptions::default());

    let heating = report
        .categories
        .iter()
        .find(|c| c.category == "Riscaldamento")
        .unwrap();
    assert_eq!(heating.result.method, Method::FullYear);
}

#[test]
fn test_report_serializes_for_api_consumers() {
    let summary: ExpenseSummary = serde_json::from_str(studio_payload()).unwrap();
    let mut report = summarize(
        &summary,
        &ConsoleConfig::default().classifier(),
        &ClassifyOptions::default(),
    );
    report.format_amounts(&CurrencyFormat::new("en-US", "USD"));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["year"], 2024);
    assert_eq!(json["categories"][0]["result"]["method"], "full_year");
    assert_eq!(json["categories"][0]["formatted_average"], "$800.00");
    assert_eq!(json["formatted_monthly_budget"], "$1,503.33");
}

#[test]
fn test_invalid_month_in_payload_is_rejected() {
    let payload = r#"{"year": 2024, "categories": [
        {"category": "X", "total_expense": 10, "monthly_breakdown": {"0": {"expense": 10}}}
    ]}"#;
    let result: Result<ExpenseSummary, _> = serde_json::from_str(payload);
    assert!(result.is_err());
}
