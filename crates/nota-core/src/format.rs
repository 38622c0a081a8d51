//! Locale-aware currency formatting for display surfaces

use serde::{Deserialize, Serialize};

use crate::classifier::round2;

/// Languages that write amounts as `1.234,56 €`
const COMMA_DECIMAL_LANGUAGES: &[&str] = &["it", "de", "es", "pt", "nl"];

/// Currency display settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyFormat {
    /// BCP 47 tag, e.g. "it-IT" or "en-US"
    pub locale: String,
    /// ISO 4217 code, e.g. "EUR"
    pub currency: String,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            locale: "it-IT".to_string(),
            currency: "EUR".to_string(),
        }
    }
}

impl CurrencyFormat {
    pub fn new(locale: &str, currency: &str) -> Self {
        Self {
            locale: locale.to_string(),
            currency: currency.to_uppercase(),
        }
    }

    fn uses_comma_decimals(&self) -> bool {
        let language = self
            .locale
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_lowercase();
        COMMA_DECIMAL_LANGUAGES.contains(&language.as_str())
    }

    fn symbol(&self) -> &str {
        match self.currency.as_str() {
            "EUR" => "€",
            "USD" => "$",
            "GBP" => "£",
            other => other,
        }
    }

    /// Format an amount with two decimals, grouping and currency symbol
    pub fn format(&self, amount: f64) -> String {
        let rounded = round2(amount);
        let sign = if rounded < 0.0 { "-" } else { "" };
        let cents = (rounded.abs() * 100.0).round() as u64;
        let (whole, fraction) = (cents / 100, cents % 100);

        let (group_sep, decimal_sep) = if self.uses_comma_decimals() {
            ('.', ',')
        } else {
            (',', '.')
        };
        let number = format!(
            "{}{}{:02}",
            group_thousands(whole, group_sep),
            decimal_sep,
            fraction
        );

        let symbol = self.symbol();
        if self.uses_comma_decimals() {
            format!("{}{} {}", sign, number, symbol)
        } else if symbol.chars().count() > 1 {
            format!("{}{} {}", sign, symbol, number)
        } else {
            format!("{}{}{}", sign, symbol, number)
        }
    }
}

fn group_thousands(value: u64, separator: char) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(digit);
    }
    grouped
}
