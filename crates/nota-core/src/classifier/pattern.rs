//! Shape analysis of a monthly expense breakdown

use serde::Serialize;

use crate::models::{MonthlyBreakdown, MONTHS_PER_YEAR};

use super::types::ClassifierThresholds;

/// Statistics derived from the active (non-zero) months of a breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternAnalysis {
    pub active_months: u8,
    /// Non-zero monthly expenses in calendar order
    pub active_amounts: Vec<f64>,
    /// Highest month with a non-zero expense
    pub last_active_month: u8,
    pub sparsity_ratio: f64,
    pub mean_when_active: f64,
    pub high_variability: bool,
    pub has_outlier: bool,
    pub is_occasional: bool,
}

impl PatternAnalysis {
    /// Analyze a breakdown. Returns `None` when no month has a positive expense.
    pub fn analyze(breakdown: &MonthlyBreakdown, thresholds: &ClassifierThresholds) -> Option<Self> {
        let active: Vec<(u8, f64)> = breakdown.iter().filter(|(_, e)| *e > 0.0).collect();
        let (last_active_month, _) = *active.last()?;

        let active_amounts: Vec<f64> = active.iter().map(|(_, e)| *e).collect();
        let active_months = active_amounts.len() as u8;
        let sparsity_ratio = f64::from(active_months) / f64::from(MONTHS_PER_YEAR);
        let mean_when_active = active_amounts.iter().sum::<f64>() / active_amounts.len() as f64;

        let max = active_amounts.iter().copied().fold(f64::MIN, f64::max);
        let min = active_amounts.iter().copied().fold(f64::MAX, f64::min);
        let high_variability =
            active_amounts.len() > 1 && max / min > thresholds.variability_ratio;

        let has_outlier = active_amounts
            .iter()
            .any(|&amount| amount > thresholds.outlier_factor * mean_when_active);

        let is_occasional = sparsity_ratio <= thresholds.sparsity_threshold
            || (active_months <= thresholds.occasional_max_active_months
                && (high_variability || has_outlier));

        Some(Self {
            active_months,
            active_amounts,
            last_active_month,
            sparsity_ratio,
            mean_when_active,
            high_variability,
            has_outlier,
            is_occasional,
        })
    }

    /// Share of the year with spending, as a whole percentage
    pub fn active_percentage(&self) -> u32 {
        (self.sparsity_ratio * 100.0).round() as u32
    }

    /// One-line description, e.g. "2 of 12 months active (17%), irregular amounts"
    pub fn describe(&self) -> String {
        let mut text = format!(
            "{} of {} months active ({}%)",
            self.active_months,
            MONTHS_PER_YEAR,
            self.active_percentage()
        );
        if self.high_variability {
            text.push_str(", irregular amounts");
        }
        if self.has_outlier {
            text.push_str(", one-off peak");
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(amounts: [f64; 12]) -> Option<PatternAnalysis> {
        PatternAnalysis::analyze(
            &MonthlyBreakdown::from_monthly_amounts(amounts),
            &ClassifierThresholds::default(),
        )
    }

    #[test]
    fn test_no_active_months() {
        assert!(analyze([0.0; 12]).is_none());
        assert!(PatternAnalysis::analyze(
            &MonthlyBreakdown::new(),
            &ClassifierThresholds::default()
        )
        .is_none());
    }

    #[test]
    fn test_negative_and_nan_months_are_inactive() {
        let mut amounts = [0.0; 12];
        amounts[0] = -40.0;
        amounts[1] = f64::NAN;
        amounts[4] = 100.0;
        let analysis = analyze(amounts).unwrap();
        assert_eq!(analysis.active_months, 1);
        assert_eq!(analysis.last_active_month, 5);
    }

    #[test]
    fn test_single_month() {
        let mut amounts = [0.0; 12];
        amounts[2] = 2000.0;
        let analysis = analyze(amounts).unwrap();

        assert_eq!(analysis.active_months, 1);
        assert_eq!(analysis.active_amounts, vec![2000.0]);
        assert_eq!(analysis.last_active_month, 3);
        assert!(!analysis.high_variability);
        assert!(!analysis.has_outlier);
        assert!(analysis.is_occasional);
        assert_eq!(analysis.describe(), "1 of 12 months active (8%)");
    }

    #[test]
    fn test_variability_and_outlier() {
        // 4 months: 100, 100, 100, 1000 -> mean 325, 1000 > 650
        let mut amounts = [0.0; 12];
        amounts[0] = 100.0;
        amounts[3] = 100.0;
        amounts[6] = 100.0;
        amounts[9] = 1000.0;
        let analysis = analyze(amounts).unwrap();

        assert_eq!(analysis.active_months, 4);
        assert!((analysis.mean_when_active - 325.0).abs() < 1e-9);
        assert!(analysis.high_variability);
        assert!(analysis.has_outlier);
        // 4 active months is above both occasional cutoffs
        assert!(!analysis.is_occasional);
        assert_eq!(
            analysis.describe(),
            "4 of 12 months active (33%), irregular amounts, one-off peak"
        );
    }

    #[test]
    fn test_variability_ratio_boundary_is_exclusive() {
        // 250 / 100 = 2.5 is not above the ratio
        let mut amounts = [0.0; 12];
        amounts[..4].fill(100.0);
        amounts[4] = 250.0;
        let analysis = analyze(amounts).unwrap();
        assert!(!analysis.high_variability);
    }

    #[test]
    fn test_custom_thresholds_mark_variable_pair_occasional() {
        let thresholds = ClassifierThresholds {
            sparsity_threshold: 0.1,
            ..Default::default()
        };
        let breakdown = MonthlyBreakdown::new()
            .with_month(2, 100.0)
            .unwrap()
            .with_month(8, 900.0)
            .unwrap();
        let analysis = PatternAnalysis::analyze(&breakdown, &thresholds).unwrap();

        // sparsity 2/12 > 0.1, but 2 <= 3 active months with ratio 9 > 2.5
        assert!(analysis.high_variability);
        assert!(analysis.is_occasional);
    }
}
