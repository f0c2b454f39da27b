//! Console report formatting
//!
//! Numbers are printed with custom numeric patterns such as `0.##` and
//! `#.##`: at most N decimals, trailing zeros dropped, and with `#` before
//! the point a lone leading zero is omitted.

use std::fmt;

use crate::metrics::RegressionMetrics;
use crate::trip::TripFarePrediction;

/// Format `value` with up to `decimals` fractional digits.
///
/// `leading_zero` selects `0.` (`0.5`) versus `#.` (`.5`); with `#.` a value
/// that rounds to zero prints as an empty string.
pub fn format_decimal(value: f64, decimals: usize, leading_zero: bool) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rounded = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match rounded.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part.trim_end_matches('0')),
        None => (rounded.as_str(), ""),
    };

    let int_part = if int_part == "0" && !leading_zero {
        ""
    } else {
        int_part
    };

    let mut out = String::new();
    let is_zero = int_part.trim_start_matches('0').is_empty() && frac_part.is_empty();
    if value.is_sign_negative() && !is_zero {
        out.push('-');
    }
    out.push_str(int_part);
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Quality section of the console report
#[derive(Debug, Clone, Copy)]
pub struct EvaluationReport<'a> {
    pub metrics: &'a RegressionMetrics,
}

impl fmt::Display for EvaluationReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "- RSquared Score:          {}",
            format_decimal(self.metrics.r_squared, 2, true)
        )?;
        write!(
            f,
            "- Root Mean Squared Error: {}",
            format_decimal(self.metrics.root_mean_squared_error, 2, false)
        )
    }
}

/// Single prediction line of the console report
#[derive(Debug, Clone, Copy)]
pub struct PredictionReport {
    pub prediction: TripFarePrediction,
    pub actual: f32,
}

impl fmt::Display for PredictionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "- Predicted 'Fare amount': {}, actual value: {}",
            format_decimal(self.prediction.fare_amount as f64, 4, true),
            self.actual
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_zero_pattern() {
        assert_eq!(format_decimal(0.9153, 2, true), "0.92");
        assert_eq!(format_decimal(0.5, 2, true), "0.5");
        assert_eq!(format_decimal(1.0, 2, true), "1");
        assert_eq!(format_decimal(0.0, 2, true), "0");
        assert_eq!(format_decimal(-0.25, 2, true), "-0.25");
        assert_eq!(format_decimal(15.31415926, 4, true), "15.3142");
    }

    #[test]
    fn test_optional_leading_zero_pattern() {
        assert_eq!(format_decimal(3.14159, 2, false), "3.14");
        assert_eq!(format_decimal(0.5, 2, false), ".5");
        assert_eq!(format_decimal(12.0, 2, false), "12");
        assert_eq!(format_decimal(0.0, 2, false), "");
        assert_eq!(format_decimal(0.001, 2, false), "");
    }

    #[test]
    fn test_negative_values_rounding_to_zero_lose_sign() {
        assert_eq!(format_decimal(-0.001, 2, true), "0");
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(format_decimal(f64::NAN, 2, true), "NaN");
    }

    #[test]
    fn test_evaluation_report() {
        let metrics = RegressionMetrics {
            mean_absolute_error: 1.0,
            mean_squared_error: 10.5625,
            root_mean_squared_error: 3.25,
            loss_function: 10.5625,
            r_squared: 0.8999,
        };
        assert_eq!(
            EvaluationReport { metrics: &metrics }.to_string(),
            "- RSquared Score:          0.9\n- Root Mean Squared Error: 3.25"
        );
    }

    #[test]
    fn test_prediction_report() {
        let report = PredictionReport {
            prediction: TripFarePrediction { fare_amount: 15.25 },
            actual: 15.5,
        };
        assert_eq!(
            report.to_string(),
            "- Predicted 'Fare amount': 15.25, actual value: 15.5"
        );
    }
}
