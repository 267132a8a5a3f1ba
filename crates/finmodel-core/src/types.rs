use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Day counts (DSO, DIO, DPO)
pub type Days = Decimal;

/// Ratio that may be undefined (zero denominator). Serialises as `null`.
pub type Ratio = Option<Decimal>;

/// Reporting currency code
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    GBP,
    #[default]
    USD,
    EUR,
    CHF,
    JPY,
    CAD,
    AUD,
    HKD,
    SGD,
    Other(String),
}

impl Currency {
    pub fn code(&self) -> &str {
        match self {
            Currency::GBP => "GBP",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::CHF => "CHF",
            Currency::JPY => "JPY",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::HKD => "HKD",
            Currency::SGD => "SGD",
            Currency::Other(code) => code,
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation. Carries no timing so that identical
/// inputs always serialise to identical envelopes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// `numerator / denominator`, or `None` when the denominator is zero or
/// the quotient does not fit.
pub fn safe_ratio(numerator: Decimal, denominator: Decimal) -> Ratio {
    numerator.checked_div(denominator)
}

/// `(1 + rate)^periods` by repeated multiplication, so results are exact
/// and identical across platforms. `None` when the factor overflows.
pub fn growth_factor(rate: Rate, periods: u32) -> Option<Decimal> {
    let base = Decimal::ONE + rate;
    let mut factor = Decimal::ONE;
    for _ in 0..periods {
        factor = factor.checked_mul(base)?;
    }
    Some(factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_safe_ratio_zero_denominator_is_undefined() {
        assert_eq!(safe_ratio(dec!(10), Decimal::ZERO), None);
        assert_eq!(safe_ratio(dec!(10), dec!(4)), Some(dec!(2.5)));
        assert_eq!(safe_ratio(Decimal::MAX, Decimal::new(1, 10)), None);
    }

    #[test]
    fn test_growth_factor() {
        assert_eq!(growth_factor(dec!(0.10), 0), Some(Decimal::ONE));
        assert_eq!(growth_factor(dec!(0.10), 2), Some(dec!(1.21)));
        assert_eq!(growth_factor(Decimal::ZERO, 12), Some(Decimal::ONE));
    }

    #[test]
    fn test_growth_factor_overflow_is_none() {
        assert_eq!(growth_factor(Decimal::ONE, 200), None);
    }

    #[test]
    fn test_currency_codes() {
        assert_eq!(Currency::EUR.code(), "EUR");
        assert_eq!(Currency::Other("NGN".into()).code(), "NGN");
    }

    #[test]
    fn test_metadata_has_no_timing() {
        let out = with_metadata("m", &serde_json::json!({}), vec![], 1u8);
        let v = serde_json::to_value(&out).unwrap();
        assert!(v["metadata"].get("computation_time_us").is_none());
        assert_eq!(v["metadata"]["precision"], "rust_decimal_128bit");
    }
}
