use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

/// Band of a progressive schedule: income above `threshold` (up to the next
/// bracket's threshold) is taxed at `rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub threshold: Money,
    pub rate: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaxRate {
    Flat { rate: Rate },
    Tiered { brackets: Vec<TaxBracket> },
}

impl TaxRate {
    /// Tax due on a non-negative taxable amount.
    pub fn tax_on(&self, taxable: Money) -> Money {
        if taxable <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        match self {
            TaxRate::Flat { rate } => taxable * rate,
            TaxRate::Tiered { brackets } => {
                let mut tax = Decimal::ZERO;
                for (i, bracket) in brackets.iter().enumerate() {
                    if taxable <= bracket.threshold {
                        break;
                    }
                    let upper = brackets
                        .get(i + 1)
                        .map(|next| next.threshold.min(taxable))
                        .unwrap_or(taxable);
                    tax += (upper - bracket.threshold) * bracket.rate;
                }
                tax
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxAssumptions {
    pub rate: TaxRate,
    pub loss_carry_forward: bool,
    /// Losses older than this many periods expire. `None` keeps them forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carry_forward_limit: Option<u32>,
}

impl TaxAssumptions {
    pub fn flat(rate: Rate, loss_carry_forward: bool) -> Self {
        TaxAssumptions {
            rate: TaxRate::Flat { rate },
            loss_carry_forward,
            carry_forward_limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_flat_tax() {
        let rate = TaxRate::Flat { rate: dec!(0.25) };
        assert_eq!(rate.tax_on(dec!(1000)), dec!(250));
        assert_eq!(rate.tax_on(dec!(-50)), Decimal::ZERO);
    }

    #[test]
    fn test_tiered_tax_is_progressive() {
        let rate = TaxRate::Tiered {
            brackets: vec![
                TaxBracket {
                    threshold: dec!(0),
                    rate: dec!(0.10),
                },
                TaxBracket {
                    threshold: dec!(1000),
                    rate: dec!(0.30),
                },
            ],
        };
        // 1000 * 0.10 + 500 * 0.30 = 250
        assert_eq!(rate.tax_on(dec!(1500)), dec!(250));
        assert_eq!(rate.tax_on(dec!(800)), dec!(80));
        assert_eq!(rate.tax_on(dec!(1000)), dec!(100));
    }
}
