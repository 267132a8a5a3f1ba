pub mod company;
pub mod financing;
pub mod operating;
pub mod tax;

pub use company::{AccountingStandard, CompanyAssumptions, HistoricalPeriod};
pub use financing::{AmortizationStyle, DebtFacility, EquityEntry, UseOfProceeds};
pub use operating::{
    CapexItem, CogsPolicy, CostLine, DepreciationMethod, Escalation, OpexItem, RevenueDriver,
    RevenueMethod, WorkingCapitalPolicy,
};
pub use tax::{TaxAssumptions, TaxBracket, TaxRate};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calendar::MAX_HORIZON_PERIODS;
use crate::error::FinModelError;
use crate::projection::MAX_PROJECTED_AMOUNT;
use crate::FinModelResult;

/// Longest DSO/DIO/DPO accepted, in days.
pub const MAX_DAYS_OUTSTANDING: Decimal = dec!(3600);

/// Complete, immutable assumptions snapshot. This is the unit persisted by
/// callers and the only input to [`crate::engine::calculate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assumptions {
    pub company: CompanyAssumptions,
    #[serde(default)]
    pub revenue_drivers: Vec<RevenueDriver>,
    pub cogs: CogsPolicy,
    #[serde(default)]
    pub opex_items: Vec<OpexItem>,
    #[serde(default)]
    pub capex_items: Vec<CapexItem>,
    #[serde(default)]
    pub debt_facilities: Vec<DebtFacility>,
    #[serde(default)]
    pub equity_entries: Vec<EquityEntry>,
    pub working_capital: WorkingCapitalPolicy,
    pub tax: TaxAssumptions,
    #[serde(default)]
    pub historical: Vec<HistoricalPeriod>,
}

impl Assumptions {
    /// Reject malformed values at the boundary. Horizon and capex placement
    /// are checked against the calendar once it is built.
    pub fn validate(&self) -> FinModelResult<()> {
        if let Some(0) = self.company.financed_asset_life {
            return Err(FinModelError::InvalidInput {
                field: "company.financed_asset_life".into(),
                reason: "Useful life must be at least one period".into(),
            });
        }

        for (i, driver) in self.revenue_drivers.iter().enumerate() {
            let field = format!("revenue_drivers[{i}]");
            match &driver.method {
                RevenueMethod::UnitPrice {
                    units,
                    price,
                    unit_growth,
                    price_growth,
                } => {
                    validate_amount(&format!("{field}.units"), *units)?;
                    validate_amount(&format!("{field}.price"), *price)?;
                    validate_growth(&format!("{field}.unit_growth"), *unit_growth)?;
                    validate_growth(&format!("{field}.price_growth"), *price_growth)?;
                }
                RevenueMethod::GrowthOnBase { base, growth } => {
                    validate_amount(&format!("{field}.base"), *base)?;
                    validate_growth(&format!("{field}.growth"), *growth)?;
                }
                RevenueMethod::Schedule { values } => {
                    for (j, v) in values.iter().enumerate() {
                        validate_amount(&format!("{field}.values[{j}]"), *v)?;
                    }
                }
            }
        }

        match &self.cogs {
            CogsPolicy::PercentOfRevenue { rate } => validate_rate("cogs.rate", *rate)?,
            CogsPolicy::Itemized { items } => {
                for (i, item) in items.iter().enumerate() {
                    let field = format!("cogs.items[{i}]");
                    validate_amount(&format!("{field}.base_amount"), item.base_amount)?;
                    validate_escalation(&format!("{field}.escalation"), &item.escalation)?;
                }
            }
        }

        for (i, item) in self.opex_items.iter().enumerate() {
            let field = format!("opex_items[{i}]");
            validate_amount(&format!("{field}.base_amount"), item.base_amount)?;
            validate_escalation(&format!("{field}.escalation"), &item.escalation)?;
        }

        for (i, item) in self.capex_items.iter().enumerate() {
            let field = format!("capex_items[{i}]");
            validate_amount(&format!("{field}.amount"), item.amount)?;
            if item.useful_life == 0 {
                return Err(FinModelError::InvalidInput {
                    field: format!("{field}.useful_life"),
                    reason: "Useful life must be at least one period".into(),
                });
            }
            if item.acquisition_date < self.company.start_date {
                return Err(FinModelError::InvalidInput {
                    field: format!("{field}.acquisition_date"),
                    reason: format!(
                        "Acquisition date {} precedes the model start {}",
                        item.acquisition_date, self.company.start_date
                    ),
                });
            }
            if let DepreciationMethod::DecliningBalance { factor } = item.method {
                if factor <= Decimal::ZERO {
                    return Err(FinModelError::InvalidInput {
                        field: format!("{field}.method.factor"),
                        reason: format!("Declining-balance factor must be positive, got {factor}"),
                    });
                }
            }
        }

        for (i, facility) in self.debt_facilities.iter().enumerate() {
            let field = format!("debt_facilities[{i}]");
            if facility.principal <= Decimal::ZERO {
                return Err(FinModelError::InvalidInput {
                    field: format!("{field}.principal"),
                    reason: "Debt principal must be positive".into(),
                });
            }
            validate_amount(&format!("{field}.principal"), facility.principal)?;
            validate_rate(&format!("{field}.annual_rate"), facility.annual_rate)?;
            if facility.tenor_years == 0 {
                return Err(FinModelError::InvalidInput {
                    field: format!("{field}.tenor_years"),
                    reason: "Tenor must be at least 1 year".into(),
                });
            }
            let periods_per_year = self.company.granularity.periods_per_year();
            if facility.tenor_years.saturating_mul(periods_per_year) > MAX_HORIZON_PERIODS {
                return Err(FinModelError::InvalidInput {
                    field: format!("{field}.tenor_years"),
                    reason: format!(
                        "Tenor of {} years exceeds {MAX_HORIZON_PERIODS} periods",
                        facility.tenor_years
                    ),
                });
            }
        }

        for (i, entry) in self.equity_entries.iter().enumerate() {
            if entry.amount <= Decimal::ZERO {
                return Err(FinModelError::InvalidInput {
                    field: format!("equity_entries[{i}].amount"),
                    reason: "Equity amount must be positive".into(),
                });
            }
            validate_amount(&format!("equity_entries[{i}].amount"), entry.amount)?;
        }

        validate_days("working_capital.dso", self.working_capital.dso)?;
        validate_days("working_capital.dio", self.working_capital.dio)?;
        validate_days("working_capital.dpo", self.working_capital.dpo)?;

        validate_tax(&self.tax)
    }

    /// True when at least one financing entry lands in the opening balance.
    pub fn has_opening_financing(&self) -> bool {
        let start = self.company.start_date;
        self.debt_facilities.iter().any(|d| d.start_date <= start)
            || self.equity_entries.iter().any(|e| e.contribution_date <= start)
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn validate_tax(tax: &TaxAssumptions) -> FinModelResult<()> {
    match &tax.rate {
        TaxRate::Flat { rate } => validate_rate("tax.rate.rate", *rate)?,
        TaxRate::Tiered { brackets } => {
            let Some(first) = brackets.first() else {
                return Err(FinModelError::InvalidInput {
                    field: "tax.rate.brackets".into(),
                    reason: "Tiered tax requires at least one bracket".into(),
                });
            };
            if !first.threshold.is_zero() {
                return Err(FinModelError::InvalidInput {
                    field: "tax.rate.brackets[0].threshold".into(),
                    reason: "First bracket must start at zero".into(),
                });
            }
            for (i, bracket) in brackets.iter().enumerate() {
                validate_rate(&format!("tax.rate.brackets[{i}].rate"), bracket.rate)?;
                if i > 0 && bracket.threshold <= brackets[i - 1].threshold {
                    return Err(FinModelError::InvalidInput {
                        field: format!("tax.rate.brackets[{i}].threshold"),
                        reason: "Bracket thresholds must be strictly ascending".into(),
                    });
                }
            }
        }
    }
    if let Some(0) = tax.carry_forward_limit {
        return Err(FinModelError::InvalidInput {
            field: "tax.carry_forward_limit".into(),
            reason: "Carry-forward limit must be at least one period".into(),
        });
    }
    Ok(())
}

fn validate_escalation(field: &str, escalation: &Escalation) -> FinModelResult<()> {
    match escalation {
        Escalation::Flat => Ok(()),
        Escalation::Linear { step } => validate_amount(&format!("{field}.step"), step.abs()),
        Escalation::Compound { rate } => validate_growth(&format!("{field}.rate"), *rate),
    }
}

fn validate_rate(field: &str, value: Decimal) -> FinModelResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(FinModelError::InvalidInput {
            field: field.into(),
            reason: format!("Rate must be between 0 and 1, got {value}"),
        });
    }
    Ok(())
}

fn validate_growth(field: &str, value: Decimal) -> FinModelResult<()> {
    if value <= Decimal::NEGATIVE_ONE {
        return Err(FinModelError::InvalidInput {
            field: field.into(),
            reason: format!("Growth rate must be greater than -100%, got {value}"),
        });
    }
    Ok(())
}

fn validate_non_negative(field: &str, value: Decimal) -> FinModelResult<()> {
    if value < Decimal::ZERO {
        return Err(FinModelError::InvalidInput {
            field: field.into(),
            reason: format!("Value must be non-negative, got {value}"),
        });
    }
    Ok(())
}

fn validate_amount(field: &str, value: Decimal) -> FinModelResult<()> {
    validate_non_negative(field, value)?;
    if value > MAX_PROJECTED_AMOUNT {
        return Err(FinModelError::InvalidInput {
            field: field.into(),
            reason: format!("Amount must not exceed {MAX_PROJECTED_AMOUNT}, got {value}"),
        });
    }
    Ok(())
}

fn validate_days(field: &str, value: Decimal) -> FinModelResult<()> {
    validate_non_negative(field, value)?;
    if value > MAX_DAYS_OUTSTANDING {
        return Err(FinModelError::InvalidInput {
            field: field.into(),
            reason: format!("Day count must not exceed {MAX_DAYS_OUTSTANDING}, got {value}"),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::calendar::Granularity;
    use crate::types::Currency;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    pub(crate) fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    /// Twelve monthly periods, one product line, rent, one server purchase,
    /// a bank loan funding capex and a seed round held as cash.
    pub(crate) fn sample_assumptions() -> Assumptions {
        Assumptions {
            company: CompanyAssumptions {
                name: "Acme Robotics".into(),
                currency: Currency::USD,
                start_date: start(),
                horizon: 12,
                granularity: Granularity::Monthly,
                accounting_standard: AccountingStandard::Ifrs,
                financed_asset_life: Some(60),
            },
            revenue_drivers: vec![RevenueDriver {
                id: "subscriptions".into(),
                start_period: 0,
                method: RevenueMethod::UnitPrice {
                    units: dec!(100),
                    price: dec!(50),
                    unit_growth: dec!(0.05),
                    price_growth: Decimal::ZERO,
                },
            }],
            cogs: CogsPolicy::PercentOfRevenue { rate: dec!(0.30) },
            opex_items: vec![OpexItem {
                category: "Rent".into(),
                base_amount: dec!(1500),
                escalation: Escalation::Flat,
                start_period: 0,
            }],
            capex_items: vec![CapexItem {
                label: "Servers".into(),
                amount: dec!(12000),
                acquisition_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
                useful_life: 24,
                method: DepreciationMethod::StraightLine,
            }],
            debt_facilities: vec![DebtFacility {
                label: "Equipment loan".into(),
                principal: dec!(60000),
                annual_rate: dec!(0.12),
                tenor_years: 3,
                amortization: AmortizationStyle::Annuity,
                start_date: start(),
                use_of_proceeds: UseOfProceeds::Capex,
            }],
            equity_entries: vec![EquityEntry {
                label: "Seed".into(),
                amount: dec!(100000),
                contribution_date: start(),
                use_of_proceeds: UseOfProceeds::Cash,
            }],
            working_capital: WorkingCapitalPolicy {
                dso: dec!(30),
                dio: dec!(15),
                dpo: dec!(20),
            },
            tax: TaxAssumptions::flat(dec!(0.25), true),
            historical: vec![],
        }
    }

    #[test]
    fn test_sample_is_valid() {
        assert!(sample_assumptions().validate().is_ok());
        assert!(sample_assumptions().has_opening_financing());
    }

    #[test]
    fn test_negative_days_rejected() {
        let mut a = sample_assumptions();
        a.working_capital.dso = dec!(-1);
        match a.validate().unwrap_err() {
            FinModelError::InvalidInput { field, .. } => assert_eq!(field, "working_capital.dso"),
            e => panic!("Expected InvalidInput, got {e:?}"),
        }
    }

    #[test]
    fn test_negative_interest_rate_rejected() {
        let mut a = sample_assumptions();
        a.debt_facilities[0].annual_rate = dec!(-0.01);
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_tax_rate_above_one_rejected() {
        let mut a = sample_assumptions();
        a.tax = TaxAssumptions::flat(dec!(1.5), false);
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_capex_before_start_rejected() {
        let mut a = sample_assumptions();
        a.capex_items[0].acquisition_date = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        match a.validate().unwrap_err() {
            FinModelError::InvalidInput { field, .. } => {
                assert_eq!(field, "capex_items[0].acquisition_date")
            }
            e => panic!("Expected InvalidInput, got {e:?}"),
        }
    }

    #[test]
    fn test_unsorted_brackets_rejected() {
        let mut a = sample_assumptions();
        a.tax.rate = TaxRate::Tiered {
            brackets: vec![
                TaxBracket {
                    threshold: dec!(0),
                    rate: dec!(0.1),
                },
                TaxBracket {
                    threshold: dec!(0),
                    rate: dec!(0.2),
                },
            ],
        };
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_zero_tenor_rejected() {
        let mut a = sample_assumptions();
        a.debt_facilities[0].tenor_years = 0;
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_tenor_beyond_period_limit_rejected() {
        let mut a = sample_assumptions();
        a.debt_facilities[0].tenor_years = 100;
        assert!(a.validate().is_ok());

        a.debt_facilities[0].tenor_years = 101;
        match a.validate().unwrap_err() {
            FinModelError::InvalidInput { field, .. } => {
                assert_eq!(field, "debt_facilities[0].tenor_years")
            }
            e => panic!("Expected InvalidInput, got {e:?}"),
        }

        a.debt_facilities[0].tenor_years = u32::MAX;
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_tenor_limit_scales_with_granularity() {
        let mut a = sample_assumptions();
        a.company.granularity = Granularity::Annual;
        a.debt_facilities[0].tenor_years = 1200;
        assert!(a.validate().is_ok());
    }

    #[test]
    fn test_excessive_day_count_rejected() {
        let mut a = sample_assumptions();
        a.working_capital.dpo = dec!(3601);
        match a.validate().unwrap_err() {
            FinModelError::InvalidInput { field, .. } => assert_eq!(field, "working_capital.dpo"),
            e => panic!("Expected InvalidInput, got {e:?}"),
        }
    }

    #[test]
    fn test_amount_above_ceiling_rejected() {
        let mut a = sample_assumptions();
        a.equity_entries[0].amount = MAX_PROJECTED_AMOUNT + Decimal::ONE;
        assert!(a.validate().is_err());

        let mut a = sample_assumptions();
        a.opex_items[0].escalation = Escalation::Linear {
            step: -(MAX_PROJECTED_AMOUNT * dec!(2)),
        };
        match a.validate().unwrap_err() {
            FinModelError::InvalidInput { field, .. } => {
                assert_eq!(field, "opex_items[0].escalation.step")
            }
            e => panic!("Expected InvalidInput, got {e:?}"),
        }
    }

    #[test]
    fn test_missing_collections_default_to_empty() {
        let json = serde_json::json!({
            "company": {
                "name": "Solo",
                "currency": "EUR",
                "start_date": "2025-01-01",
                "horizon": 3,
                "granularity": "annual",
                "accounting_standard": "us_gaap"
            },
            "cogs": {"type": "percent_of_revenue", "rate": "0.5"},
            "working_capital": {"dso": "0", "dio": "0", "dpo": "0"},
            "tax": {"rate": {"type": "flat", "rate": "0.2"}, "loss_carry_forward": false}
        });
        let a: Assumptions = serde_json::from_value(json).unwrap();
        assert!(a.debt_facilities.is_empty());
        assert!(a.historical.is_empty());
        assert!(!a.has_opening_financing());
        assert!(a.validate().is_ok());
    }
}
