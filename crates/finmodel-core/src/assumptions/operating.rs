use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{growth_factor, Days, Money, Rate};

/// How a recurring amount evolves after its start period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Escalation {
    /// Same amount every period
    Flat,
    /// Base plus a fixed step per elapsed period (floored at zero)
    Linear { step: Money },
    /// Base compounded at a per-period rate
    Compound { rate: Rate },
}

impl Escalation {
    /// Amount `elapsed` periods after the start period, or `None` if it
    /// overflows.
    pub fn amount(&self, base: Money, elapsed: u32) -> Option<Money> {
        match self {
            Escalation::Flat => Some(base),
            Escalation::Linear { step } => step
                .checked_mul(Decimal::from(elapsed))
                .and_then(|growth| base.checked_add(growth))
                .map(|amount| amount.max(Decimal::ZERO)),
            Escalation::Compound { rate } => {
                growth_factor(*rate, elapsed).and_then(|f| base.checked_mul(f))
            }
        }
    }
}

/// Projection method for a single revenue stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RevenueMethod {
    /// units × price, each growing at its own per-period rate
    UnitPrice {
        units: Decimal,
        price: Money,
        #[serde(default)]
        unit_growth: Rate,
        #[serde(default)]
        price_growth: Rate,
    },
    /// base × (1 + growth)^t
    GrowthOnBase { base: Money, growth: Rate },
    /// Explicit values from the start period onward; missing periods are zero
    Schedule { values: Vec<Money> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueDriver {
    pub id: String,
    #[serde(default)]
    pub start_period: u32,
    pub method: RevenueMethod,
}

/// A projected cost line (itemized COGS).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLine {
    pub label: String,
    pub base_amount: Money,
    pub escalation: Escalation,
    #[serde(default)]
    pub start_period: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CogsPolicy {
    PercentOfRevenue { rate: Rate },
    Itemized { items: Vec<CostLine> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpexItem {
    pub category: String,
    pub base_amount: Money,
    pub escalation: Escalation,
    #[serde(default)]
    pub start_period: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DepreciationMethod {
    #[default]
    StraightLine,
    /// Charge = net book value × factor / useful life; the last period of
    /// the life writes off whatever remains.
    DecliningBalance { factor: Decimal },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapexItem {
    pub label: String,
    pub amount: Money,
    pub acquisition_date: NaiveDate,
    /// Useful life in periods
    pub useful_life: u32,
    #[serde(default)]
    pub method: DepreciationMethod,
}

/// Day-based working-capital policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkingCapitalPolicy {
    pub dso: Days,
    pub dio: Days,
    pub dpo: Days,
}
