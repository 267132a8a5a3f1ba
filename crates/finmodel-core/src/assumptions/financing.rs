use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

/// Where a financing inflow lands on the opening balance sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UseOfProceeds {
    Cash,
    Capex,
    WorkingCapital,
    /// Held as cash and consumed through the projected operating expenses
    Operations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmortizationStyle {
    /// Constant total payment per period
    Annuity,
    /// Interest only, full principal in the final tenor period
    Bullet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtFacility {
    pub label: String,
    pub principal: Money,
    /// Annual nominal rate
    pub annual_rate: Rate,
    pub tenor_years: u32,
    pub amortization: AmortizationStyle,
    pub start_date: NaiveDate,
    pub use_of_proceeds: UseOfProceeds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityEntry {
    pub label: String,
    pub amount: Money,
    pub contribution_date: NaiveDate,
    pub use_of_proceeds: UseOfProceeds,
}
