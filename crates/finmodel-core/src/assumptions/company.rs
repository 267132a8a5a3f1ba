use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::Granularity;
use crate::types::{Currency, Money};

/// Presentation variant. Changes labels and ordering, never arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountingStandard {
    Ifrs,
    UsGaap,
}

/// Company-level settings for a projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyAssumptions {
    pub name: String,
    pub currency: Currency,
    /// First day of the first projected period
    pub start_date: NaiveDate,
    /// Number of projected periods
    pub horizon: u32,
    pub granularity: Granularity,
    pub accounting_standard: AccountingStandard,
    /// Useful life (in periods) of PP&E funded at opening by capex-allocated
    /// financing. `None` leaves those assets undepreciated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financed_asset_life: Option<u32>,
}

/// Prior-period actuals. Reference baseline only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPeriod {
    pub label: String,
    pub revenue: Money,
    pub cost_of_sales: Money,
    pub operating_expenses: Money,
    pub net_income: Money,
    pub cash: Money,
    pub total_assets: Money,
    pub total_liabilities: Money,
    pub total_equity: Money,
}
