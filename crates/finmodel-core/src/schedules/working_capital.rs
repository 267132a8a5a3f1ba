use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assumptions::WorkingCapitalPolicy;
use crate::calendar::PeriodCalendar;
use crate::types::Money;

/// Receivables, inventory and payables at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkingCapitalBalances {
    pub accounts_receivable: Money,
    pub inventory: Money,
    pub accounts_payable: Money,
}

impl WorkingCapitalBalances {
    pub fn net(&self) -> Money {
        self.accounts_receivable + self.inventory - self.accounts_payable
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingCapitalRow {
    pub period: usize,
    pub accounts_receivable: Money,
    pub inventory: Money,
    pub accounts_payable: Money,
    pub net_working_capital: Money,
    pub change_in_receivables: Money,
    pub change_in_inventory: Money,
    pub change_in_payables: Money,
    /// −ΔAR − ΔInventory + ΔAP
    pub cash_impact: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingCapitalSchedule {
    pub days_in_period: Decimal,
    pub opening: WorkingCapitalBalances,
    pub rows: Vec<WorkingCapitalRow>,
}

/// Convert the day-based policy into period-end balances. Period 0 is
/// measured against the opening seed, not against zero.
pub fn build_working_capital_schedule(
    policy: &WorkingCapitalPolicy,
    revenue: &[Money],
    cost_of_sales: &[Money],
    opening: &WorkingCapitalBalances,
    calendar: &PeriodCalendar,
) -> WorkingCapitalSchedule {
    let basis = calendar.days_in_period_basis();
    let mut prior = opening.clone();

    let rows = revenue
        .iter()
        .zip(cost_of_sales)
        .enumerate()
        .map(|(period, (rev, cogs))| {
            let current = WorkingCapitalBalances {
                accounts_receivable: rev * policy.dso / basis,
                inventory: cogs * policy.dio / basis,
                accounts_payable: cogs * policy.dpo / basis,
            };
            let change_in_receivables = current.accounts_receivable - prior.accounts_receivable;
            let change_in_inventory = current.inventory - prior.inventory;
            let change_in_payables = current.accounts_payable - prior.accounts_payable;

            let row = WorkingCapitalRow {
                period,
                accounts_receivable: current.accounts_receivable,
                inventory: current.inventory,
                accounts_payable: current.accounts_payable,
                net_working_capital: current.net(),
                change_in_receivables,
                change_in_inventory,
                change_in_payables,
                cash_impact: -change_in_receivables - change_in_inventory + change_in_payables,
            };
            prior = current;
            row
        })
        .collect();

    WorkingCapitalSchedule {
        days_in_period: basis,
        opening: opening.clone(),
        rows,
    }
}
