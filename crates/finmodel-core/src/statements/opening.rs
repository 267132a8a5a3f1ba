use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assumptions::{Assumptions, UseOfProceeds};
use crate::schedules::equity::{ProceedsAllocation, PROCEEDS_ORDER};
use crate::schedules::working_capital::WorkingCapitalBalances;
use crate::types::Money;

/// Period-zero balance sheet, derived entirely from financing dated at or
/// before the model start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningBalance {
    pub cash: Money,
    pub accounts_receivable: Money,
    pub inventory: Money,
    pub ppe_gross: Money,
    pub accumulated_depreciation: Money,
    pub ppe_net: Money,
    pub total_assets: Money,
    pub debt: Money,
    pub accounts_payable: Money,
    pub total_liabilities: Money,
    pub equity: Money,
    pub total_equity: Money,
    pub total_liabilities_and_equity: Money,
    /// Debt and equity proceeds by category, in fixed category order
    pub proceeds_by_use: Vec<ProceedsAllocation>,
}

impl OpeningBalance {
    pub fn working_capital(&self) -> WorkingCapitalBalances {
        WorkingCapitalBalances {
            accounts_receivable: self.accounts_receivable,
            inventory: self.inventory,
            accounts_payable: self.accounts_payable,
        }
    }
}

/// Allocate opening financing to balance sheet lines.
///
/// Cash and operations proceeds become cash. Capex proceeds become gross
/// PP&E. Working-capital proceeds are split between receivables and
/// inventory in the DSO:DIO ratio of the policy; with both at zero there is
/// nothing to seed and the amount stays in cash.
pub fn resolve_opening_balance(assumptions: &Assumptions) -> OpeningBalance {
    let start = assumptions.company.start_date;

    let debt_entries = assumptions
        .debt_facilities
        .iter()
        .filter(|d| d.start_date <= start)
        .map(|d| (d.use_of_proceeds, d.principal));
    let equity_entries = assumptions
        .equity_entries
        .iter()
        .filter(|e| e.contribution_date <= start)
        .map(|e| (e.use_of_proceeds, e.amount));

    let debt: Money = assumptions
        .debt_facilities
        .iter()
        .filter(|d| d.start_date <= start)
        .map(|d| d.principal)
        .sum();
    let equity: Money = assumptions
        .equity_entries
        .iter()
        .filter(|e| e.contribution_date <= start)
        .map(|e| e.amount)
        .sum();

    let mut by_use = [Decimal::ZERO; 4];
    for (use_of_proceeds, amount) in debt_entries.chain(equity_entries) {
        let slot = PROCEEDS_ORDER
            .iter()
            .position(|u| *u == use_of_proceeds)
            .unwrap_or(0);
        by_use[slot] += amount;
    }
    let [cash_proceeds, capex_proceeds, wc_proceeds, operations_proceeds] = by_use;

    let policy = &assumptions.working_capital;
    let seed_days = policy.dso + policy.dio;
    let (accounts_receivable, inventory, wc_in_cash) = if seed_days.is_zero() {
        (Decimal::ZERO, Decimal::ZERO, wc_proceeds)
    } else {
        let receivables = wc_proceeds * policy.dso / seed_days;
        (receivables, wc_proceeds - receivables, Decimal::ZERO)
    };

    let cash = cash_proceeds + operations_proceeds + wc_in_cash;
    let ppe_gross = capex_proceeds;
    let total_assets = cash + accounts_receivable + inventory + ppe_gross;
    let accounts_payable = Decimal::ZERO;
    let total_liabilities = debt + accounts_payable;

    tracing::debug!(%debt, %equity, %total_assets, "resolved opening balance");

    OpeningBalance {
        cash,
        accounts_receivable,
        inventory,
        ppe_gross,
        accumulated_depreciation: Decimal::ZERO,
        ppe_net: ppe_gross,
        total_assets,
        debt,
        accounts_payable,
        total_liabilities,
        equity,
        total_equity: equity,
        total_liabilities_and_equity: total_liabilities + equity,
        proceeds_by_use: PROCEEDS_ORDER
            .iter()
            .zip(by_use)
            .map(|(u, amount)| ProceedsAllocation {
                use_of_proceeds: *u,
                amount,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::tests::{sample_assumptions, start};
    use crate::assumptions::{AmortizationStyle, DebtFacility, EquityEntry};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn facility(amount: Money, use_of_proceeds: UseOfProceeds, date: NaiveDate) -> DebtFacility {
        DebtFacility {
            label: "Loan".into(),
            principal: amount,
            annual_rate: dec!(0.08),
            tenor_years: 3,
            amortization: AmortizationStyle::Bullet,
            start_date: date,
            use_of_proceeds,
        }
    }

    #[test]
    fn test_sample_opening_balances() {
        let ob = resolve_opening_balance(&sample_assumptions());
        assert_eq!(ob.ppe_gross, dec!(60000));
        assert_eq!(ob.cash, dec!(100000));
        assert_eq!(ob.total_assets, dec!(160000));
        assert_eq!(ob.total_assets, ob.total_liabilities_and_equity);
    }

    #[test]
    fn test_no_financing_is_all_zero() {
        let mut a = sample_assumptions();
        a.debt_facilities.clear();
        a.equity_entries.clear();
        let ob = resolve_opening_balance(&a);
        assert_eq!(ob.total_assets, Decimal::ZERO);
        assert_eq!(ob.total_liabilities_and_equity, Decimal::ZERO);
    }

    #[test]
    fn test_working_capital_split_by_days() {
        let mut a = sample_assumptions();
        a.equity_entries.clear();
        a.debt_facilities = vec![facility(dec!(9000), UseOfProceeds::WorkingCapital, start())];
        a.working_capital.dso = dec!(20);
        a.working_capital.dio = dec!(10);
        let ob = resolve_opening_balance(&a);
        assert_eq!(ob.accounts_receivable, dec!(6000));
        assert_eq!(ob.inventory, dec!(3000));
        assert_eq!(ob.accounts_payable, Decimal::ZERO);
        assert_eq!(ob.cash, Decimal::ZERO);
        assert_eq!(ob.total_assets, dec!(9000));
    }

    #[test]
    fn test_working_capital_without_days_stays_in_cash() {
        let mut a = sample_assumptions();
        a.equity_entries.clear();
        a.debt_facilities = vec![facility(dec!(500), UseOfProceeds::WorkingCapital, start())];
        a.working_capital.dso = Decimal::ZERO;
        a.working_capital.dio = Decimal::ZERO;
        let ob = resolve_opening_balance(&a);
        assert_eq!(ob.cash, dec!(500));
        assert_eq!(ob.accounts_receivable, Decimal::ZERO);
    }

    #[test]
    fn test_later_financing_excluded_from_opening() {
        let mut a = sample_assumptions();
        a.debt_facilities = vec![facility(
            dec!(1000),
            UseOfProceeds::Cash,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        )];
        a.equity_entries = vec![EquityEntry {
            label: "Pre-seed".into(),
            amount: dec!(250),
            contribution_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            use_of_proceeds: UseOfProceeds::Operations,
        }];
        let ob = resolve_opening_balance(&a);
        assert_eq!(ob.debt, Decimal::ZERO);
        assert_eq!(ob.cash, dec!(250));
        assert_eq!(ob.proceeds_by_use[3].amount, dec!(250));
    }
}
