use serde::{Deserialize, Serialize};

use crate::schedules::debt::DebtSchedule;
use crate::statements::assembler::{BalanceSheet, IncomeStatement};
use crate::types::{safe_ratio, Money, Ratio};

/// Liquidity and leverage ratios for one period. A ratio is `None` when its
/// denominator is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityRatios {
    pub period: usize,
    pub label: String,
    /// Accounts payable plus debt principal due within twelve months
    pub current_liabilities: Money,
    /// Current assets less current liabilities
    pub working_capital: Money,
    /// Debt less cash
    pub net_debt: Money,
    /// Current assets / current liabilities
    pub current_ratio: Ratio,
    /// (Cash + receivables) / current liabilities
    pub quick_ratio: Ratio,
    pub cash_ratio: Ratio,
    pub debt_to_equity: Ratio,
    /// EBIT / interest expense
    pub interest_coverage: Ratio,
}

pub fn compute_liquidity_ratios(
    income_statements: &[IncomeStatement],
    balance_sheets: &[BalanceSheet],
    debt: &DebtSchedule,
) -> Vec<LiquidityRatios> {
    balance_sheets
        .iter()
        .zip(income_statements)
        .zip(&debt.totals)
        .map(|((bs, is), totals)| {
            let current_liabilities = bs.accounts_payable + totals.current_portion;
            LiquidityRatios {
                period: bs.period,
                label: bs.label.clone(),
                current_liabilities,
                working_capital: bs.total_current_assets - current_liabilities,
                net_debt: bs.debt - bs.cash,
                current_ratio: safe_ratio(bs.total_current_assets, current_liabilities),
                quick_ratio: safe_ratio(bs.cash + bs.accounts_receivable, current_liabilities),
                cash_ratio: safe_ratio(bs.cash, current_liabilities),
                debt_to_equity: safe_ratio(bs.debt, bs.total_equity),
                interest_coverage: safe_ratio(is.ebit, is.interest_expense),
            }
        })
        .collect()
}
