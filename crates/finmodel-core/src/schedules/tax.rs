use std::collections::VecDeque;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assumptions::TaxAssumptions;
use crate::types::Money;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxRow {
    pub period: usize,
    pub pre_tax_income: Money,
    pub loss_added: Money,
    pub loss_utilised: Money,
    pub loss_expired: Money,
    /// Unused losses carried into the next period
    pub loss_pool: Money,
    pub taxable_income: Money,
    pub tax_expense: Money,
    pub net_income: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSchedule {
    pub rows: Vec<TaxRow>,
}

impl TaxSchedule {
    pub fn tax_expense(&self) -> Vec<Money> {
        self.rows.iter().map(|r| r.tax_expense).collect()
    }
}

/// A banked loss and the period it arose in.
struct LossVintage {
    period: usize,
    remaining: Money,
}

/// Pre-tax income = gross profit − opex − depreciation − interest, then tax
/// after offsetting banked losses oldest-first.
pub fn compute_tax(
    gross_profit: &[Money],
    opex: &[Money],
    depreciation: &[Money],
    interest: &[Money],
    tax: &TaxAssumptions,
) -> TaxSchedule {
    let mut pool: VecDeque<LossVintage> = VecDeque::new();
    let mut rows = Vec::with_capacity(gross_profit.len());

    for (period, gp) in gross_profit.iter().enumerate() {
        let pre_tax_income = gp - opex[period] - depreciation[period] - interest[period];

        let mut loss_expired = Decimal::ZERO;
        if let Some(limit) = tax.carry_forward_limit {
            while let Some(front) = pool.front() {
                if period - front.period > limit as usize {
                    loss_expired += front.remaining;
                    pool.pop_front();
                } else {
                    break;
                }
            }
        }

        let mut loss_added = Decimal::ZERO;
        let mut loss_utilised = Decimal::ZERO;
        let mut taxable_income = pre_tax_income.max(Decimal::ZERO);

        if tax.loss_carry_forward {
            if pre_tax_income < Decimal::ZERO {
                loss_added = -pre_tax_income;
                pool.push_back(LossVintage {
                    period,
                    remaining: loss_added,
                });
            } else {
                while taxable_income > Decimal::ZERO {
                    let Some(front) = pool.front_mut() else {
                        break;
                    };
                    let used = front.remaining.min(taxable_income);
                    front.remaining -= used;
                    taxable_income -= used;
                    loss_utilised += used;
                    if front.remaining.is_zero() {
                        pool.pop_front();
                    }
                }
            }
        }

        let tax_expense = tax.rate.tax_on(taxable_income);
        rows.push(TaxRow {
            period,
            pre_tax_income,
            loss_added,
            loss_utilised,
            loss_expired,
            loss_pool: pool.iter().map(|v| v.remaining).sum(),
            taxable_income,
            tax_expense,
            net_income: pre_tax_income - tax_expense,
        });
    }

    TaxSchedule { rows }
}
