use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assumptions::{EquityEntry, UseOfProceeds};
use crate::calendar::PeriodCalendar;
use crate::types::Money;

/// Where one equity entry landed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityContribution {
    pub label: String,
    pub amount: Money,
    /// `None` when the entry is part of the opening balance
    pub period: Option<usize>,
    pub use_of_proceeds: UseOfProceeds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityRow {
    pub period: usize,
    pub opening_capital: Money,
    pub raised: Money,
    pub closing_capital: Money,
}

/// Amount of equity allocated to one use-of-proceeds category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProceedsAllocation {
    pub use_of_proceeds: UseOfProceeds,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquitySchedule {
    pub opening_capital: Money,
    pub contributions: Vec<EquityContribution>,
    pub allocation: Vec<ProceedsAllocation>,
    pub rows: Vec<EquityRow>,
}

impl EquitySchedule {
    pub fn raised(&self) -> Vec<Money> {
        self.rows.iter().map(|r| r.raised).collect()
    }
}

pub const PROCEEDS_ORDER: [UseOfProceeds; 4] = [
    UseOfProceeds::Cash,
    UseOfProceeds::Capex,
    UseOfProceeds::WorkingCapital,
    UseOfProceeds::Operations,
];

pub fn build_equity_schedule(
    entries: &[EquityEntry],
    calendar: &PeriodCalendar,
    warnings: &mut Vec<String>,
) -> EquitySchedule {
    let n = calendar.len();
    let mut contributions = Vec::with_capacity(entries.len());

    for entry in entries {
        let period = if entry.contribution_date <= calendar.start_date() {
            None
        } else {
            match calendar.index_of(entry.contribution_date) {
                Some(p) => Some(p),
                None => {
                    tracing::warn!(entry = %entry.label, "equity entry after the horizon");
                    warnings.push(format!(
                        "Equity entry '{}' dated {} falls after the horizon; excluded",
                        entry.label, entry.contribution_date
                    ));
                    continue;
                }
            }
        };
        contributions.push(EquityContribution {
            label: entry.label.clone(),
            amount: entry.amount,
            period,
            use_of_proceeds: entry.use_of_proceeds,
        });
    }

    let opening_capital: Money = contributions
        .iter()
        .filter(|c| c.period.is_none())
        .map(|c| c.amount)
        .sum();

    let allocation = PROCEEDS_ORDER
        .iter()
        .map(|use_of_proceeds| ProceedsAllocation {
            use_of_proceeds: *use_of_proceeds,
            amount: contributions
                .iter()
                .filter(|c| c.use_of_proceeds == *use_of_proceeds)
                .map(|c| c.amount)
                .sum(),
        })
        .collect();

    let mut capital = opening_capital;
    let rows = (0..n)
        .map(|period| {
            let raised: Money = contributions
                .iter()
                .filter(|c| c.period == Some(period))
                .map(|c| c.amount)
                .sum();
            let opening = capital;
            capital += raised;
            EquityRow {
                period,
                opening_capital: opening,
                raised,
                closing_capital: capital,
            }
        })
        .collect();

    tracing::debug!(entries = contributions.len(), "built equity schedule");

    EquitySchedule {
        opening_capital,
        contributions,
        allocation,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Granularity;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn entry(label: &str, amount: Money, date: NaiveDate, use_of_proceeds: UseOfProceeds) -> EquityEntry {
        EquityEntry {
            label: label.into(),
            amount,
            contribution_date: date,
            use_of_proceeds,
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_opening_and_later_rounds() {
        let cal = PeriodCalendar::build(ymd(2025, 1, 1), 6, Granularity::Monthly).unwrap();
        let entries = vec![
            entry("Founders", dec!(50000), ymd(2024, 11, 1), UseOfProceeds::Cash),
            entry("Seed", dec!(250000), ymd(2025, 4, 20), UseOfProceeds::Operations),
        ];
        let mut w = Vec::new();
        let sched = build_equity_schedule(&entries, &cal, &mut w);

        assert_eq!(sched.opening_capital, dec!(50000));
        assert_eq!(sched.rows[3].raised, dec!(250000));
        assert_eq!(sched.rows[2].closing_capital, dec!(50000));
        assert_eq!(sched.rows[3].closing_capital, dec!(300000));
        assert_eq!(sched.rows[5].closing_capital, dec!(300000));
        assert_eq!(sched.contributions[0].period, None);
        assert_eq!(sched.allocation[0].amount, dec!(50000));
        assert_eq!(sched.allocation[3].amount, dec!(250000));
        for pair in sched.rows.windows(2) {
            assert_eq!(pair[0].closing_capital, pair[1].opening_capital);
        }
    }

    #[test]
    fn test_entry_after_horizon_warns() {
        let cal = PeriodCalendar::build(ymd(2025, 1, 1), 2, Granularity::Monthly).unwrap();
        let entries = vec![entry("Series A", dec!(1), ymd(2027, 1, 1), UseOfProceeds::Cash)];
        let mut w = Vec::new();
        let sched = build_equity_schedule(&entries, &cal, &mut w);
        assert!(sched.contributions.is_empty());
        assert_eq!(w.len(), 1);
        assert_eq!(sched.rows[1].closing_capital, Decimal::ZERO);
    }
}
