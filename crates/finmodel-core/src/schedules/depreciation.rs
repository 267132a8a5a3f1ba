use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assumptions::{CapexItem, DepreciationMethod};
use crate::calendar::PeriodCalendar;
use crate::error::FinModelError;
use crate::types::Money;
use crate::FinModelResult;

/// Label of the asset pool seeded by capex-allocated opening financing.
pub const FINANCED_ASSETS_LABEL: &str = "Financed assets (opening)";

// ---------------------------------------------------------------------------
// Output structs
// ---------------------------------------------------------------------------

/// Depreciation detail for a single asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDepreciation {
    pub label: String,
    pub acquisition_period: usize,
    pub cost: Money,
    pub useful_life: Option<u32>,
    /// True for PP&E recognised in the opening balance (no capex outflow)
    pub from_opening: bool,
    pub depreciation: Vec<Money>,
}

/// Aggregate fixed-asset roll-forward for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepreciationRow {
    pub period: usize,
    pub opening_gross: Money,
    pub additions: Money,
    pub closing_gross: Money,
    pub opening_accumulated: Money,
    pub depreciation: Money,
    pub closing_accumulated: Money,
    pub net_book_value: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepreciationSchedule {
    pub rows: Vec<DepreciationRow>,
    pub assets: Vec<AssetDepreciation>,
}

impl DepreciationSchedule {
    pub fn depreciation(&self) -> Vec<Money> {
        self.rows.iter().map(|r| r.depreciation).collect()
    }

    pub fn additions(&self) -> Vec<Money> {
        self.rows.iter().map(|r| r.additions).collect()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Place capex into periods and depreciate it alongside any PP&E carried in
/// the opening balance.
pub fn build_depreciation_schedule(
    items: &[CapexItem],
    opening_ppe: Money,
    financed_asset_life: Option<u32>,
    calendar: &PeriodCalendar,
) -> FinModelResult<DepreciationSchedule> {
    let n = calendar.len();
    let mut assets = Vec::with_capacity(items.len() + 1);

    if opening_ppe > Decimal::ZERO {
        let depreciation = match financed_asset_life {
            Some(life) => straight_line(opening_ppe, life, 0, n),
            None => vec![Decimal::ZERO; n],
        };
        assets.push(AssetDepreciation {
            label: FINANCED_ASSETS_LABEL.into(),
            acquisition_period: 0,
            cost: opening_ppe,
            useful_life: financed_asset_life,
            from_opening: true,
            depreciation,
        });
    }

    for item in items {
        let period = match calendar.index_of(item.acquisition_date) {
            Some(p) => p,
            None if item.acquisition_date > calendar.end_date() => {
                return Err(FinModelError::OutOfHorizonCapex {
                    item: item.label.clone(),
                    date: item.acquisition_date,
                    horizon_end: calendar.end_date(),
                });
            }
            None => {
                return Err(FinModelError::InvalidInput {
                    field: format!("capex '{}'.acquisition_date", item.label),
                    reason: "Acquisition date precedes the model start".into(),
                });
            }
        };

        let depreciation = match item.method {
            DepreciationMethod::StraightLine => {
                straight_line(item.amount, item.useful_life, period, n)
            }
            DepreciationMethod::DecliningBalance { factor } => {
                declining_balance(item.amount, item.useful_life, factor, period, n)
            }
        };

        assets.push(AssetDepreciation {
            label: item.label.clone(),
            acquisition_period: period,
            cost: item.amount,
            useful_life: Some(item.useful_life),
            from_opening: false,
            depreciation,
        });
    }

    let mut rows = Vec::with_capacity(n);
    let mut gross = opening_ppe;
    let mut accumulated = Decimal::ZERO;

    for period in 0..n {
        let additions: Money = assets
            .iter()
            .filter(|a| !a.from_opening && a.acquisition_period == period)
            .map(|a| a.cost)
            .sum();
        let depreciation: Money = assets.iter().map(|a| a.depreciation[period]).sum();

        let opening_gross = gross;
        let opening_accumulated = accumulated;
        gross += additions;
        accumulated += depreciation;

        rows.push(DepreciationRow {
            period,
            opening_gross,
            additions,
            closing_gross: gross,
            opening_accumulated,
            depreciation,
            closing_accumulated: accumulated,
            net_book_value: (gross - accumulated).max(Decimal::ZERO),
        });
    }

    tracing::debug!(assets = assets.len(), periods = n, "built depreciation schedule");

    Ok(DepreciationSchedule { rows, assets })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Equal charges from `first` for `life` periods; the last charge takes the
/// rounding residue so the asset is written off exactly.
fn straight_line(cost: Money, life: u32, first: usize, n: usize) -> Vec<Money> {
    let mut charges = vec![Decimal::ZERO; n];
    let per_period = cost / Decimal::from(life);
    let mut taken = Decimal::ZERO;
    for k in 0..life as usize {
        let Some(slot) = charges.get_mut(first + k) else {
            break;
        };
        let charge = if k + 1 == life as usize {
            cost - taken
        } else {
            per_period.min(cost - taken)
        };
        *slot = charge;
        taken += charge;
    }
    charges
}

fn declining_balance(cost: Money, life: u32, factor: Decimal, first: usize, n: usize) -> Vec<Money> {
    let mut charges = vec![Decimal::ZERO; n];
    let rate = (factor / Decimal::from(life)).min(Decimal::ONE);
    let mut nbv = cost;
    for k in 0..life as usize {
        let Some(slot) = charges.get_mut(first + k) else {
            break;
        };
        let charge = if k + 1 == life as usize {
            nbv
        } else {
            nbv * rate
        };
        *slot = charge;
        nbv -= charge;
    }
    charges
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Granularity;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn calendar(n: u32) -> PeriodCalendar {
        PeriodCalendar::build(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            n,
            Granularity::Monthly,
        )
        .unwrap()
    }

    fn capex(label: &str, amount: Money, month: u32, life: u32) -> CapexItem {
        CapexItem {
            label: label.into(),
            amount,
            acquisition_date: NaiveDate::from_ymd_opt(2025, month, 15).unwrap(),
            useful_life: life,
            method: DepreciationMethod::StraightLine,
        }
    }

    #[test]
    fn test_straight_line_from_acquisition_period() {
        let sched =
            build_depreciation_schedule(&[capex("Laptop", dec!(1200), 2, 4)], Decimal::ZERO, None, &calendar(8))
                .unwrap();
        let dep = sched.depreciation();
        assert_eq!(
            dep,
            vec![
                dec!(0),
                dec!(300),
                dec!(300),
                dec!(300),
                dec!(300),
                dec!(0),
                dec!(0),
                dec!(0)
            ]
        );
        assert_eq!(sched.rows[1].additions, dec!(1200));
        assert_eq!(sched.rows[7].net_book_value, Decimal::ZERO);
        assert_eq!(sched.rows[7].closing_accumulated, dec!(1200));
    }

    #[test]
    fn test_residue_absorbed_in_final_period() {
        let sched =
            build_depreciation_schedule(&[capex("Desk", dec!(100), 1, 3)], Decimal::ZERO, None, &calendar(3))
                .unwrap();
        let total: Money = sched.depreciation().iter().sum();
        assert_eq!(total, dec!(100));
        assert_eq!(sched.rows[2].net_book_value, Decimal::ZERO);
    }

    #[test]
    fn test_accumulated_bounded_by_cost() {
        let items = vec![capex("A", dec!(1000), 1, 5), capex("B", dec!(333), 3, 7)];
        let sched = build_depreciation_schedule(&items, dec!(500), Some(10), &calendar(12)).unwrap();
        let mut prev = Decimal::ZERO;
        for row in &sched.rows {
            assert!(row.closing_accumulated >= prev);
            assert!(row.closing_accumulated <= row.closing_gross);
            assert!(row.net_book_value >= Decimal::ZERO);
            prev = row.closing_accumulated;
        }
        for pair in sched.rows.windows(2) {
            assert_eq!(pair[0].closing_gross, pair[1].opening_gross);
            assert_eq!(pair[0].closing_accumulated, pair[1].opening_accumulated);
        }
    }

    #[test]
    fn test_opening_ppe_depreciates_without_addition() {
        let sched = build_depreciation_schedule(&[], dec!(1200), Some(12), &calendar(3)).unwrap();
        assert_eq!(sched.rows[0].opening_gross, dec!(1200));
        assert_eq!(sched.rows[0].additions, Decimal::ZERO);
        assert_eq!(sched.rows[0].depreciation, dec!(100));
        assert!(sched.assets[0].from_opening);
    }

    #[test]
    fn test_opening_ppe_without_life_is_not_depreciated() {
        let sched = build_depreciation_schedule(&[], dec!(1200), None, &calendar(3)).unwrap();
        assert!(sched.depreciation().iter().all(|d| d.is_zero()));
        assert_eq!(sched.rows[2].net_book_value, dec!(1200));
    }

    #[test]
    fn test_declining_balance_writes_off_fully() {
        let mut item = capex("Van", dec!(1000), 1, 4);
        item.method = DepreciationMethod::DecliningBalance { factor: dec!(2) };
        let sched = build_depreciation_schedule(&[item], Decimal::ZERO, None, &calendar(6)).unwrap();
        let dep = sched.depreciation();
        // 50% per period: 500, 250, 125, remainder 125
        assert_eq!(&dep[..4], &[dec!(500), dec!(250), dec!(125), dec!(125)]);
        assert_eq!(sched.rows[5].net_book_value, Decimal::ZERO);
    }

    #[test]
    fn test_capex_after_horizon_fails() {
        let item = CapexItem {
            label: "Factory".into(),
            amount: dec!(1),
            acquisition_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            useful_life: 10,
            method: DepreciationMethod::StraightLine,
        };
        let err = build_depreciation_schedule(&[item], Decimal::ZERO, None, &calendar(12)).unwrap_err();
        match err {
            FinModelError::OutOfHorizonCapex { item, .. } => assert_eq!(item, "Factory"),
            e => panic!("Expected OutOfHorizonCapex, got {e:?}"),
        }
    }
}
