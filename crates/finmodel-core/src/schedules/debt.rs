use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assumptions::{AmortizationStyle, DebtFacility};
use crate::calendar::PeriodCalendar;
use crate::types::{Money, Rate};

// ---------------------------------------------------------------------------
// Output structs
// ---------------------------------------------------------------------------

/// A single period of one facility's schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtRow {
    pub period: usize,
    pub opening_balance: Money,
    pub drawdown: Money,
    pub interest: Money,
    pub principal: Money,
    pub payment: Money,
    pub closing_balance: Money,
}

/// Full schedule for one facility, one row per horizon period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilitySchedule {
    pub label: String,
    pub amortization: AmortizationStyle,
    pub principal: Money,
    pub periodic_rate: Rate,
    pub start_period: usize,
    pub tenor_periods: usize,
    /// Drawn before the model start and carried in the opening balance
    pub in_opening_balance: bool,
    /// Constant periodic payment (annuity facilities only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub periodic_payment: Option<Money>,
    pub rows: Vec<DebtRow>,
    #[serde(skip)]
    principal_by_period: Vec<Money>,
}

/// Facility totals for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtTotals {
    pub period: usize,
    pub opening_balance: Money,
    pub drawdowns: Money,
    pub interest: Money,
    pub principal: Money,
    pub closing_balance: Money,
    /// Principal falling due within the next twelve months
    pub current_portion: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtSchedule {
    pub facilities: Vec<FacilitySchedule>,
    pub totals: Vec<DebtTotals>,
}

impl DebtSchedule {
    pub fn interest(&self) -> Vec<Money> {
        self.totals.iter().map(|t| t.interest).collect()
    }

    pub fn opening_debt(&self) -> Money {
        self.totals
            .first()
            .map(|t| t.opening_balance)
            .unwrap_or(Decimal::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Amortize every facility over the calendar and aggregate the results.
/// Facilities starting after the horizon are skipped with a warning.
pub fn build_debt_schedule(
    facilities: &[DebtFacility],
    calendar: &PeriodCalendar,
    warnings: &mut Vec<String>,
) -> DebtSchedule {
    let n = calendar.len();
    let ppy = calendar.periods_per_year() as usize;

    let mut schedules = Vec::with_capacity(facilities.len());
    for facility in facilities {
        let (start_period, in_opening_balance) = if facility.start_date <= calendar.start_date() {
            (0, true)
        } else {
            match calendar.index_of(facility.start_date) {
                Some(p) => (p, false),
                None => {
                    tracing::warn!(facility = %facility.label, "debt facility starts after the horizon");
                    warnings.push(format!(
                        "Debt facility '{}' starts on {}, after the horizon; excluded",
                        facility.label, facility.start_date
                    ));
                    continue;
                }
            }
        };
        schedules.push(amortize(facility, start_period, in_opening_balance, ppy, n));
    }

    let totals = (0..n)
        .map(|p| {
            let mut t = DebtTotals {
                period: p,
                opening_balance: Decimal::ZERO,
                drawdowns: Decimal::ZERO,
                interest: Decimal::ZERO,
                principal: Decimal::ZERO,
                closing_balance: Decimal::ZERO,
                current_portion: Decimal::ZERO,
            };
            for s in &schedules {
                let row = &s.rows[p];
                t.opening_balance += row.opening_balance;
                t.drawdowns += row.drawdown;
                t.interest += row.interest;
                t.principal += row.principal;
                t.closing_balance += row.closing_balance;
                t.current_portion += s
                    .principal_by_period
                    .iter()
                    .skip(p + 1)
                    .take(ppy)
                    .copied()
                    .sum::<Money>();
            }
            t
        })
        .collect();

    tracing::debug!(facilities = schedules.len(), periods = n, "built debt schedule");

    DebtSchedule {
        facilities: schedules,
        totals,
    }
}

/// Constant payment that retires `principal` over `periods` at `rate`.
/// A zero rate degenerates to equal principal instalments.
pub fn annuity_payment(principal: Money, rate: Rate, periods: usize) -> Money {
    if periods == 0 {
        return principal;
    }
    let level = principal / Decimal::from(periods as u64);
    if rate.is_zero() {
        return level;
    }
    // payment = P·r / (1 − (1+r)^−n), built from the discount factor so it
    // cannot overflow on long tenors
    let v = Decimal::ONE / (Decimal::ONE + rate);
    let mut v_n = Decimal::ONE;
    for _ in 0..periods {
        v_n *= v;
    }
    // A rate below Decimal precision leaves v^n at one
    (principal * rate)
        .checked_div(Decimal::ONE - v_n)
        .unwrap_or(level)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn amortize(
    facility: &DebtFacility,
    start_period: usize,
    in_opening_balance: bool,
    periods_per_year: usize,
    n: usize,
) -> FacilitySchedule {
    let rate = facility.annual_rate / Decimal::from(periods_per_year as u64);
    let tenor = facility.tenor_years as usize * periods_per_year;
    let payment = match facility.amortization {
        AmortizationStyle::Annuity => Some(annuity_payment(facility.principal, rate, tenor)),
        AmortizationStyle::Bullet => None,
    };

    // Rows run over the facility's whole life so the current portion can
    // look past the horizon; only the first `n` are reported.
    let life_end = (start_period + tenor).max(n);
    let mut rows = Vec::with_capacity(life_end);
    let mut balance = if in_opening_balance {
        facility.principal
    } else {
        Decimal::ZERO
    };

    for period in 0..life_end {
        if period < start_period || period >= start_period + tenor {
            rows.push(DebtRow {
                period,
                opening_balance: balance,
                drawdown: Decimal::ZERO,
                interest: Decimal::ZERO,
                principal: Decimal::ZERO,
                payment: Decimal::ZERO,
                closing_balance: balance,
            });
            continue;
        }

        let k = period - start_period;
        let opening = balance;
        let drawdown = if k == 0 && !in_opening_balance {
            facility.principal
        } else {
            Decimal::ZERO
        };
        let outstanding = opening + drawdown;
        let interest = outstanding * rate;

        let principal = if k + 1 == tenor {
            outstanding
        } else {
            match payment {
                Some(pmt) => (pmt - interest).max(Decimal::ZERO).min(outstanding),
                None => Decimal::ZERO,
            }
        };
        balance = outstanding - principal;

        rows.push(DebtRow {
            period,
            opening_balance: opening,
            drawdown,
            interest,
            principal,
            payment: interest + principal,
            closing_balance: balance,
        });
    }

    let principal_by_period = rows.iter().map(|r| r.principal).collect();
    rows.truncate(n);

    FacilitySchedule {
        label: facility.label.clone(),
        amortization: facility.amortization,
        principal: facility.principal,
        periodic_rate: rate,
        start_period,
        tenor_periods: tenor,
        in_opening_balance,
        periodic_payment: payment,
        rows,
        principal_by_period,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
