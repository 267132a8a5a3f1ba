use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FinModelError;
use crate::FinModelResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Day-count year used to convert DSO/DIO/DPO into period balances.
/// Every month counts as 30 days, every quarter as 90.
pub const DAY_COUNT_BASIS: Decimal = dec!(360);

/// Longest projection the engine accepts (100 years of months).
pub const MAX_HORIZON_PERIODS: u32 = 1200;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Reporting period length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Monthly,
    Quarterly,
    Annual,
}

impl Granularity {
    pub fn months_per_period(self) -> u32 {
        match self {
            Granularity::Monthly => 1,
            Granularity::Quarterly => 3,
            Granularity::Annual => 12,
        }
    }

    pub fn periods_per_year(self) -> u32 {
        12 / self.months_per_period()
    }
}

/// A single reporting period. Shared read-only by every scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub index: usize,
    pub label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Ordered, gapless sequence of reporting periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodCalendar {
    pub granularity: Granularity,
    pub periods: Vec<Period>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

impl PeriodCalendar {
    /// Build `horizon` consecutive periods starting on `start`.
    ///
    /// Period boundaries are computed from the original start date (not
    /// chained), so a calendar starting on the 31st clamps to month end
    /// without drifting.
    pub fn build(
        start: NaiveDate,
        horizon: u32,
        granularity: Granularity,
    ) -> FinModelResult<Self> {
        if horizon == 0 {
            return Err(FinModelError::InvalidHorizon {
                horizon,
                reason: "Horizon must contain at least one period".into(),
            });
        }
        if horizon > MAX_HORIZON_PERIODS {
            return Err(FinModelError::InvalidHorizon {
                horizon,
                reason: format!("Horizon cannot exceed {MAX_HORIZON_PERIODS} periods"),
            });
        }

        let step = granularity.months_per_period();
        let mut boundaries = Vec::with_capacity(horizon as usize + 1);
        for k in 0..=horizon {
            let date = start
                .checked_add_months(Months::new(k * step))
                .ok_or_else(|| {
                    FinModelError::DateError(format!(
                        "Period {k} boundary overflows the calendar from {start}"
                    ))
                })?;
            boundaries.push(date);
        }

        let periods = boundaries
            .windows(2)
            .enumerate()
            .map(|(index, pair)| {
                let start_date = pair[0];
                let end_date = pair[1].pred_opt().unwrap_or(pair[1]);
                Period {
                    index,
                    label: period_label(granularity, start_date, end_date),
                    start_date,
                    end_date,
                }
            })
            .collect();

        Ok(PeriodCalendar {
            granularity,
            periods,
        })
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn start_date(&self) -> NaiveDate {
        self.periods[0].start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.periods[self.periods.len() - 1].end_date
    }

    pub fn periods_per_year(&self) -> u32 {
        self.granularity.periods_per_year()
    }

    /// Days represented by one period under the 360-day convention.
    pub fn days_in_period_basis(&self) -> Decimal {
        DAY_COUNT_BASIS / Decimal::from(self.periods_per_year())
    }

    /// Index of the period containing `date`, or `None` when the date
    /// falls before the start or after the horizon.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        let idx = self.periods.partition_point(|p| p.end_date < date);
        match self.periods.get(idx) {
            Some(p) if p.start_date <= date => Some(idx),
            _ => None,
        }
    }

    pub fn labels(&self) -> Vec<String> {
        self.periods.iter().map(|p| p.label.clone()).collect()
    }
}

fn period_label(granularity: Granularity, start: NaiveDate, end: NaiveDate) -> String {
    match granularity {
        Granularity::Monthly => start.format("%Y-%m").to_string(),
        Granularity::Quarterly => format!("Q{} {}", start.month0() / 3 + 1, start.year()),
        Granularity::Annual => format!("FY{}", end.year()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
