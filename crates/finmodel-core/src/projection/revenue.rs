use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assumptions::{CogsPolicy, RevenueDriver, RevenueMethod};
use crate::calendar::PeriodCalendar;
use crate::projection::{bounded, escalate, sum_lines, ProjectedLine};
use crate::types::Money;
use crate::FinModelResult;

/// Revenue, cost of sales and gross profit per period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueProjection {
    /// One line per revenue driver, in input order
    pub drivers: Vec<ProjectedLine>,
    pub revenue: Vec<Money>,
    /// Itemized COGS lines (empty for percentage-of-revenue)
    pub cost_lines: Vec<ProjectedLine>,
    pub cost_of_sales: Vec<Money>,
    pub gross_profit: Vec<Money>,
}

pub fn project_revenue(
    drivers: &[RevenueDriver],
    cogs: &CogsPolicy,
    calendar: &PeriodCalendar,
) -> FinModelResult<RevenueProjection> {
    let n = calendar.len();

    let driver_lines = drivers
        .iter()
        .enumerate()
        .map(|(i, d)| {
            Ok(ProjectedLine {
                label: d.id.clone(),
                values: driver_values(&format!("revenue_drivers[{i}]"), d, n)?,
            })
        })
        .collect::<FinModelResult<Vec<_>>>()?;
    let revenue = sum_lines("revenue_drivers", &driver_lines, n)?;

    let (cost_lines, cost_of_sales) = match cogs {
        CogsPolicy::PercentOfRevenue { rate } => {
            (Vec::new(), revenue.iter().map(|r| r * rate).collect())
        }
        CogsPolicy::Itemized { items } => {
            let lines = items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    Ok(ProjectedLine {
                        label: item.label.clone(),
                        values: escalate(
                            &format!("cogs.items[{i}]"),
                            item.base_amount,
                            &item.escalation,
                            item.start_period,
                            n,
                        )?,
                    })
                })
                .collect::<FinModelResult<Vec<_>>>()?;
            let total = sum_lines("cogs.items", &lines, n)?;
            (lines, total)
        }
    };

    let gross_profit = revenue
        .iter()
        .zip(&cost_of_sales)
        .map(|(r, c)| r - c)
        .collect();

    tracing::debug!(drivers = drivers.len(), periods = n, "projected revenue");

    Ok(RevenueProjection {
        drivers: driver_lines,
        revenue,
        cost_lines,
        cost_of_sales,
        gross_profit,
    })
}

fn driver_values(field: &str, driver: &RevenueDriver, n: usize) -> FinModelResult<Vec<Money>> {
    let start = driver.start_period as usize;
    let mut values = vec![Decimal::ZERO; n];
    if start >= n {
        return Ok(values);
    }

    match &driver.method {
        RevenueMethod::UnitPrice {
            units,
            price,
            unit_growth,
            price_growth,
        } => {
            // Units and price compound separately; only their product is bounded.
            let mut u = Some(*units);
            let mut p = Some(*price);
            for (period, value) in values.iter_mut().enumerate().skip(start) {
                *value = bounded(field, period, u.zip(p).and_then(|(u, p)| u.checked_mul(p)))?;
                u = u.and_then(|u| u.checked_mul(Decimal::ONE + unit_growth));
                p = p.and_then(|p| p.checked_mul(Decimal::ONE + price_growth));
            }
        }
        RevenueMethod::GrowthOnBase { base, growth } => {
            let mut current = Some(*base);
            for (period, value) in values.iter_mut().enumerate().skip(start) {
                *value = bounded(field, period, current)?;
                current = current.and_then(|c| c.checked_mul(Decimal::ONE + growth));
            }
        }
        RevenueMethod::Schedule { values: schedule } => {
            let slots = values.iter_mut().enumerate().skip(start);
            for ((period, value), scheduled) in slots.zip(schedule) {
                *value = bounded(field, period, Some(*scheduled))?;
            }
        }
    }
    Ok(values)
}
