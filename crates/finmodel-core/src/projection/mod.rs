pub mod opex;
pub mod revenue;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::assumptions::Escalation;
use crate::error::FinModelError;
use crate::types::Money;
use crate::FinModelResult;

/// Largest per-period amount any projected line or total may reach. Keeps
/// every downstream product and running balance well inside `Decimal`.
pub const MAX_PROJECTED_AMOUNT: Decimal = dec!(1000000000000000000);

/// A labelled per-period series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedLine {
    pub label: String,
    pub values: Vec<Money>,
}

/// Expand a base amount from `start_period` through `n_periods`.
pub(crate) fn escalate(
    field: &str,
    base: Money,
    escalation: &Escalation,
    start_period: u32,
    n_periods: usize,
) -> FinModelResult<Vec<Money>> {
    (0..n_periods)
        .map(|p| match (p as u32).checked_sub(start_period) {
            Some(elapsed) => bounded(field, p, escalation.amount(base, elapsed)),
            None => Ok(Decimal::ZERO),
        })
        .collect()
}

/// Element-wise sum of several series of equal length.
pub(crate) fn sum_lines(
    field: &str,
    lines: &[ProjectedLine],
    n_periods: usize,
) -> FinModelResult<Vec<Money>> {
    let mut total = vec![Decimal::ZERO; n_periods];
    for line in lines {
        for (p, (t, v)) in total.iter_mut().zip(&line.values).enumerate() {
            *t = bounded(field, p, t.checked_add(*v))?;
        }
    }
    Ok(total)
}

/// Reject a projected amount that overflowed or left the supported range.
pub(crate) fn bounded(field: &str, period: usize, value: Option<Money>) -> FinModelResult<Money> {
    match value {
        Some(v) if v.abs() <= MAX_PROJECTED_AMOUNT => Ok(v),
        _ => Err(FinModelError::InvalidInput {
            field: field.into(),
            reason: format!(
                "Projected amount in period {period} exceeds {MAX_PROJECTED_AMOUNT}"
            ),
        }),
    }
}
