use serde::{Deserialize, Serialize};

use crate::assumptions::OpexItem;
use crate::calendar::PeriodCalendar;
use crate::projection::{bounded, escalate, sum_lines, ProjectedLine};
use crate::types::Money;
use crate::FinModelResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpexProjection {
    /// One line per category; items sharing a category are merged, in
    /// first-seen order
    pub categories: Vec<ProjectedLine>,
    pub total: Vec<Money>,
}

pub fn project_opex(
    items: &[OpexItem],
    calendar: &PeriodCalendar,
) -> FinModelResult<OpexProjection> {
    let n = calendar.len();
    let mut categories: Vec<ProjectedLine> = Vec::new();

    for (i, item) in items.iter().enumerate() {
        let field = format!("opex_items[{i}]");
        let values = escalate(&field, item.base_amount, &item.escalation, item.start_period, n)?;
        match categories.iter_mut().find(|c| c.label == item.category) {
            Some(existing) => {
                for (p, (acc, v)) in existing.values.iter_mut().zip(values).enumerate() {
                    *acc = bounded(&field, p, acc.checked_add(v))?;
                }
            }
            None => categories.push(ProjectedLine {
                label: item.category.clone(),
                values,
            }),
        }
    }

    let total = sum_lines("opex_items", &categories, n)?;
    tracing::debug!(categories = categories.len(), periods = n, "projected opex");

    Ok(OpexProjection { categories, total })
}
