use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calendar::Period;
use crate::engine::OutputBundle;
use crate::schedules::debt::DebtSchedule;
use crate::schedules::depreciation::DepreciationSchedule;
use crate::schedules::working_capital::WorkingCapitalSchedule;
use crate::statements::assembler::{BalanceSheet, CashFlowStatement};
use crate::statements::opening::OpeningBalance;
use crate::types::Money;

/// Largest absolute difference treated as equal: a hundredth of the
/// smallest currency subunit.
pub const BALANCE_TOLERANCE: Decimal = dec!(0.0001);

const OPENING_LABEL: &str = "Opening";

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    BalanceSheetMismatch,
    CashFlowReconciliationMismatch,
    ScheduleDiscontinuity,
    NegativeBalance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFinding {
    pub kind: FindingKind,
    pub severity: Severity,
    pub message: String,
    /// `None` for the opening balance sheet
    pub period: Option<usize>,
    pub period_label: String,
    pub expected: Money,
    pub actual: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub tolerance: Decimal,
    pub is_balanced: bool,
    pub error_count: usize,
    pub warning_count: usize,
    pub findings: Vec<ValidationFinding>,
}

/// Read-only view of everything the validator inspects.
pub struct ValidationInputs<'a> {
    pub periods: &'a [Period],
    pub opening: &'a OpeningBalance,
    pub balance_sheets: &'a [BalanceSheet],
    pub cash_flows: &'a [CashFlowStatement],
    pub debt: &'a DebtSchedule,
    pub depreciation: &'a DepreciationSchedule,
    pub working_capital: &'a WorkingCapitalSchedule,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Re-run every check against a finished bundle.
pub fn validate(bundle: &OutputBundle) -> ValidationReport {
    validate_statements(&ValidationInputs {
        periods: &bundle.periods,
        opening: &bundle.opening_balance,
        balance_sheets: &bundle.balance_sheet,
        cash_flows: &bundle.cash_flow_statement,
        debt: &bundle.debt_schedule,
        depreciation: &bundle.depreciation_schedule,
        working_capital: &bundle.working_capital_schedule,
    })
}

/// Recompute totals from line items and compare them, without trusting the
/// subtotals the assembler stored. Findings are reported, never corrected.
pub fn validate_statements(inputs: &ValidationInputs<'_>) -> ValidationReport {
    let mut findings = Vec::new();

    check_opening(inputs.opening, &mut findings);

    let mut prior_cash = inputs.opening.cash;
    for (p, period) in inputs.periods.iter().enumerate() {
        let at = Location {
            period: Some(p),
            label: &period.label,
        };
        let (Some(bs), Some(cf)) = (inputs.balance_sheets.get(p), inputs.cash_flows.get(p)) else {
            break;
        };

        // Accounting identity
        let assets = sum(&[bs.cash, bs.accounts_receivable, bs.inventory, bs.ppe_net]);
        let liabilities_and_equity = sum(&[
            bs.debt,
            bs.accounts_payable,
            bs.contributed_capital,
            bs.retained_earnings,
        ]);
        compare(
            &mut findings,
            FindingKind::BalanceSheetMismatch,
            &at,
            "Total assets differ from total liabilities plus equity",
            assets,
            liabilities_and_equity,
        );
        compare(
            &mut findings,
            FindingKind::BalanceSheetMismatch,
            &at,
            "Stated total assets differ from the sum of asset lines",
            assets,
            bs.total_assets,
        );
        compare(
            &mut findings,
            FindingKind::BalanceSheetMismatch,
            &at,
            "Stated liabilities plus equity differ from the sum of their lines",
            liabilities_and_equity,
            sum(&[bs.total_liabilities, bs.total_equity]),
        );

        // Cash reconciliation
        compare(
            &mut findings,
            FindingKind::CashFlowReconciliationMismatch,
            &at,
            "Opening cash differs from the prior period's closing cash",
            prior_cash,
            cf.opening_cash,
        );
        compare(
            &mut findings,
            FindingKind::CashFlowReconciliationMismatch,
            &at,
            "Cash flow ending cash differs from balance sheet cash",
            bs.cash,
            cf.ending_cash,
        );
        compare(
            &mut findings,
            FindingKind::CashFlowReconciliationMismatch,
            &at,
            "Cash flow sections do not sum to ending cash",
            sum(&[
                cf.opening_cash,
                cf.cash_from_operations,
                cf.cash_from_investing,
                cf.cash_from_financing,
            ]),
            cf.ending_cash,
        );
        compare(
            &mut findings,
            FindingKind::CashFlowReconciliationMismatch,
            &at,
            "Operating cash flow differs from net income plus depreciation and working capital",
            sum(&[cf.net_income, cf.depreciation, cf.working_capital_impact]),
            cf.cash_from_operations,
        );
        prior_cash = bs.cash;

        for (line, value) in [
            ("Cash", bs.cash),
            ("Accounts receivable", bs.accounts_receivable),
            ("Inventory", bs.inventory),
            ("Accounts payable", bs.accounts_payable),
        ] {
            if value < -BALANCE_TOLERANCE {
                push(
                    &mut findings,
                    FindingKind::NegativeBalance,
                    Severity::Warning,
                    &at,
                    format!("{line} is negative"),
                    Decimal::ZERO,
                    value,
                );
            }
        }
    }

    check_continuity(inputs, &mut findings);

    let error_count = findings
        .iter()
        .filter(|f| f.severity == Severity::Error)
        .count();
    let warning_count = findings.len() - error_count;

    ValidationReport {
        tolerance: BALANCE_TOLERANCE,
        is_balanced: error_count == 0,
        error_count,
        warning_count,
        findings,
    }
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

struct Location<'a> {
    period: Option<usize>,
    label: &'a str,
}

fn check_opening(opening: &OpeningBalance, findings: &mut Vec<ValidationFinding>) {
    let at = Location {
        period: None,
        label: OPENING_LABEL,
    };
    let assets = sum(&[
        opening.cash,
        opening.accounts_receivable,
        opening.inventory,
        opening.ppe_net,
    ]);
    let liabilities_and_equity = sum(&[opening.debt, opening.accounts_payable, opening.equity]);
    compare(
        findings,
        FindingKind::BalanceSheetMismatch,
        &at,
        "Opening assets differ from opening liabilities plus equity",
        assets,
        liabilities_and_equity,
    );
    compare(
        findings,
        FindingKind::BalanceSheetMismatch,
        &at,
        "Stated opening total assets differ from the sum of asset lines",
        assets,
        opening.total_assets,
    );
    compare(
        findings,
        FindingKind::BalanceSheetMismatch,
        &at,
        "Stated opening liabilities plus equity differ from the sum of their lines",
        liabilities_and_equity,
        opening.total_liabilities_and_equity,
    );
}

fn check_continuity(inputs: &ValidationInputs<'_>, findings: &mut Vec<ValidationFinding>) {
    let opening = inputs.opening;
    let mut prior_debt = opening.debt;
    let mut prior_gross = opening.ppe_gross;
    let mut prior_accumulated = opening.accumulated_depreciation;
    let mut prior_wc = inputs.working_capital.opening.clone();

    for (p, period) in inputs.periods.iter().enumerate() {
        let at = Location {
            period: Some(p),
            label: &period.label,
        };

        if let Some(debt) = inputs.debt.totals.get(p) {
            compare(
                findings,
                FindingKind::ScheduleDiscontinuity,
                &at,
                "Debt opening balance differs from prior closing balance",
                prior_debt,
                debt.opening_balance,
            );
            prior_debt = debt.closing_balance;
        }

        if let Some(row) = inputs.depreciation.rows.get(p) {
            compare(
                findings,
                FindingKind::ScheduleDiscontinuity,
                &at,
                "Opening gross PP&E differs from prior closing gross PP&E",
                prior_gross,
                row.opening_gross,
            );
            compare(
                findings,
                FindingKind::ScheduleDiscontinuity,
                &at,
                "Opening accumulated depreciation differs from prior closing",
                prior_accumulated,
                row.opening_accumulated,
            );
            prior_gross = row.closing_gross;
            prior_accumulated = row.closing_accumulated;
        }

        if let Some(row) = inputs.working_capital.rows.get(p) {
            for (line, prior, closing, change) in [
                (
                    "Receivables",
                    prior_wc.accounts_receivable,
                    row.accounts_receivable,
                    row.change_in_receivables,
                ),
                ("Inventory", prior_wc.inventory, row.inventory, row.change_in_inventory),
                (
                    "Payables",
                    prior_wc.accounts_payable,
                    row.accounts_payable,
                    row.change_in_payables,
                ),
            ] {
                compare(
                    findings,
                    FindingKind::ScheduleDiscontinuity,
                    &at,
                    &format!("{line} movement does not bridge prior and closing balance"),
                    closing.saturating_sub(prior),
                    change,
                );
            }
            prior_wc.accounts_receivable = row.accounts_receivable;
            prior_wc.inventory = row.inventory;
            prior_wc.accounts_payable = row.accounts_payable;
        }
    }
}

fn compare(
    findings: &mut Vec<ValidationFinding>,
    kind: FindingKind,
    at: &Location<'_>,
    message: &str,
    expected: Money,
    actual: Money,
) {
    let difference = actual.saturating_sub(expected);
    if difference.abs() > BALANCE_TOLERANCE {
        push(
            findings,
            kind,
            Severity::Error,
            at,
            format!("{message} by {difference}"),
            expected,
            actual,
        );
    }
}

/// Saturating so that a bundle with absurd values reports mismatches
/// instead of overflowing.
fn sum(values: &[Money]) -> Money {
    values
        .iter()
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(*v))
}

fn push(
    findings: &mut Vec<ValidationFinding>,
    kind: FindingKind,
    severity: Severity,
    at: &Location<'_>,
    message: String,
    expected: Money,
    actual: Money,
) {
    findings.push(ValidationFinding {
        kind,
        severity,
        message,
        period: at.period,
        period_label: at.label.to_string(),
        expected,
        actual,
    });
}
