use std::time::Instant;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::assumptions::{AccountingStandard, Assumptions, HistoricalPeriod};
use crate::calendar::{Granularity, Period, PeriodCalendar};
use crate::projection::opex::{project_opex, OpexProjection};
use crate::projection::revenue::{project_revenue, RevenueProjection};
use crate::schedules::debt::{build_debt_schedule, DebtSchedule};
use crate::schedules::depreciation::{build_depreciation_schedule, DepreciationSchedule};
use crate::schedules::equity::{build_equity_schedule, EquitySchedule};
use crate::schedules::tax::{compute_tax, TaxSchedule};
use crate::schedules::working_capital::{build_working_capital_schedule, WorkingCapitalSchedule};
use crate::statements::assembler::{
    assemble_statements, AssemblyInputs, BalanceSheet, CashFlowStatement, IncomeStatement,
};
use crate::statements::opening::{resolve_opening_balance, OpeningBalance};
use crate::statements::ratios::{compute_liquidity_ratios, LiquidityRatios};
use crate::statements::table::{build_tables, StatementTable};
use crate::statements::validator::{validate_statements, ValidationInputs, ValidationReport};
use crate::types::{with_metadata, ComputationOutput, Currency};
use crate::FinModelResult;

pub const METHODOLOGY: &str =
    "Integrated three-statement projection with financing-derived opening balance sheet";

// ---------------------------------------------------------------------------
// Output bundle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanySummary {
    pub name: String,
    pub currency: Currency,
    pub accounting_standard: AccountingStandard,
    pub granularity: Granularity,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub horizon: u32,
}

/// Everything one projection run produces. Built fresh by [`calculate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputBundle {
    pub company: CompanySummary,
    pub periods: Vec<Period>,
    pub opening_balance: OpeningBalance,
    pub revenue: RevenueProjection,
    pub opex: OpexProjection,
    pub income_statement: Vec<IncomeStatement>,
    pub balance_sheet: Vec<BalanceSheet>,
    pub cash_flow_statement: Vec<CashFlowStatement>,
    pub depreciation_schedule: DepreciationSchedule,
    pub debt_schedule: DebtSchedule,
    pub equity_schedule: EquitySchedule,
    pub working_capital_schedule: WorkingCapitalSchedule,
    pub tax_schedule: TaxSchedule,
    pub liquidity_ratios: Vec<LiquidityRatios>,
    pub validation: ValidationReport,
    pub historical: Vec<HistoricalPeriod>,
    pub warnings: Vec<String>,
}

impl OutputBundle {
    /// Statements and schedules as line-item tables, labelled for the
    /// company's accounting standard.
    pub fn tables(&self) -> Vec<StatementTable> {
        build_tables(self)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run a full projection.
///
/// Input errors abort before anything is built. Validation findings never
/// abort; they are returned in `validation`.
pub fn calculate(assumptions: &Assumptions) -> FinModelResult<OutputBundle> {
    let started = Instant::now();
    assumptions.validate()?;

    let company = &assumptions.company;
    let calendar = PeriodCalendar::build(company.start_date, company.horizon, company.granularity)?;
    let mut warnings: Vec<String> = Vec::new();

    if !assumptions.has_opening_financing() {
        warnings.push(
            "No debt or equity is dated at or before the start date; the opening balance sheet is empty"
                .into(),
        );
    }

    let opening = resolve_opening_balance(assumptions);

    let revenue = project_revenue(&assumptions.revenue_drivers, &assumptions.cogs, &calendar)?;
    let opex = project_opex(&assumptions.opex_items, &calendar)?;
    let depreciation = build_depreciation_schedule(
        &assumptions.capex_items,
        opening.ppe_gross,
        company.financed_asset_life,
        &calendar,
    )?;
    let debt = build_debt_schedule(&assumptions.debt_facilities, &calendar, &mut warnings);
    let equity = build_equity_schedule(&assumptions.equity_entries, &calendar, &mut warnings);
    let working_capital = build_working_capital_schedule(
        &assumptions.working_capital,
        &revenue.revenue,
        &revenue.cost_of_sales,
        &opening.working_capital(),
        &calendar,
    );

    let tax = compute_tax(
        &revenue.gross_profit,
        &opex.total,
        &depreciation.depreciation(),
        &debt.interest(),
        &assumptions.tax,
    );

    let statements = assemble_statements(&AssemblyInputs {
        calendar: &calendar,
        opening: &opening,
        revenue: &revenue,
        opex: &opex,
        depreciation: &depreciation,
        debt: &debt,
        equity: &equity,
        working_capital: &working_capital,
        tax: &tax,
    });

    let liquidity_ratios = compute_liquidity_ratios(
        &statements.income_statements,
        &statements.balance_sheets,
        &debt,
    );

    let validation = validate_statements(&ValidationInputs {
        periods: &calendar.periods,
        opening: &opening,
        balance_sheets: &statements.balance_sheets,
        cash_flows: &statements.cash_flow_statements,
        debt: &debt,
        depreciation: &depreciation,
        working_capital: &working_capital,
    });

    tracing::info!(
        company = %company.name,
        periods = calendar.len(),
        errors = validation.error_count,
        warnings = validation.warning_count,
        elapsed_us = started.elapsed().as_micros() as u64,
        "projection complete"
    );

    Ok(OutputBundle {
        company: CompanySummary {
            name: company.name.clone(),
            currency: company.currency.clone(),
            accounting_standard: company.accounting_standard,
            granularity: company.granularity,
            start_date: calendar.start_date(),
            end_date: calendar.end_date(),
            horizon: company.horizon,
        },
        periods: calendar.periods,
        opening_balance: opening,
        revenue,
        opex,
        income_statement: statements.income_statements,
        balance_sheet: statements.balance_sheets,
        cash_flow_statement: statements.cash_flow_statements,
        depreciation_schedule: depreciation,
        debt_schedule: debt,
        equity_schedule: equity,
        working_capital_schedule: working_capital,
        tax_schedule: tax,
        liquidity_ratios,
        validation,
        historical: assumptions.historical.clone(),
        warnings,
    })
}

/// [`calculate`] wrapped in the standard output envelope.
pub fn calculate_with_envelope(
    assumptions: &Assumptions,
) -> FinModelResult<ComputationOutput<OutputBundle>> {
    let bundle = calculate(assumptions)?;
    let warnings = bundle.warnings.clone();
    Ok(with_metadata(METHODOLOGY, assumptions, warnings, bundle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::tests::sample_assumptions;
    use crate::error::FinModelError;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    #[test]
    fn test_sample_bundle_shape() {
        let bundle = calculate(&sample_assumptions()).unwrap();
        assert_eq!(bundle.periods.len(), 12);
        assert_eq!(bundle.income_statement.len(), 12);
        assert_eq!(bundle.balance_sheet.len(), 12);
        assert_eq!(bundle.cash_flow_statement.len(), 12);
        assert_eq!(bundle.company.end_date, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        assert!(bundle.warnings.is_empty());
        assert!(bundle.validation.is_balanced);
    }

    #[test]
    fn test_invalid_input_returns_no_bundle() {
        let mut a = sample_assumptions();
        a.debt_facilities[0].principal = Decimal::ZERO;
        match calculate(&a) {
            Err(FinModelError::InvalidInput { field, .. }) => {
                assert_eq!(field, "debt_facilities[0].principal")
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_capex_after_horizon_is_rejected() {
        let mut a = sample_assumptions();
        a.capex_items[0].acquisition_date = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        assert!(matches!(
            calculate(&a),
            Err(FinModelError::OutOfHorizonCapex { .. })
        ));
    }

    #[test]
    fn test_missing_opening_financing_warns() {
        let mut a = sample_assumptions();
        a.debt_facilities.clear();
        a.equity_entries.clear();
        let bundle = calculate(&a).unwrap();
        assert_eq!(bundle.opening_balance.total_assets, Decimal::ZERO);
        assert_eq!(bundle.warnings.len(), 1);
    }

    #[test]
    fn test_envelope_carries_metadata() {
        let out = calculate_with_envelope(&sample_assumptions()).unwrap();
        assert_eq!(out.methodology, METHODOLOGY);
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
        assert_eq!(out.assumptions["company"]["name"], "Acme Robotics");
    }
}
