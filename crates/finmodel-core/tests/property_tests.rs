use chrono::{Months, NaiveDate};
use finmodel_core::assumptions::{
    AccountingStandard, AmortizationStyle, Assumptions, CapexItem, CogsPolicy, CompanyAssumptions,
    DebtFacility, DepreciationMethod, EquityEntry, Escalation, OpexItem, RevenueDriver,
    RevenueMethod, TaxAssumptions, UseOfProceeds, WorkingCapitalPolicy,
};
use finmodel_core::calendar::{Granularity, MAX_HORIZON_PERIODS};
use finmodel_core::statements::BALANCE_TOLERANCE;
use finmodel_core::{calculate, Currency, FinModelError};
use proptest::prelude::*;
use rust_decimal::Decimal;

const USES: [UseOfProceeds; 4] = [
    UseOfProceeds::Cash,
    UseOfProceeds::Capex,
    UseOfProceeds::WorkingCapital,
    UseOfProceeds::Operations,
];

const GRANULARITIES: [Granularity; 3] = [
    Granularity::Monthly,
    Granularity::Quarterly,
    Granularity::Annual,
];

/// Basis points to a decimal rate.
fn bp(value: i64) -> Decimal {
    Decimal::new(value, 4)
}

#[derive(Debug, Clone)]
struct ModelShape {
    granularity: usize,
    horizon: u32,
    revenue: i64,
    growth_bp: i64,
    cogs_bp: i64,
    opex: i64,
    capex: i64,
    capex_offset: u32,
    capex_life: u32,
    principal: i64,
    rate_bp: i64,
    tenor: u32,
    annuity: bool,
    debt_use: usize,
    equity: i64,
    equity_use: usize,
    days: (i64, i64, i64),
    tax_bp: i64,
    carry_forward: bool,
}

fn model_shape() -> impl Strategy<Value = ModelShape> {
    (
        (0usize..3, 1u32..24, 0i64..200_000, -300i64..500, 0i64..9_000),
        (0i64..80_000, 1i64..150_000, 0u32..24, 1u32..60),
        (1i64..2_000_000, 0i64..2_000, 1u32..8, any::<bool>(), 0usize..4),
        (1i64..1_000_000, 0usize..4),
        (0i64..120, 0i64..120, 0i64..120),
        (0i64..5_000, any::<bool>()),
    )
        .prop_map(|(company, capex, debt, equity, days, tax)| ModelShape {
            granularity: company.0,
            horizon: company.1,
            revenue: company.2,
            growth_bp: company.3,
            cogs_bp: company.4,
            opex: capex.0,
            capex: capex.1,
            capex_offset: capex.2,
            capex_life: capex.3,
            principal: debt.0,
            rate_bp: debt.1,
            tenor: debt.2,
            annuity: debt.3,
            debt_use: debt.4,
            equity: equity.0,
            equity_use: equity.1,
            days,
            tax_bp: tax.0,
            carry_forward: tax.1,
        })
}

/// Long horizons, growth up to 100% per period, day counts up to the policy
/// ceiling and tenors that can run past the period limit.
fn extreme_shape() -> impl Strategy<Value = ModelShape> {
    (
        (
            0usize..3,
            1u32..=MAX_HORIZON_PERIODS,
            0i64..1_000_000_000_000_000,
            0i64..=10_000,
            0i64..=10_000,
        ),
        (0i64..1_000_000_000, 1i64..1_000_000_000, 0u32..14_400, 1u32..1_200),
        (1i64..1_000_000_000_000, 0i64..=10_000, 1u32..1_300, any::<bool>(), 0usize..4),
        (1i64..1_000_000_000_000, 0usize..4),
        (0i64..=3_600, 0i64..=3_600, 0i64..=3_600),
        (0i64..=10_000, any::<bool>()),
    )
        .prop_map(|(company, capex, debt, equity, days, tax)| ModelShape {
            granularity: company.0,
            horizon: company.1,
            revenue: company.2,
            growth_bp: company.3,
            cogs_bp: company.4,
            opex: capex.0,
            capex: capex.1,
            capex_offset: capex.2,
            capex_life: capex.3,
            principal: debt.0,
            rate_bp: debt.1,
            tenor: debt.2,
            annuity: debt.3,
            debt_use: debt.4,
            equity: equity.0,
            equity_use: equity.1,
            days,
            tax_bp: tax.0,
            carry_forward: tax.1,
        })
}

fn build(shape: &ModelShape) -> Assumptions {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let granularity = GRANULARITIES[shape.granularity];
    let months_in_horizon = shape.horizon * granularity.months_per_period();
    let capex_date = start
        .checked_add_months(Months::new(shape.capex_offset % months_in_horizon))
        .unwrap();

    Assumptions {
        company: CompanyAssumptions {
            name: "Generated".into(),
            currency: Currency::USD,
            start_date: start,
            horizon: shape.horizon,
            granularity,
            accounting_standard: AccountingStandard::UsGaap,
            financed_asset_life: Some(shape.capex_life),
        },
        revenue_drivers: vec![RevenueDriver {
            id: "core".into(),
            start_period: 0,
            method: RevenueMethod::GrowthOnBase {
                base: Decimal::from(shape.revenue),
                growth: bp(shape.growth_bp),
            },
        }],
        cogs: CogsPolicy::PercentOfRevenue {
            rate: bp(shape.cogs_bp),
        },
        opex_items: vec![OpexItem {
            category: "Overheads".into(),
            base_amount: Decimal::from(shape.opex),
            escalation: Escalation::Flat,
            start_period: 0,
        }],
        capex_items: vec![CapexItem {
            label: "Plant".into(),
            amount: Decimal::from(shape.capex),
            acquisition_date: capex_date,
            useful_life: shape.capex_life,
            method: DepreciationMethod::StraightLine,
        }],
        debt_facilities: vec![DebtFacility {
            label: "Loan".into(),
            principal: Decimal::from(shape.principal),
            annual_rate: bp(shape.rate_bp),
            tenor_years: shape.tenor,
            amortization: if shape.annuity {
                AmortizationStyle::Annuity
            } else {
                AmortizationStyle::Bullet
            },
            start_date: start,
            use_of_proceeds: USES[shape.debt_use],
        }],
        equity_entries: vec![EquityEntry {
            label: "Equity".into(),
            amount: Decimal::from(shape.equity),
            contribution_date: start,
            use_of_proceeds: USES[shape.equity_use],
        }],
        working_capital: WorkingCapitalPolicy {
            dso: Decimal::from(shape.days.0),
            dio: Decimal::from(shape.days.1),
            dpo: Decimal::from(shape.days.2),
        },
        tax: TaxAssumptions::flat(bp(shape.tax_bp), shape.carry_forward),
        historical: vec![],
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Assets equal liabilities plus equity in every period, and balance
    /// sheet cash is the cash flow statement's ending cash.
    #[test]
    fn prop_statements_stay_integrated(shape in model_shape()) {
        let bundle = calculate(&build(&shape)).unwrap();

        let ob = &bundle.opening_balance;
        prop_assert!((ob.total_assets - ob.total_liabilities_and_equity).abs() <= BALANCE_TOLERANCE);

        for (bs, cf) in bundle.balance_sheet.iter().zip(&bundle.cash_flow_statement) {
            let gap = bs.total_assets - (bs.total_liabilities + bs.total_equity);
            prop_assert!(gap.abs() <= BALANCE_TOLERANCE, "gap {} in {}", gap, bs.label);
            prop_assert_eq!(bs.cash, cf.ending_cash);
        }
        prop_assert!(bundle.validation.is_balanced, "{:?}", bundle.validation.findings);
    }

    #[test]
    fn prop_schedules_stay_in_bounds(shape in model_shape()) {
        let bundle = calculate(&build(&shape)).unwrap();
        for row in &bundle.depreciation_schedule.rows {
            prop_assert!(row.closing_accumulated <= row.closing_gross);
            prop_assert!(row.net_book_value >= Decimal::ZERO);
        }
        for totals in &bundle.debt_schedule.totals {
            prop_assert!(totals.closing_balance >= Decimal::ZERO);
        }
        for row in &bundle.tax_schedule.rows {
            prop_assert!(row.tax_expense >= Decimal::ZERO);
            prop_assert!(row.loss_pool >= Decimal::ZERO);
        }
    }

    #[test]
    fn prop_calculation_is_idempotent(shape in model_shape()) {
        let assumptions = build(&shape);
        let first = calculate(&assumptions).unwrap();
        let second = calculate(&assumptions).unwrap();
        prop_assert_eq!(first, second);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Out-of-range growth or tenor surfaces as a typed input error; the
    /// engine never panics.
    #[test]
    fn prop_extreme_inputs_fail_cleanly(shape in extreme_shape()) {
        match calculate(&build(&shape)) {
            Ok(bundle) => {
                prop_assert_eq!(bundle.periods.len(), shape.horizon as usize);
                for (bs, cf) in bundle.balance_sheet.iter().zip(&bundle.cash_flow_statement) {
                    prop_assert_eq!(bs.cash, cf.ending_cash);
                }
            }
            Err(FinModelError::InvalidInput { .. }) => {}
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }
}
