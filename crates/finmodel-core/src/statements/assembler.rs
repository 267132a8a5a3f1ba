use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::PeriodCalendar;
use crate::projection::opex::OpexProjection;
use crate::projection::revenue::RevenueProjection;
use crate::schedules::debt::DebtSchedule;
use crate::schedules::depreciation::DepreciationSchedule;
use crate::schedules::equity::EquitySchedule;
use crate::schedules::tax::TaxSchedule;
use crate::schedules::working_capital::WorkingCapitalSchedule;
use crate::statements::opening::OpeningBalance;
use crate::types::{safe_ratio, Money, Ratio};

// ---------------------------------------------------------------------------
// Output structs
// ---------------------------------------------------------------------------

/// Income statement for a single period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub period: usize,
    pub label: String,
    pub revenue: Money,
    pub cogs: Money,
    pub gross_profit: Money,
    pub gross_margin: Ratio,
    pub opex: Money,
    pub ebitda: Money,
    pub depreciation: Money,
    pub ebit: Money,
    pub interest_expense: Money,
    pub pre_tax_income: Money,
    pub tax: Money,
    pub net_income: Money,
    pub net_margin: Ratio,
}

/// Balance sheet at the end of a single period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub period: usize,
    pub label: String,
    pub cash: Money,
    pub accounts_receivable: Money,
    pub inventory: Money,
    pub total_current_assets: Money,
    pub ppe_gross: Money,
    pub accumulated_depreciation: Money,
    pub ppe_net: Money,
    pub total_assets: Money,
    pub debt: Money,
    pub accounts_payable: Money,
    pub total_liabilities: Money,
    /// Opening equity plus equity raised to date
    pub contributed_capital: Money,
    /// Cumulative net income since the model start
    pub retained_earnings: Money,
    pub total_equity: Money,
    pub total_liabilities_and_equity: Money,
}

/// Cash flow statement for a single period. Outflow lines (`capex`,
/// `principal_repayments`) are positive amounts; section subtotals carry
/// their sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowStatement {
    pub period: usize,
    pub label: String,
    pub net_income: Money,
    pub depreciation: Money,
    pub change_in_receivables: Money,
    pub change_in_inventory: Money,
    pub change_in_payables: Money,
    /// Cash effect of working capital (−ΔAR − ΔInventory + ΔAP)
    pub working_capital_impact: Money,
    pub cash_from_operations: Money,
    pub capex: Money,
    pub cash_from_investing: Money,
    pub debt_drawdowns: Money,
    pub principal_repayments: Money,
    pub equity_raised: Money,
    pub cash_from_financing: Money,
    pub net_change_in_cash: Money,
    pub opening_cash: Money,
    pub ending_cash: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statements {
    pub income_statements: Vec<IncomeStatement>,
    pub balance_sheets: Vec<BalanceSheet>,
    pub cash_flow_statements: Vec<CashFlowStatement>,
}

/// Everything the assembler merges. Each field is an independent schedule
/// over the same calendar.
pub struct AssemblyInputs<'a> {
    pub calendar: &'a PeriodCalendar,
    pub opening: &'a OpeningBalance,
    pub revenue: &'a RevenueProjection,
    pub opex: &'a OpexProjection,
    pub depreciation: &'a DepreciationSchedule,
    pub debt: &'a DebtSchedule,
    pub equity: &'a EquitySchedule,
    pub working_capital: &'a WorkingCapitalSchedule,
    pub tax: &'a TaxSchedule,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Combine the schedules into the three statements, period by period.
/// Cash is derived only from the cash flow statement, so balance sheet cash
/// and ending cash are the same number.
pub fn assemble_statements(inputs: &AssemblyInputs<'_>) -> Statements {
    let n = inputs.calendar.len();

    let mut income_statements = Vec::with_capacity(n);
    let mut balance_sheets = Vec::with_capacity(n);
    let mut cash_flow_statements = Vec::with_capacity(n);

    let mut cash = inputs.opening.cash;
    let mut retained_earnings = Decimal::ZERO;

    for (p, period) in inputs.calendar.periods.iter().enumerate() {
        let label = period.label.clone();
        let dep_row = &inputs.depreciation.rows[p];
        let debt_row = &inputs.debt.totals[p];
        let equity_row = &inputs.equity.rows[p];
        let wc_row = &inputs.working_capital.rows[p];
        let tax_row = &inputs.tax.rows[p];

        // -----------------------------------------------------------------
        // Income Statement
        // -----------------------------------------------------------------
        let revenue = inputs.revenue.revenue[p];
        let cogs = inputs.revenue.cost_of_sales[p];
        let gross_profit = inputs.revenue.gross_profit[p];
        let opex = inputs.opex.total[p];
        let ebitda = gross_profit - opex;
        let depreciation = dep_row.depreciation;
        let ebit = ebitda - depreciation;
        let interest_expense = debt_row.interest;
        let pre_tax_income = tax_row.pre_tax_income;
        let tax = tax_row.tax_expense;
        let net_income = tax_row.net_income;

        income_statements.push(IncomeStatement {
            period: p,
            label: label.clone(),
            revenue,
            cogs,
            gross_profit,
            gross_margin: safe_ratio(gross_profit, revenue),
            opex,
            ebitda,
            depreciation,
            ebit,
            interest_expense,
            pre_tax_income,
            tax,
            net_income,
            net_margin: safe_ratio(net_income, revenue),
        });

        // -----------------------------------------------------------------
        // Cash Flow Statement
        // -----------------------------------------------------------------
        let cash_from_operations = net_income + depreciation + wc_row.cash_impact;
        let capex = dep_row.additions;
        let cash_from_investing = -capex;
        let cash_from_financing = debt_row.drawdowns - debt_row.principal + equity_row.raised;
        let net_change_in_cash = cash_from_operations + cash_from_investing + cash_from_financing;
        let opening_cash = cash;
        cash = opening_cash + net_change_in_cash;

        cash_flow_statements.push(CashFlowStatement {
            period: p,
            label: label.clone(),
            net_income,
            depreciation,
            change_in_receivables: wc_row.change_in_receivables,
            change_in_inventory: wc_row.change_in_inventory,
            change_in_payables: wc_row.change_in_payables,
            working_capital_impact: wc_row.cash_impact,
            cash_from_operations,
            capex,
            cash_from_investing,
            debt_drawdowns: debt_row.drawdowns,
            principal_repayments: debt_row.principal,
            equity_raised: equity_row.raised,
            cash_from_financing,
            net_change_in_cash,
            opening_cash,
            ending_cash: cash,
        });

        // -----------------------------------------------------------------
        // Balance Sheet
        // -----------------------------------------------------------------
        retained_earnings += net_income;

        let total_current_assets = cash + wc_row.accounts_receivable + wc_row.inventory;
        let total_assets = total_current_assets + dep_row.net_book_value;
        let debt = debt_row.closing_balance;
        let total_liabilities = debt + wc_row.accounts_payable;
        let contributed_capital = equity_row.closing_capital;
        let total_equity = contributed_capital + retained_earnings;

        balance_sheets.push(BalanceSheet {
            period: p,
            label,
            cash,
            accounts_receivable: wc_row.accounts_receivable,
            inventory: wc_row.inventory,
            total_current_assets,
            ppe_gross: dep_row.closing_gross,
            accumulated_depreciation: dep_row.closing_accumulated,
            ppe_net: dep_row.net_book_value,
            total_assets,
            debt,
            accounts_payable: wc_row.accounts_payable,
            total_liabilities,
            contributed_capital,
            retained_earnings,
            total_equity,
            total_liabilities_and_equity: total_liabilities + total_equity,
        });
    }

    tracing::debug!(periods = n, "assembled statements");

    Statements {
        income_statements,
        balance_sheets,
        cash_flow_statements,
    }
}
