use serde::{Deserialize, Serialize};

use crate::assumptions::AccountingStandard;
use crate::engine::OutputBundle;
use crate::statements::assembler::BalanceSheet;
use crate::types::{Money, Ratio};

/// Cell text for a value that is undefined (as opposed to zero).
pub const UNDEFINED_CELL: &str = "n/a";

const OPENING_COLUMN: &str = "Opening";

/// Prefix for caller-named breakdown rows (revenue drivers, cost lines,
/// opex categories). Fixed rows never start with whitespace.
pub const BREAKDOWN_INDENT: &str = "  ";

// ---------------------------------------------------------------------------
// Table types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Detail,
    Subtotal,
    Total,
    Ratio,
}

/// One labelled row of a statement table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub label: String,
    pub kind: LineKind,
    pub values: Vec<Option<Money>>,
}

/// Line items by period, in presentation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementTable {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<LineItem>,
}

impl StatementTable {
    fn new(title: &str, columns: Vec<String>) -> Self {
        Self {
            title: title.to_string(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn row(&self, label: &str) -> Option<&LineItem> {
        self.rows.iter().find(|r| r.label == label)
    }

    /// Rows as text, label first. Money to two places, ratios to four.
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                let places = if row.kind == LineKind::Ratio { 4 } else { 2 };
                std::iter::once(row.label.clone())
                    .chain(row.values.iter().map(|v| format_cell(*v, places)))
                    .collect()
            })
            .collect()
    }

    fn push<I>(&mut self, label: &str, kind: LineKind, values: I)
    where
        I: IntoIterator<Item = Money>,
    {
        self.rows.push(LineItem {
            label: label.to_string(),
            kind,
            values: values.into_iter().map(Some).collect(),
        });
    }

    fn push_breakdown(&mut self, label: &str, values: &[Money]) {
        self.push(
            &format!("{BREAKDOWN_INDENT}{label}"),
            LineKind::Detail,
            values.iter().copied(),
        );
    }

    fn push_ratio<I>(&mut self, label: &str, values: I)
    where
        I: IntoIterator<Item = Ratio>,
    {
        self.rows.push(LineItem {
            label: label.to_string(),
            kind: LineKind::Ratio,
            values: values.into_iter().collect(),
        });
    }
}

pub fn format_cell(value: Option<Money>, places: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", places, v),
        None => UNDEFINED_CELL.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Every statement and schedule of the bundle as a table.
pub fn build_tables(bundle: &OutputBundle) -> Vec<StatementTable> {
    let standard = bundle.company.accounting_standard;
    vec![
        income_statement_table(bundle, standard),
        balance_sheet_table(bundle, standard),
        cash_flow_table(bundle, standard),
        depreciation_table(bundle),
        debt_table(bundle),
        equity_table(bundle),
        working_capital_table(bundle),
        tax_table(bundle),
        ratios_table(bundle),
    ]
}

fn pick<'a>(standard: AccountingStandard, ifrs: &'a str, us_gaap: &'a str) -> &'a str {
    match standard {
        AccountingStandard::Ifrs => ifrs,
        AccountingStandard::UsGaap => us_gaap,
    }
}

fn period_columns(bundle: &OutputBundle) -> Vec<String> {
    bundle.periods.iter().map(|p| p.label.clone()).collect()
}

pub fn income_statement_table(bundle: &OutputBundle, standard: AccountingStandard) -> StatementTable {
    let title = pick(standard, "Statement of profit or loss", "Income statement");
    let mut t = StatementTable::new(title, period_columns(bundle));
    let is = &bundle.income_statement;

    for driver in &bundle.revenue.drivers {
        t.push_breakdown(&driver.label, &driver.values);
    }
    t.push("Revenue", LineKind::Subtotal, is.iter().map(|s| s.revenue));
    for line in &bundle.revenue.cost_lines {
        t.push_breakdown(&line.label, &line.values);
    }
    t.push(
        pick(standard, "Cost of sales", "Cost of goods sold"),
        LineKind::Subtotal,
        is.iter().map(|s| s.cogs),
    );
    t.push("Gross profit", LineKind::Subtotal, is.iter().map(|s| s.gross_profit));
    t.push_ratio("Gross margin", is.iter().map(|s| s.gross_margin));
    for category in &bundle.opex.categories {
        t.push_breakdown(&category.label, &category.values);
    }
    t.push("Operating expenses", LineKind::Subtotal, is.iter().map(|s| s.opex));
    t.push("EBITDA", LineKind::Subtotal, is.iter().map(|s| s.ebitda));
    t.push(
        pick(standard, "Depreciation", "Depreciation expense"),
        LineKind::Detail,
        is.iter().map(|s| s.depreciation),
    );
    t.push(
        pick(standard, "Operating profit", "Operating income"),
        LineKind::Subtotal,
        is.iter().map(|s| s.ebit),
    );
    t.push(
        pick(standard, "Finance costs", "Interest expense"),
        LineKind::Detail,
        is.iter().map(|s| s.interest_expense),
    );
    t.push(
        pick(standard, "Profit before tax", "Income before income taxes"),
        LineKind::Subtotal,
        is.iter().map(|s| s.pre_tax_income),
    );
    t.push(
        pick(standard, "Income tax expense", "Provision for income taxes"),
        LineKind::Detail,
        is.iter().map(|s| s.tax),
    );
    t.push(
        pick(standard, "Profit for the period", "Net income"),
        LineKind::Total,
        is.iter().map(|s| s.net_income),
    );
    t.push_ratio("Net margin", is.iter().map(|s| s.net_margin));
    t
}

/// Balance sheet with an opening column ahead of the projected periods.
/// IFRS presents non-current assets first and equity before liabilities.
pub fn balance_sheet_table(bundle: &OutputBundle, standard: AccountingStandard) -> StatementTable {
    let mut columns = vec![OPENING_COLUMN.to_string()];
    columns.extend(period_columns(bundle));

    let ob = &bundle.opening_balance;
    let bs = &bundle.balance_sheet;
    let series = |opening: Money, f: fn(&BalanceSheet) -> Money| {
        std::iter::once(opening).chain(bs.iter().map(f)).collect::<Vec<_>>()
    };

    let cash = series(ob.cash, |b| b.cash);
    let receivables = series(ob.accounts_receivable, |b| b.accounts_receivable);
    let inventory = series(ob.inventory, |b| b.inventory);
    let current_assets = series(
        ob.cash + ob.accounts_receivable + ob.inventory,
        |b| b.total_current_assets,
    );
    let ppe_gross = series(ob.ppe_gross, |b| b.ppe_gross);
    let accumulated = series(ob.accumulated_depreciation, |b| b.accumulated_depreciation);
    let ppe_net = series(ob.ppe_net, |b| b.ppe_net);
    let total_assets = series(ob.total_assets, |b| b.total_assets);
    let debt = series(ob.debt, |b| b.debt);
    let payables = series(ob.accounts_payable, |b| b.accounts_payable);
    let total_liabilities = series(ob.total_liabilities, |b| b.total_liabilities);
    let capital = series(ob.equity, |b| b.contributed_capital);
    let retained = series(Money::ZERO, |b| b.retained_earnings);
    let total_equity = series(ob.total_equity, |b| b.total_equity);
    let total_le = series(ob.total_liabilities_and_equity, |b| b.total_liabilities_and_equity);

    match standard {
        AccountingStandard::Ifrs => {
            let mut t = StatementTable::new("Statement of financial position", columns);
            t.push("Property, plant and equipment, cost", LineKind::Detail, ppe_gross);
            t.push("Accumulated depreciation", LineKind::Detail, accumulated);
            t.push("Property, plant and equipment", LineKind::Subtotal, ppe_net);
            t.push("Inventories", LineKind::Detail, inventory);
            t.push("Trade receivables", LineKind::Detail, receivables);
            t.push("Cash and cash equivalents", LineKind::Detail, cash);
            t.push("Total current assets", LineKind::Subtotal, current_assets);
            t.push("Total assets", LineKind::Total, total_assets);
            t.push("Share capital", LineKind::Detail, capital);
            t.push("Retained earnings", LineKind::Detail, retained);
            t.push("Total equity", LineKind::Subtotal, total_equity);
            t.push("Borrowings", LineKind::Detail, debt);
            t.push("Trade payables", LineKind::Detail, payables);
            t.push("Total liabilities", LineKind::Subtotal, total_liabilities);
            t.push("Total equity and liabilities", LineKind::Total, total_le);
            t
        }
        AccountingStandard::UsGaap => {
            let mut t = StatementTable::new("Balance sheet", columns);
            t.push("Cash and cash equivalents", LineKind::Detail, cash);
            t.push("Accounts receivable", LineKind::Detail, receivables);
            t.push("Inventory", LineKind::Detail, inventory);
            t.push("Total current assets", LineKind::Subtotal, current_assets);
            t.push("PP&E, gross", LineKind::Detail, ppe_gross);
            t.push("Accumulated depreciation", LineKind::Detail, accumulated);
            t.push("PP&E, net", LineKind::Subtotal, ppe_net);
            t.push("Total assets", LineKind::Total, total_assets);
            t.push("Accounts payable", LineKind::Detail, payables);
            t.push("Debt", LineKind::Detail, debt);
            t.push("Total liabilities", LineKind::Subtotal, total_liabilities);
            t.push("Paid-in capital", LineKind::Detail, capital);
            t.push("Retained earnings", LineKind::Detail, retained);
            t.push("Total stockholders' equity", LineKind::Subtotal, total_equity);
            t.push(
                "Total liabilities and stockholders' equity",
                LineKind::Total,
                total_le,
            );
            t
        }
    }
}

/// Cash flow statement with outflows shown negative.
pub fn cash_flow_table(bundle: &OutputBundle, standard: AccountingStandard) -> StatementTable {
    let title = pick(standard, "Statement of cash flows", "Cash flow statement");
    let mut t = StatementTable::new(title, period_columns(bundle));
    let cf = &bundle.cash_flow_statement;

    t.push(
        pick(standard, "Profit for the period", "Net income"),
        LineKind::Detail,
        cf.iter().map(|c| c.net_income),
    );
    t.push("Depreciation", LineKind::Detail, cf.iter().map(|c| c.depreciation));
    t.push(
        pick(standard, "(Increase) in trade receivables", "Change in accounts receivable"),
        LineKind::Detail,
        cf.iter().map(|c| -c.change_in_receivables),
    );
    t.push(
        pick(standard, "(Increase) in inventories", "Change in inventory"),
        LineKind::Detail,
        cf.iter().map(|c| -c.change_in_inventory),
    );
    t.push(
        pick(standard, "Increase in trade payables", "Change in accounts payable"),
        LineKind::Detail,
        cf.iter().map(|c| c.change_in_payables),
    );
    t.push(
        pick(
            standard,
            "Net cash from operating activities",
            "Net cash provided by operating activities",
        ),
        LineKind::Subtotal,
        cf.iter().map(|c| c.cash_from_operations),
    );
    t.push(
        pick(
            standard,
            "Purchase of property, plant and equipment",
            "Capital expenditures",
        ),
        LineKind::Detail,
        cf.iter().map(|c| -c.capex),
    );
    t.push(
        pick(
            standard,
            "Net cash used in investing activities",
            "Net cash used in investing activities",
        ),
        LineKind::Subtotal,
        cf.iter().map(|c| c.cash_from_investing),
    );
    t.push(
        pick(standard, "Proceeds from borrowings", "Proceeds from debt"),
        LineKind::Detail,
        cf.iter().map(|c| c.debt_drawdowns),
    );
    t.push(
        pick(standard, "Repayment of borrowings", "Repayments of debt"),
        LineKind::Detail,
        cf.iter().map(|c| -c.principal_repayments),
    );
    t.push(
        pick(standard, "Proceeds from issue of shares", "Proceeds from issuance of stock"),
        LineKind::Detail,
        cf.iter().map(|c| c.equity_raised),
    );
    t.push(
        pick(
            standard,
            "Net cash from financing activities",
            "Net cash provided by financing activities",
        ),
        LineKind::Subtotal,
        cf.iter().map(|c| c.cash_from_financing),
    );
    t.push(
        "Net change in cash",
        LineKind::Subtotal,
        cf.iter().map(|c| c.net_change_in_cash),
    );
    t.push("Opening cash", LineKind::Detail, cf.iter().map(|c| c.opening_cash));
    t.push("Closing cash", LineKind::Total, cf.iter().map(|c| c.ending_cash));
    t
}

fn depreciation_table(bundle: &OutputBundle) -> StatementTable {
    let mut t = StatementTable::new("Depreciation schedule", period_columns(bundle));
    let rows = &bundle.depreciation_schedule.rows;
    t.push("Opening cost", LineKind::Detail, rows.iter().map(|r| r.opening_gross));
    t.push("Additions", LineKind::Detail, rows.iter().map(|r| r.additions));
    t.push("Closing cost", LineKind::Subtotal, rows.iter().map(|r| r.closing_gross));
    t.push(
        "Opening accumulated depreciation",
        LineKind::Detail,
        rows.iter().map(|r| r.opening_accumulated),
    );
    t.push("Depreciation charge", LineKind::Detail, rows.iter().map(|r| r.depreciation));
    t.push(
        "Closing accumulated depreciation",
        LineKind::Subtotal,
        rows.iter().map(|r| r.closing_accumulated),
    );
    t.push("Net book value", LineKind::Total, rows.iter().map(|r| r.net_book_value));
    t
}

fn debt_table(bundle: &OutputBundle) -> StatementTable {
    let mut t = StatementTable::new("Debt schedule", period_columns(bundle));
    let totals = &bundle.debt_schedule.totals;
    t.push("Opening balance", LineKind::Detail, totals.iter().map(|r| r.opening_balance));
    t.push("Drawdowns", LineKind::Detail, totals.iter().map(|r| r.drawdowns));
    t.push("Interest", LineKind::Detail, totals.iter().map(|r| r.interest));
    t.push("Principal repaid", LineKind::Detail, totals.iter().map(|r| r.principal));
    t.push("Closing balance", LineKind::Total, totals.iter().map(|r| r.closing_balance));
    t.push(
        "Due within twelve months",
        LineKind::Detail,
        totals.iter().map(|r| r.current_portion),
    );
    for facility in &bundle.debt_schedule.facilities {
        t.push(
            &format!("{} closing balance", facility.label),
            LineKind::Detail,
            facility.rows.iter().map(|r| r.closing_balance),
        );
    }
    t
}

fn equity_table(bundle: &OutputBundle) -> StatementTable {
    let mut t = StatementTable::new("Equity schedule", period_columns(bundle));
    let rows = &bundle.equity_schedule.rows;
    t.push("Opening capital", LineKind::Detail, rows.iter().map(|r| r.opening_capital));
    t.push("Equity raised", LineKind::Detail, rows.iter().map(|r| r.raised));
    t.push("Closing capital", LineKind::Total, rows.iter().map(|r| r.closing_capital));
    t
}

fn working_capital_table(bundle: &OutputBundle) -> StatementTable {
    let mut t = StatementTable::new("Working capital schedule", period_columns(bundle));
    let rows = &bundle.working_capital_schedule.rows;
    t.push("Receivables", LineKind::Detail, rows.iter().map(|r| r.accounts_receivable));
    t.push("Inventory", LineKind::Detail, rows.iter().map(|r| r.inventory));
    t.push("Payables", LineKind::Detail, rows.iter().map(|r| r.accounts_payable));
    t.push(
        "Net working capital",
        LineKind::Subtotal,
        rows.iter().map(|r| r.net_working_capital),
    );
    t.push("Cash impact", LineKind::Total, rows.iter().map(|r| r.cash_impact));
    t
}

fn tax_table(bundle: &OutputBundle) -> StatementTable {
    let mut t = StatementTable::new("Tax schedule", period_columns(bundle));
    let rows = &bundle.tax_schedule.rows;
    t.push("Pre-tax income", LineKind::Detail, rows.iter().map(|r| r.pre_tax_income));
    t.push("Losses added", LineKind::Detail, rows.iter().map(|r| r.loss_added));
    t.push("Losses utilised", LineKind::Detail, rows.iter().map(|r| r.loss_utilised));
    t.push("Losses expired", LineKind::Detail, rows.iter().map(|r| r.loss_expired));
    t.push("Loss pool", LineKind::Subtotal, rows.iter().map(|r| r.loss_pool));
    t.push("Taxable income", LineKind::Subtotal, rows.iter().map(|r| r.taxable_income));
    t.push("Tax expense", LineKind::Total, rows.iter().map(|r| r.tax_expense));
    t
}

fn ratios_table(bundle: &OutputBundle) -> StatementTable {
    let mut t = StatementTable::new("Liquidity ratios", period_columns(bundle));
    let rows = &bundle.liquidity_ratios;
    t.push(
        "Current liabilities",
        LineKind::Detail,
        rows.iter().map(|r| r.current_liabilities),
    );
    t.push("Working capital", LineKind::Detail, rows.iter().map(|r| r.working_capital));
    t.push("Net debt", LineKind::Detail, rows.iter().map(|r| r.net_debt));
    t.push_ratio("Current ratio", rows.iter().map(|r| r.current_ratio));
    t.push_ratio("Quick ratio", rows.iter().map(|r| r.quick_ratio));
    t.push_ratio("Cash ratio", rows.iter().map(|r| r.cash_ratio));
    t.push_ratio("Debt to equity", rows.iter().map(|r| r.debt_to_equity));
    t.push_ratio("Interest coverage", rows.iter().map(|r| r.interest_coverage));
    t
}
