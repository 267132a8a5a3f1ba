pub mod assembler;
pub mod opening;
pub mod ratios;
pub mod table;
pub mod validator;

pub use assembler::{assemble_statements, BalanceSheet, CashFlowStatement, IncomeStatement};
pub use opening::{resolve_opening_balance, OpeningBalance};
pub use ratios::{compute_liquidity_ratios, LiquidityRatios};
pub use table::{LineItem, LineKind, StatementTable, BREAKDOWN_INDENT, UNDEFINED_CELL};
pub use validator::{
    validate, FindingKind, Severity, ValidationFinding, ValidationReport, BALANCE_TOLERANCE,
};
