use clap::{Args, ValueEnum};
use serde_json::{json, Value};

use finmodel_core::statements::StatementTable;
use finmodel_core::{calculate, calculate_with_envelope, with_metadata, Assumptions};

use crate::input;

/// Arguments shared by every model command
#[derive(Args)]
pub struct ModelArgs {
    /// Path to an assumptions file (.json, .yaml or .yml); JSON on stdin otherwise
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the tables command
#[derive(Args)]
pub struct TablesArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Print a single statement or schedule instead of all of them
    #[arg(long)]
    pub statement: Option<StatementKind>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatementKind {
    Income,
    Balance,
    CashFlow,
    Depreciation,
    Debt,
    Equity,
    WorkingCapital,
    Tax,
    Ratios,
}

impl StatementKind {
    /// Position in `OutputBundle::tables()`
    fn position(self) -> usize {
        match self {
            StatementKind::Income => 0,
            StatementKind::Balance => 1,
            StatementKind::CashFlow => 2,
            StatementKind::Depreciation => 3,
            StatementKind::Debt => 4,
            StatementKind::Equity => 5,
            StatementKind::WorkingCapital => 6,
            StatementKind::Tax => 7,
            StatementKind::Ratios => 8,
        }
    }
}

fn load_assumptions(args: &ModelArgs) -> Result<Assumptions, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        input::file::read_assumptions(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        Err("--input <assumptions.json|yaml> or stdin required".into())
    }
}

pub fn run_calculate(args: ModelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let assumptions = load_assumptions(&args)?;
    let result = calculate_with_envelope(&assumptions)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_validate(args: ModelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let assumptions = load_assumptions(&args)?;
    let bundle = calculate(&assumptions)?;
    let result = with_metadata(
        "Balance sheet identity, cash reconciliation and schedule continuity checks",
        &assumptions,
        bundle.warnings,
        bundle.validation,
    );
    Ok(serde_json::to_value(result)?)
}

pub fn run_tables(args: TablesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let assumptions = load_assumptions(&args.model)?;
    let bundle = calculate(&assumptions)?;

    let mut tables = bundle.tables();
    if let Some(kind) = args.statement {
        let position = kind.position();
        if position >= tables.len() {
            return Err(format!("No table for {kind:?}").into());
        }
        let selected: StatementTable = tables.swap_remove(position);
        tables = vec![selected];
    }

    Ok(json!({
        "company": bundle.company.name,
        "currency": bundle.company.currency.code(),
        "is_balanced": bundle.validation.is_balanced,
        "tables": tables,
        "warnings": bundle.warnings,
    }))
}
