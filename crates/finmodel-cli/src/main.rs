mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::model::{ModelArgs, TablesArgs};

/// Integrated three-statement financial projections
#[derive(Parser)]
#[command(
    name = "finmodel",
    version,
    about = "Integrated three-statement financial projections",
    long_about = "Builds a multi-period income statement, balance sheet and cash flow \
                  statement from an assumptions snapshot (JSON or YAML), with debt, \
                  depreciation, equity, working-capital and tax schedules, and checks \
                  that the balance sheet balances in every period."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log engine progress to stderr (overrides FINMODEL_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full projection and print the output bundle
    Calculate(ModelArgs),
    /// Run a projection and print only the balance sheet validation report
    Validate(ModelArgs),
    /// Print statements and schedules as line-item tables
    Tables(TablesArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let tabular = matches!(cli.output, OutputFormat::Table | OutputFormat::Csv);
    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Calculate(args) if tabular => commands::model::run_tables(TablesArgs {
            model: args,
            statement: None,
        }),
        Commands::Calculate(args) => commands::model::run_calculate(args),
        Commands::Validate(args) => commands::model::run_validate(args),
        Commands::Tables(args) => commands::model::run_tables(args),
        Commands::Version => {
            println!("finmodel {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
