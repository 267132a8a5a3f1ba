use serde_json::Value;

use super::format_value;

/// Print a one-line verdict: whether the model balances, with the finding
/// counts when it does not.
///
/// The validation report is looked for in the `result.validation`,
/// `result` and top-level positions, covering the calculate, validate and
/// tables commands.
pub fn print_minimal(value: &Value) {
    let result = value.get("result").unwrap_or(value);
    let report = result
        .get("validation")
        .or_else(|| result.get("is_balanced").map(|_| result))
        .or_else(|| value.get("is_balanced").map(|_| value));

    match report {
        Some(report) => {
            let balanced = report
                .get("is_balanced")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if balanced {
                println!("balanced");
            } else {
                let errors = report.get("error_count").map(format_value);
                match errors {
                    Some(count) => println!("unbalanced ({} errors)", count),
                    None => println!("unbalanced"),
                }
            }
        }
        None => println!("{}", format_value(result)),
    }
}
