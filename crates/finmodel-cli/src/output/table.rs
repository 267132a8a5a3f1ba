use colored::Colorize;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{format_value, statement_tables};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    if let Some(tables) = statement_tables(value) {
        for t in &tables {
            println!("{}", t.title.bold());
            let mut builder = Builder::default();
            builder.push_record(std::iter::once(String::new()).chain(t.columns.iter().cloned()));
            for row in t.display_rows() {
                builder.push_record(row);
            }
            println!("{}\n", Table::from(builder));
        }
        print_warnings(value.as_object());
        return;
    }

    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => {
                print_object(result);
                print_warnings(Some(map));
                if let Some(Value::String(meth)) = map.get("methodology") {
                    println!("\nMethodology: {}", meth);
                }
            }
            _ => print_object(map),
        },
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

/// Scalars as a Field/Value table, then each array of records as its own
/// table.
fn print_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut nested = Vec::new();
    for (key, val) in map {
        match val {
            Value::Array(arr) if arr.iter().any(Value::is_object) => nested.push((key, arr)),
            _ => builder.push_record([key.as_str(), &format_value(val)]),
        }
    }
    println!("{}", Table::from(builder));

    for (key, arr) in nested {
        println!("\n{}", key.bold());
        print_array_table(arr);
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn print_warnings(envelope: Option<&Map<String, Value>>) {
    if let Some(Value::Array(warnings)) = envelope.and_then(|m| m.get("warnings")) {
        if !warnings.is_empty() {
            println!("\n{}", "Warnings:".yellow());
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }
}
