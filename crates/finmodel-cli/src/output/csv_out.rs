use serde_json::Value;
use std::io;

use super::{format_value, statement_tables};

type StdoutWriter<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout. Statement tables are written one after
/// another, each with its own header row, so the writer is flexible about
/// record length.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(stdout.lock());

    if let Some(tables) = statement_tables(value) {
        for t in &tables {
            let header: Vec<&str> = std::iter::once(t.title.as_str())
                .chain(t.columns.iter().map(String::as_str))
                .collect();
            let _ = wtr.write_record(&header);
            for row in t.display_rows() {
                let _ = wtr.write_record(&row);
            }
        }
        let _ = wtr.flush();
        return;
    }

    match value {
        Value::Object(map) => {
            if let Some(Value::Object(result)) = map.get("result") {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in result {
                    match val {
                        Value::Array(arr) if arr.iter().any(Value::is_object) => {
                            write_array_csv(&mut wtr, arr)
                        }
                        _ => {
                            let _ = wtr.write_record([key.as_str(), &format_value(val)]);
                        }
                    }
                }
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &format_value(val)]);
                }
            }
        }
        Value::Array(arr) => write_array_csv(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([&format_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_array_csv(wtr: &mut StdoutWriter<'_>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([&format_value(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);

    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}
