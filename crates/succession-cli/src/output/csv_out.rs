use serde_json::Value;
use std::io;

/// Write the per-heir breakdown (or any object) as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            if let Some(Value::Array(heirs)) = map.get("heirs_breakdown") {
                write_heirs_csv(&mut wtr, heirs);
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                }
            }
        }
        Value::Array(arr) => {
            for item in arr {
                let _ = wtr.write_record([&format_csv_value(item)]);
            }
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_heirs_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, heirs: &[Value]) {
    let headers = [
        "id",
        "name",
        "legal_share_percent",
        "gross_share_value",
        "taxable_base",
        "abatement_used",
        "tax_amount",
        "net_share_value",
    ];
    let _ = wtr.write_record(headers);
    for heir in heirs {
        if let Value::Object(map) = heir {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
