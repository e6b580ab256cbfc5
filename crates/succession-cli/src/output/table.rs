use serde_json::Value;
use tabled::{builder::Builder, Table};

/// Format a simulation (or any object) as tables.
pub fn print_table(value: &Value) {
    let Some(map) = value.as_object() else {
        println!("{}", value);
        return;
    };

    // A succession output leads with its headline metrics and per-heir rows.
    if let Some(Value::Object(metrics)) = map.get("global_metrics") {
        let mut builder = Builder::default();
        builder.push_record(["Metric", "Value"]);
        for key in [
            "total_estate_value",
            "legal_reserve_value",
            "disposable_quota_value",
            "total_tax_amount",
        ] {
            if let Some(v) = metrics.get(key) {
                builder.push_record([key, &format_value(v)]);
            }
        }
        println!("{}", Table::from(builder));

        if let Some(Value::Array(heirs)) = map.get("heirs_breakdown") {
            println!();
            print_heirs_table(heirs);
        }

        if let Some(Value::Array(warnings)) = map.get("warnings") {
            if !warnings.is_empty() {
                println!("\nWarnings:");
                for w in warnings {
                    let severity = w
                        .get("severity")
                        .and_then(Value::as_str)
                        .unwrap_or("INFO");
                    let message = w.get("message").and_then(Value::as_str).unwrap_or("");
                    println!("  [{}] {}", severity, message);
                }
            }
        }
        return;
    }

    print_flat_object(map);
}

fn print_heirs_table(heirs: &[Value]) {
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
    let mut builder = Builder::default();
    builder.push_record(headers);
    for heir in heirs {
        if let Value::Object(map) = heir {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_value).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    println!("{}", Table::from(builder));
}

fn print_flat_object(map: &serde_json::Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
