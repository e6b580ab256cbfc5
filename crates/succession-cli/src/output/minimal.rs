use serde_json::Value;

/// Print just the key answer from the output.
///
/// For a simulation that is the total tax; otherwise fall back to the first
/// field of the object.
pub fn print_minimal(value: &Value) {
    if let Some(metrics) = value.get("global_metrics") {
        for key in ["total_tax_amount", "total_estate_value"] {
            if let Some(v) = metrics.get(key) {
                if !v.is_null() {
                    println!("{}", format_minimal(v));
                    return;
                }
            }
        }
    }

    if let Value::Object(map) = value {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(value));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
