use serde_json::Value;

/// Fields that answer each command, in order of preference.
const PRIORITY_KEYS: [&str; 5] = [
    "status",
    "monthly_installment",
    "remaining_balance",
    "borrower_name",
    "amount",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result_obj {
        Value::Object(map) => {
            for key in PRIORITY_KEYS {
                if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, format_minimal(val));
                return;
            }
        }
        // Listings: one line per loan or payment
        Value::Array(items) => {
            for item in items {
                println!("{}", summarise_row(item));
            }
            return;
        }
        _ => {}
    }

    println!("{}", format_minimal(result_obj));
}

fn summarise_row(item: &Value) -> String {
    let id = item.get("id").map(format_minimal).unwrap_or_default();
    match (item.get("borrower_name"), item.get("status")) {
        (Some(name), Some(status)) => {
            format!("{}\t{}\t{}", id, format_minimal(name), format_minimal(status))
        }
        _ => {
            let amount = item.get("amount").map(format_minimal).unwrap_or_default();
            let date = item
                .get("payment_date")
                .map(format_minimal)
                .unwrap_or_default();
            format!("{}\t{}\t{}", id, date, amount)
        }
    }
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
