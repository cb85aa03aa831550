use chrono::{DateTime, Local, Utc};

/// `1234567` as `1,234,567`; missing values as `-`.
pub fn format_count(value: Option<u64>) -> String {
    let Some(value) = value else {
        return "-".to_string();
    };

    let digits = value.to_string();
    let mut output = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            output.push(',');
        }
        output.push(digit);
    }
    output
}

/// Local wall-clock time of a millisecond timestamp. Zero means unknown.
pub fn format_time(ts_ms: u64) -> String {
    if ts_ms == 0 {
        return String::new();
    }

    i64::try_from(ts_ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|time| time.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_default()
}
