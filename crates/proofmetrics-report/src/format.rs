/// Format a count with thousands separators: `1234567` → `1,234,567`.
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Fixed one-decimal rendering used for percentages, ratios and timings.
pub fn format_decimal(value: f64) -> String {
    format!("{value:.1}")
}

/// One decimal, or `placeholder` when the value is undefined.
pub fn format_optional(value: Option<f64>, placeholder: &str) -> String {
    match value {
        Some(v) => format_decimal(v),
        None => placeholder.to_string(),
    }
}
