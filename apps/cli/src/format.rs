//! Number formatting shared by tables and chat replies.

/// Whole dollars with thousands separators, e.g. `$12,345`.
pub fn dollars(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0.0 { format!("-${}", grouped) } else { format!("${}", grouped) }
}

pub fn percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Formats a ratio in [0, 1] as a percentage.
pub fn ratio(value: f64) -> String {
    percent(value * 100.0)
}
