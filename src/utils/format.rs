//! Label formatting for the chart axes, the price badge and log lines

use chrono::{DateTime, Utc};

/// Insert thousands separators into the integer part of an already formatted number
fn group_thousands(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let grouped = integer
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(",");

    match fraction {
        Some(fraction) => format!("{}{}.{}", sign, grouped, fraction),
        None => format!("{}{}", sign, grouped),
    }
}

/// Full currency label, e.g. `$48,123.45`
pub fn format_price_full(price: f64) -> String {
    let formatted = group_thousands(&format!("{:.2}", price.abs()));
    if price < 0.0 {
        format!("-${}", formatted)
    } else {
        format!("${}", formatted)
    }
}

/// Abbreviated label for narrow axes, e.g. `48.1k`
pub fn format_price_abbrev(price: f64) -> String {
    if price.abs() >= 1000.0 {
        format!("{:.1}k", price / 1000.0)
    } else {
        format!("{:.1}", price)
    }
}

/// Axis label for a price, abbreviated or full depending on the layout
pub fn format_price_label(price: f64, abbreviate: bool) -> String {
    if abbreviate {
        format_price_abbrev(price)
    } else {
        format_price_full(price)
    }
}

/// Time axis label (`HH:MM:SS`, UTC)
pub fn format_time(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%H:%M:%S").to_string()
}

/// Signed percent change, e.g. `+0.012%`
pub fn format_percent(change: f64) -> String {
    if change >= 0.0 {
        format!("+{:.3}%", change)
    } else {
        format!("{:.3}%", change)
    }
}
