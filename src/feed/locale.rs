// src/feed/locale.rs
//! Turkish-locale numbers: `.` groups thousands, `,` is the decimal point.
//!
//! The feed ships every value as text (`"2.150,50"`, `"+0,60%"`). Parsing never
//! fails: anything unreadable becomes `0.0`, so one bad field degrades a single
//! cell instead of the whole table.

use once_cell::sync::OnceCell;
use regex::Regex;

/// Parse a Turkish-formatted number. `None`, empty and garbage input yield `0.0`.
///
/// A trailing `%` is dropped and the magnitude kept as-is (`"1,25%"` -> `1.25`).
pub fn parse_turkish_number(value: Option<&str>) -> f64 {
    let Some(raw) = value else {
        return 0.0;
    };
    if raw.is_empty() {
        return 0.0;
    }

    // 1) keep digits, separators and signs
    static RE_JUNK: OnceCell<Regex> = OnceCell::new();
    let re_junk = RE_JUNK.get_or_init(|| Regex::new(r"[^0-9,.+\-]").unwrap());
    let cleaned = re_junk.replace_all(raw, "");

    // 2) drop grouping dots, first comma becomes the decimal point
    let normalized = cleaned.replace('.', "").replacen(',', ".", 1);

    // 3) longest float prefix, like a lenient float reader
    match float_prefix(&normalized).and_then(|p| p.parse::<f64>().ok()) {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Returns the longest prefix shaped `[+-]?digits(.digits)?`, or `None`
/// when no digit is present.
fn float_prefix(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > frac_start {
            digits += j - frac_start;
            i = j;
        } else if digits > 0 {
            // "12." reads as 12
            i += 1;
        }
    }

    if digits == 0 {
        None
    } else {
        Some(&s[..i])
    }
}

/// Render `value` with tr-TR grouping: `1234.5` with 2 decimals -> `"1.234,50"`.
pub fn format_turkish_number(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    // "-0,00" reads badly; only keep the sign for visible magnitudes
    if value.is_sign_negative() && fixed.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(f) = frac_part {
        out.push(',');
        out.push_str(f);
    }
    out
}

/// Lira amount with two decimals: `2150.5` -> `"₺2.150,50"`.
pub fn format_try(value: f64) -> String {
    format!("₺{}", format_turkish_number(value, 2))
}
