// Utility helpers for cell coercion and number formatting.
//
// Worksheet cells arrive as raw strings. Everything that turns them into
// numbers or flags lives here so the rollup and summary code can treat a bad
// cell as zero without thinking about it.
use num_format::{Locale, ToFormattedString};

/// Parse a string-like cell into `f64`, forgiving the formatting noise that
/// spreadsheet exports carry.
///
/// - Trims whitespace.
/// - Accepts exponent notation such as `1e3`; `inf` and `NaN` are refused.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce a cell to a number: missing, empty or non-numeric cells become 0.
pub fn coerce_number(s: Option<&str>) -> f64 {
    parse_f64_safe(s).unwrap_or(0.0)
}

/// `1` when the cell reads "yes" (any case, surrounding whitespace ignored),
/// `0` for anything else including a missing cell.
pub fn parse_yes(s: Option<&str>) -> u8 {
    match s {
        Some(v) if v.trim().eq_ignore_ascii_case("yes") => 1,
        _ => 0,
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus `en` thousands separators, e.g. `1,234,567.89`.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Whole rupees for display. Paise are truncated here and nowhere else.
pub fn rupees(total: f64) -> i64 {
    total.trunc() as i64
}

pub fn format_rupees(total: f64) -> String {
    format!("Rs {}", format_int(rupees(total)))
}
