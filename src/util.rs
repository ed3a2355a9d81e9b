// Parsing and number formatting helpers.
//
// Spreadsheet exports are loose about numbers: blanks, thousands separators,
// stray spaces. Everything that turns a raw cell into an `f64` goes through
// here so the normalizer can treat the rest as clean.
use num_format::{Locale, ToFormattedString};

/// Parse a raw cell into `f64`.
///
/// - Trims whitespace; blank cells are `None`.
/// - Rejects values that contain alphabetic characters (`"sim"`, `"n/a"`).
/// - Accepts `","` only as an en-US thousands separator (`1,250.5`). A
///   decimal comma such as `"2,5"` is rejected rather than read as `25`.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    if s.contains(',') && !has_thousands_groups(s) {
        return None;
    }
    let s = s.replace(",", "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

// `1,234,567` style: every group after the first has exactly three digits.
fn has_thousands_groups(s: &str) -> bool {
    let (int_part, frac) = s.split_once('.').unwrap_or((s, ""));
    if frac.contains(',') {
        return false;
    }
    let mut groups = int_part.trim_start_matches(['-', '+']).split(',');
    let lead_ok = groups.next().is_some_and(|g| (1..=3).contains(&g.len()));
    lead_ok && groups.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()))
}

/// Render a spreadsheet float that is really a label (`21.0` -> `"21"`).
pub fn label_from_f64(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus `num-format` thousands separators, e.g. `1,234.50`.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// Counts are stored as `f64`; show them without decimals when they are whole.
pub fn format_count(n: f64) -> String {
    if n.fract() == 0.0 {
        format_number(n, 0)
    } else {
        format_number(n, 2)
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_loose_numbers() {
        assert_eq!(parse_f64_safe(Some(" 12 ")), Some(12.0));
        assert_eq!(parse_f64_safe(Some("1,250.5")), Some(1250.5));
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(Some("sim")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn decimal_comma_is_not_a_thousands_separator() {
        assert_eq!(parse_f64_safe(Some("2,5")), None);
        assert_eq!(parse_f64_safe(Some("12,50")), None);
        assert_eq!(parse_f64_safe(Some("3.5,0")), None);
        assert_eq!(parse_f64_safe(Some("1,234,567")), Some(1234567.0));
        assert_eq!(parse_f64_safe(Some("-1,000.25")), Some(-1000.25));
    }

    #[test]
    fn float_labels_drop_trailing_zero() {
        assert_eq!(label_from_f64(21.0), "21");
        assert_eq!(label_from_f64(2.5), "2.5");
    }

    #[test]
    fn formats_with_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-3.0, 1), "-3.0");
        assert_eq!(format_number(0.0, 1), "0.0");
        assert_eq!(format_count(1500.0), "1,500");
        assert_eq!(format_count(2.25), "2.25");
        assert_eq!(format_int(9855), "9,855");
    }
}
