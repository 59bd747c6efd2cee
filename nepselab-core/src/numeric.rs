//! Tolerant parsing and fixed-decimal rounding.

/// Parse a scraped percentage string such as `"-1.25 %"` into `-1.25`.
///
/// Strips `%` and all whitespace. Anything that still does not parse yields
/// `0.0`; malformed scraper output must never abort a batch.
pub fn parse_percentage(value: &str) -> f64 {
    let cleaned: String = value
        .chars()
        .filter(|c| *c != '%' && !c.is_whitespace())
        .collect();
    parse_leading_float(&cleaned).unwrap_or(0.0)
}

/// Parse the longest numeric prefix of `s` (`-12.5abc` → `-12.5`).
///
/// Mirrors the lenient prefix parse the scraper output was designed
/// against; returns `None` when no digits lead the string.
fn parse_leading_float(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'-' || bytes[end] == b'+') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut seen_digits = end > digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start || seen_digits {
            seen_digits |= frac_end > frac_start;
            end = frac_end;
        }
    }
    if !seen_digits {
        return None;
    }
    s[..end].trim_end_matches('.').parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Round to `decimals` places, ties toward positive infinity
/// (`-0.125` → `-0.12`, `0.125` → `0.13`).
///
/// Values too large to scale are returned unchanged; they already carry no
/// fractional digits and must never turn into an infinity.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    let nearest = scaled.round();
    // `f64::round` breaks ties away from zero; move negative ties up.
    let rounded = if scaled - nearest == 0.5 {
        nearest + 1.0
    } else {
        nearest
    };
    rounded / factor
}
