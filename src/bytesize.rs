//! Convert between byte counts and human-readable sizes
//!
//! All units are binary: `1kB` is 1024 bytes, `1MB` is 1024² bytes, up to
//! `1YB` which is 1024⁸ bytes. Unit names are matched case-insensitively, so
//! `kB`, `KB` and `kb` all mean the same thing.
//!
//! Output from `bytes_to_human_size` can always be parsed again by
//! `human_size_to_bytes`, give or take the rounding of the mantissa.

use std::borrow::Cow;
use std::fmt;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

/// Unit labels, indexed by their power of 1024
pub const UNITS: [&str; 9] = ["B", "kB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

lazy_static! {
    /// A number immediately followed by a unit, anywhere in a string
    static ref EMBEDDED_SIZE: Regex =
        Regex::new(r"(-?(?:\d+(?:\.\d*)?|\.\d+))\s*([kKmMgGtTpPeEzZyY]?[bB])\b").unwrap();
    /// A whole string that is one size, with or without a unit
    static ref WHOLE_SIZE: Regex =
        Regex::new(r"^\s*((?:\d+(?:\.\d*)?|\.\d+))\s*([kKmMgGtTpPeEzZyY]?[bB])?\s*$").unwrap();
}

#[derive(Debug, PartialEq, Eq)]
pub enum ByteSizeError {
    /// The input didn't look like `<number>[unit]`
    Syntax(String),
    /// The input is bigger than `u64::MAX` bytes
    Overflow(String),
}

impl fmt::Display for ByteSizeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ByteSizeError::Syntax(ref s) => write!(f, "'{}' is not a size like '1.5GB'", s),
            ByteSizeError::Overflow(ref s) => write!(f, "'{}' is too many bytes", s),
        }
    }
}

/// The power of 1024 that a unit stands for
///
/// `unit` must be a unit matched by one of the size regexes.
fn exponent(unit: &str) -> i32 {
    match unit.chars().next().map(|c| c.to_ascii_uppercase()) {
        Some('K') => 1,
        Some('M') => 2,
        Some('G') => 3,
        Some('T') => 4,
        Some('P') => 5,
        Some('E') => 6,
        Some('Z') => 7,
        Some('Y') => 8,
        _ => 0,
    }
}

fn scale(number: &str, unit: &str) -> Option<f64> {
    number
        .parse::<f64>()
        .ok()
        .map(|n| n * 1024f64.powi(exponent(unit)))
}

/// Render a byte count with the unit that keeps the mantissa short
///
/// The unit is picked from the number of decimal digits in `bytes`: up to
/// three digits are bytes, four to six are kilobytes, and so on. This means
/// that `1000` renders as `0.98 kB`, which looks odd but keeps the choice of
/// unit stable as a value grows.
pub fn bytes_to_human_size(bytes: u64, decimals: usize) -> String {
    let digits = bytes.to_string().len();
    let factor = ((digits - 1) / 3).min(UNITS.len() - 1);
    format!(
        "{:.*} {}",
        decimals,
        bytes as f64 / 1024f64.powi(factor as i32),
        UNITS[factor]
    )
}

/// Parse a single size like `1.5GB`, `5.00 GB` or `1024` into bytes
///
/// The inverse of `bytes_to_human_size`: its output parses back to the
/// original count within the rounding of the mantissa. Thresholds go through
/// `resolve_byte_units` instead, which handles sizes embedded in a range.
/// A bare number is already a byte count. Fractional bytes are rounded.
pub fn human_size_to_bytes(s: &str) -> Result<u64, ByteSizeError> {
    let caps = WHOLE_SIZE
        .captures(s)
        .ok_or_else(|| ByteSizeError::Syntax(s.to_owned()))?;
    let unit = caps.get(2).map_or("B", |m| m.as_str());
    let bytes = scale(&caps[1], unit).ok_or_else(|| ByteSizeError::Syntax(s.to_owned()))?;
    if bytes.round() > u64::MAX as f64 {
        return Err(ByteSizeError::Overflow(s.to_owned()));
    }
    Ok(bytes.round() as u64)
}

/// Replace every `<number><unit>` in `expr` with the byte count it stands for
///
/// This is how thresholds like `100MB:500MB` become `104857600:524288000`
/// before they are parsed as ranges. Substitution repeats until no sizes are
/// left; each pass removes at least one unit, so it always terminates. If
/// nothing in `expr` has a unit it is returned unchanged, and the caller
/// should treat it as plain numbers.
pub fn resolve_byte_units(expr: &str) -> Cow<str> {
    let mut resolved = Cow::Borrowed(expr);
    while EMBEDDED_SIZE.is_match(&resolved) {
        let next = EMBEDDED_SIZE
            .replace_all(&resolved, |caps: &Captures| {
                match scale(&caps[1], &caps[2]) {
                    Some(bytes) => format!("{}", bytes.round()),
                    // the regex only matches parseable numbers
                    None => caps[1].to_owned(),
                }
            })
            .into_owned();
        resolved = Cow::Owned(next);
    }
    resolved
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn formats_with_the_digit_count_unit() {
        let reprs = [
            (0, "0.00 B"),
            (999, "999.00 B"),
            (1000, "0.98 kB"),
            (1024, "1.00 kB"),
            (1_572_864, "1.50 MB"),
            (5_368_709_120, "5.00 GB"),
            (1_099_511_627_776, "1.00 TB"),
        ];
        for &(raw, repr) in reprs.iter() {
            assert_eq!(bytes_to_human_size(raw, 2), repr);
        }
    }

    #[test]
    fn zero_bytes_is_in_bytes() {
        assert_eq!(bytes_to_human_size(0, 0), "0 B");
    }

    #[test]
    fn largest_values_stay_in_the_unit_table() {
        assert_eq!(bytes_to_human_size(u64::MAX, 2), "16.00 EB");
    }

    #[test]
    fn parses_sizes() {
        assert_eq!(human_size_to_bytes("1024"), Ok(1024));
        assert_eq!(human_size_to_bytes("1.5GB"), Ok(1_610_612_736));
        assert_eq!(human_size_to_bytes("5.00 GB"), Ok(5_368_709_120));
        assert_eq!(human_size_to_bytes("10kB"), human_size_to_bytes("10KB"));
        assert_eq!(human_size_to_bytes(" 2 mb "), Ok(2_097_152));
        assert_eq!(human_size_to_bytes("12B"), Ok(12));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            human_size_to_bytes("lots"),
            Err(ByteSizeError::Syntax("lots".into()))
        );
        assert!(human_size_to_bytes("-5MB").is_err());
        assert_eq!(
            human_size_to_bytes("20EB"),
            Err(ByteSizeError::Overflow("20EB".into()))
        );
    }

    #[test]
    fn human_sizes_parse_back_to_roughly_the_same_bytes() {
        let samples = [
            0u64,
            1,
            999,
            1000,
            1023,
            4096,
            123_456,
            987_654_321,
            5_368_709_120,
            77_777_777_777_777,
            u64::MAX / 3,
        ];
        for &bytes in samples.iter() {
            let human = bytes_to_human_size(bytes, 2);
            let digits = bytes.to_string().len();
            let factor = ((digits - 1) / 3) as i32;
            // two decimals of the chosen unit
            let tolerance = 0.005 * 1024f64.powi(factor);
            let parsed = human_size_to_bytes(&human).unwrap();
            let diff = (parsed as f64 - bytes as f64).abs();
            assert!(
                diff <= tolerance,
                "{} -> {} -> {} (off by {})",
                bytes,
                human,
                parsed,
                diff
            );
        }
    }

    #[test]
    fn resolves_units_inside_expressions() {
        assert_eq!(resolve_byte_units("100MB:500MB"), "104857600:524288000");
        assert_eq!(resolve_byte_units("@1kB:2KB"), "@1024:2048");
        assert_eq!(resolve_byte_units("~:1.5GB"), "~:1610612736");
        assert_eq!(resolve_byte_units("10GB:"), "10737418240:");
        assert_eq!(resolve_byte_units("-1kB"), "-1024");
    }

    #[test]
    fn expressions_without_units_are_untouched() {
        assert!(matches!(resolve_byte_units("10:20"), Cow::Borrowed("10:20")));
        assert_eq!(resolve_byte_units("~:5"), "~:5");
        assert_eq!(resolve_byte_units("5 bytes"), "5 bytes");
    }

    #[test]
    fn resolution_repeats_until_no_units_are_left() {
        // "1kB B" -> "1024 B" -> "1024"
        assert_eq!(resolve_byte_units("1kB B"), "1024");
        // a unit glued to more letters is not a unit
        assert_eq!(resolve_byte_units("1kBB"), "1kBB");
    }
}
