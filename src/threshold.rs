//! Warning and critical thresholds
//!
//! Thresholds are parsed once, when the check is configured, and can then be
//! evaluated against as many values as needed.

use std::borrow::Cow;
use std::fmt;

use log::debug;

use crate::bytesize::resolve_byte_units;
use crate::range::{parse_range, RangeParseError, RangeSpec};
use crate::Status;

/// How to read numbers in a threshold expression
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Units {
    /// Plain numbers only
    Plain,
    /// Numbers may carry byte units (`10GB:`), which are resolved first
    Bytes,
}

/// One threshold, as given on the command line
#[derive(Clone, Debug, PartialEq)]
pub enum Threshold {
    /// Nothing requested at this level
    Unset,
    /// A usable range
    Range { raw: String, range: RangeSpec },
    /// Something was given but it isn't a range. Never alerts.
    Invalid { raw: String, error: RangeParseError },
}

impl Threshold {
    pub fn parse(raw: &str, units: Units) -> Threshold {
        if raw.trim().is_empty() {
            return Threshold::Unset;
        }
        let expr = match units {
            Units::Bytes => resolve_byte_units(raw),
            Units::Plain => Cow::Borrowed(raw),
        };
        match parse_range(&expr) {
            Ok(range) => Threshold::Range {
                raw: raw.to_owned(),
                range,
            },
            Err(error) => Threshold::Invalid {
                raw: raw.to_owned(),
                error,
            },
        }
    }

    /// Whether `value` breaches this threshold
    pub fn alerts(&self, value: f64) -> bool {
        match *self {
            Threshold::Range { ref range, .. } => range.alerts(value),
            Threshold::Unset | Threshold::Invalid { .. } => false,
        }
    }

    /// The expression exactly as the user wrote it, empty if unset
    pub fn raw(&self) -> &str {
        match *self {
            Threshold::Unset => "",
            Threshold::Range { ref raw, .. } | Threshold::Invalid { ref raw, .. } => raw,
        }
    }

    pub fn is_set(&self) -> bool {
        *self != Threshold::Unset
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Threshold::Unset => write!(f, "unset"),
            Threshold::Range { ref raw, ref range } => write!(f, "{} ({})", raw, range),
            Threshold::Invalid { ref raw, ref error } => write!(f, "invalid '{}': {}", raw, error),
        }
    }
}

/// The warning and critical thresholds for one metric
#[derive(Clone, Debug, PartialEq)]
pub struct Thresholds {
    pub warning: Threshold,
    pub critical: Threshold,
}

impl Thresholds {
    pub fn new(warning: &str, critical: &str, units: Units) -> Thresholds {
        let thresholds = Thresholds {
            warning: Threshold::parse(warning, units),
            critical: Threshold::parse(critical, units),
        };
        debug!(
            "thresholds: warning {}, critical {}",
            thresholds.warning, thresholds.critical
        );
        thresholds
    }

    /// Thresholds that never alert
    pub fn unset() -> Thresholds {
        Thresholds {
            warning: Threshold::Unset,
            critical: Threshold::Unset,
        }
    }

    /// The status of `value`
    ///
    /// Critical is checked first and wins even if warning is breached too.
    pub fn evaluate(&self, value: f64) -> Status {
        if self.critical.alerts(value) {
            Status::Critical
        } else if self.warning.alerts(value) {
            Status::Warning
        } else {
            Status::Ok
        }
    }

    pub fn is_set(&self) -> bool {
        self.warning.is_set() || self.critical.is_set()
    }

    /// Descriptions of the thresholds that were given but couldn't be parsed
    pub fn invalid(&self) -> Vec<String> {
        [("warning", &self.warning), ("critical", &self.critical)]
            .iter()
            .filter_map(|&(level, threshold)| match *threshold {
                Threshold::Invalid { ref raw, ref error } => {
                    Some(format!("ignoring {} threshold '{}': {}", level, raw, error))
                }
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_thresholds_never_alert() {
        let t = Thresholds::new("", "  ", Units::Plain);
        assert_eq!(t, Thresholds::unset());
        assert!(!t.is_set());
        assert_eq!(t.evaluate(-1e9), Status::Ok);
        assert_eq!(t.evaluate(1e9), Status::Ok);
    }

    #[test]
    fn warning_only() {
        let t = Thresholds::new("~:100", "", Units::Plain);
        assert_eq!(t.evaluate(150.0), Status::Warning);
        assert_eq!(t.evaluate(100.0), Status::Ok);
    }

    #[test]
    fn critical_wins_over_warning() {
        let t = Thresholds::new("~:50", "~:100", Units::Plain);
        assert_eq!(t.evaluate(150.0), Status::Critical);
        assert_eq!(t.evaluate(75.0), Status::Warning);
        assert_eq!(t.evaluate(40.0), Status::Ok);
    }

    #[test]
    fn a_breached_critical_is_never_downgraded() {
        let t = Thresholds::new("~:100", "~:50", Units::Plain);
        assert_eq!(t.evaluate(75.0), Status::Critical);
        assert_eq!(t.evaluate(150.0), Status::Critical);
        assert_eq!(t.evaluate(40.0), Status::Ok);
    }

    #[test]
    fn critical_is_checked_even_when_warning_is_fine() {
        let t = Thresholds::new("@0:10", "20:", Units::Plain);
        assert_eq!(t.evaluate(15.0), Status::Critical);
    }

    #[test]
    fn byte_units_are_only_resolved_for_byte_metrics() {
        let bytes = Thresholds::new("10GB:", "", Units::Bytes);
        assert_eq!(bytes.evaluate(5_368_709_120.0), Status::Warning);
        assert_eq!(bytes.evaluate(10_737_418_240.0), Status::Ok);

        let plain = Thresholds::new("10GB:", "", Units::Plain);
        assert!(matches!(plain.warning, Threshold::Invalid { .. }));
        assert_eq!(plain.evaluate(5.0), Status::Ok);
    }

    #[test]
    fn raw_expressions_are_kept() {
        let t = Thresholds::new("10GB:", "bogus", Units::Bytes);
        assert_eq!(t.warning.raw(), "10GB:");
        assert_eq!(t.critical.raw(), "bogus");
        assert_eq!(Threshold::Unset.raw(), "");
    }

    #[test]
    fn invalid_thresholds_are_reported_and_ignored() {
        let t = Thresholds::new("20:10", "lots", Units::Plain);
        assert_eq!(t.evaluate(1e9), Status::Ok);
        assert_eq!(
            t.invalid(),
            vec![
                "ignoring warning threshold '20:10': \
                 '20:10' has a lower bound greater than its upper bound"
                    .to_owned(),
                "ignoring critical threshold 'lots': \
                 'lots' is not a range (expected one of x, x:, ~:x, x:y, @x:y)"
                    .to_owned(),
            ]
        );
    }
}
