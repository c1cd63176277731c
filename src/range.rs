//! Nagios range expressions
//!
//! A range describes the values that are *acceptable*; a value outside of it
//! should alert. The supported forms are:
//!
//! | expression | alert when                    |
//! |------------|-------------------------------|
//! | `x`        | value < 0 or value > x        |
//! | `x:`       | value < x                     |
//! | `~:x`      | value > x                     |
//! | `x:y`      | value < x or value > y        |
//! | `@x:y`     | x <= value <= y               |
//!
//! Bounds are signed decimals (`-1.5`, `10`, `.25`). Byte units have to be
//! resolved before parsing, see `bytesize::resolve_byte_units`.

use std::fmt;

use lazy_static::lazy_static;
use log::trace;
use regex::{Captures, Regex};

/// A parsed range expression
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RangeSpec {
    /// `x`: alert if the value is negative or greater than x
    AtMost(f64),
    /// `x:`: alert if the value is less than x
    Below(f64),
    /// `~:x`: alert if the value is greater than x
    Above(f64),
    /// `x:y`: alert if the value is less than x or greater than y
    Outside(f64, f64),
    /// `@x:y`: alert if the value is between x and y, inclusive
    Inside(f64, f64),
}

impl RangeSpec {
    /// Whether `value` is out of range, i.e. should alert
    pub fn alerts(&self, value: f64) -> bool {
        match *self {
            RangeSpec::AtMost(x) => value < 0.0 || value > x,
            RangeSpec::Below(x) => value < x,
            RangeSpec::Above(x) => value > x,
            RangeSpec::Outside(x, y) => value < x || value > y,
            RangeSpec::Inside(x, y) => x <= value && value <= y,
        }
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RangeSpec::AtMost(x) => write!(f, "{}", x),
            RangeSpec::Below(x) => write!(f, "{}:", x),
            RangeSpec::Above(x) => write!(f, "~:{}", x),
            RangeSpec::Outside(x, y) => write!(f, "{}:{}", x, y),
            RangeSpec::Inside(x, y) => write!(f, "@{}:{}", x, y),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RangeParseError {
    /// Nothing to parse
    Empty,
    /// The expression matches none of the range forms
    Syntax(String),
    /// A bound couldn't be read as a number
    InvalidNumber(String),
    /// `x:y` or `@x:y` where x > y
    Inverted(String),
}

impl fmt::Display for RangeParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RangeParseError::Empty => write!(f, "empty range expression"),
            RangeParseError::Syntax(ref s) => write!(
                f,
                "'{}' is not a range (expected one of x, x:, ~:x, x:y, @x:y)",
                s
            ),
            RangeParseError::InvalidNumber(ref s) => write!(f, "couldn't parse number from '{}'", s),
            RangeParseError::Inverted(ref s) => {
                write!(f, "'{}' has a lower bound greater than its upper bound", s)
            }
        }
    }
}

/// One form of range expression
///
/// `build` is only called with captures from `pattern`.
struct Rule {
    name: &'static str,
    pattern: Regex,
    build: fn(&Captures) -> Result<RangeSpec, RangeParseError>,
}

const NUM: &str = r"(-?(?:\d+(?:\.\d*)?|\.\d+))";

fn rule(
    name: &'static str,
    pattern: &str,
    build: fn(&Captures) -> Result<RangeSpec, RangeParseError>,
) -> Rule {
    let pattern = format!("^{}$", pattern.replace("NUM", NUM));
    Rule {
        name,
        pattern: Regex::new(&pattern).unwrap(),
        build,
    }
}

lazy_static! {
    /// The range forms, in the order they are tried
    ///
    /// First match wins. `@x:y` must come before `x:y`.
    static ref RULES: Vec<Rule> = vec![
        rule("inside", "@NUM:NUM", |c| {
            let (x, y) = (bound(c, 1)?, bound(c, 2)?);
            ordered(c, x, y).map(|(x, y)| RangeSpec::Inside(x, y))
        }),
        rule("outside", "NUM:NUM", |c| {
            let (x, y) = (bound(c, 1)?, bound(c, 2)?);
            ordered(c, x, y).map(|(x, y)| RangeSpec::Outside(x, y))
        }),
        rule("above", "~:NUM", |c| bound(c, 1).map(RangeSpec::Above)),
        rule("below", "NUM:", |c| bound(c, 1).map(RangeSpec::Below)),
        rule("at-most", "NUM", |c| bound(c, 1).map(RangeSpec::AtMost)),
    ];
}

fn bound(caps: &Captures, idx: usize) -> Result<f64, RangeParseError> {
    let raw = &caps[idx];
    raw.parse::<f64>()
        .map_err(|_| RangeParseError::InvalidNumber(raw.to_owned()))
}

fn ordered(caps: &Captures, x: f64, y: f64) -> Result<(f64, f64), RangeParseError> {
    if x <= y {
        Ok((x, y))
    } else {
        Err(RangeParseError::Inverted(caps[0].to_owned()))
    }
}

/// Parse a range expression
///
/// Surrounding whitespace is ignored. Units are not understood here.
pub fn parse_range(pattern: &str) -> Result<RangeSpec, RangeParseError> {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return Err(RangeParseError::Empty);
    }
    RULES
        .iter()
        .find_map(|rule| {
            rule.pattern.captures(pattern).map(|caps| {
                trace!("'{}' is an {} range", pattern, rule.name);
                (rule.build)(&caps)
            })
        })
        .unwrap_or_else(|| Err(RangeParseError::Syntax(pattern.to_owned())))
}
