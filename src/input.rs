//! Browser-style numeric parsing for the slider and pH field.
//!
//! Both controls hand us raw text. The slider value is read like `parseInt`
//! and the pH field like `parseFloat`: leading whitespace is skipped and the
//! longest numeric prefix wins, so `"12abc"` reads as 12 and `"7.5 pH"` as 7.5.
//! Text with no numeric prefix yields `None`. Only ASCII digits count, so a
//! trailing non-ASCII digit ends the prefix.

use once_cell::sync::Lazy;
use regex::Regex;

static INT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([+-]?[0-9]+)").expect("int prefix regex")
});

static FLOAT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)")
        .expect("float prefix regex")
});

/// Integer prefix of `text`, or `None` when there is none or it overflows.
pub fn parse_int_prefix(text: &str) -> Option<i64> {
    let caps = INT_PREFIX.captures(text)?;
    caps.get(1)?.as_str().parse::<i64>().ok()
}

/// Finite float prefix of `text`.
pub fn parse_float_prefix(text: &str) -> Option<f64> {
    let caps = FLOAT_PREFIX.captures(text)?;
    caps.get(1)?
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
