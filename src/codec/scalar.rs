//! Conversion between element text and typed scalar values.
//!
//! Two independent interpretations of text live here:
//! - [`decode`] infers a scalar kind (integer, then float, then boolean literal,
//!   else string).
//! - [`is_truthy`] answers a yes/no question for display and option handling.
//!
//! They disagree on purpose: `"1"` decodes to `Integer(1)` but is truthy.

use crate::models::Scalar;

/// Infer a typed scalar from element text.
///
/// Missing or empty text decodes to an empty string.
pub fn decode(text: Option<&str>) -> Scalar {
    let text = match text {
        Some(t) if !t.is_empty() => t,
        _ => return Scalar::String(String::new()),
    };

    // Numbers may be padded; anything else keeps its text verbatim.
    let number = text.trim();
    if let Ok(i) = number.parse::<i64>() {
        return Scalar::Integer(i);
    }
    if let Ok(x) = number.parse::<f64>() {
        return Scalar::Float(x);
    }
    if text.eq_ignore_ascii_case("true") {
        return Scalar::Boolean(true);
    }
    if text.eq_ignore_ascii_case("false") {
        return Scalar::Boolean(false);
    }
    Scalar::String(text.to_string())
}

/// Render a scalar as element text. An absent value renders as empty text.
pub fn encode(value: Option<&Scalar>) -> String {
    value.map(Scalar::to_string).unwrap_or_default()
}

/// Loose yes/no reading of text.
///
/// Any number greater than zero is true, as are `true`, `yes` and `1`
/// (case-insensitive). Everything else is false.
pub fn is_truthy(text: &str) -> bool {
    if let Ok(x) = text.trim().parse::<f64>() {
        return x > 0.0;
    }
    ["true", "yes", "1"]
        .iter()
        .any(|lit| text.eq_ignore_ascii_case(lit))
}
