//! # Type Coercion
//!
//! Cell text → typed literal. A failure here costs one attribute, never the
//! row: callers turn the `Err(reason)` into an [`crate::AttributeError`].

use crate::config::BooleanPolicy;
use crate::primitives::{FALSY_TOKENS, TRUTHY_TOKENS};
use crate::{Datatype, Literal};
use regex::Regex;
use std::sync::LazyLock;

static INTEGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([+-]?\d+)(?:\.0*)?$").expect("integer pattern"));

static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([+-]?)(\d*)(?:\.(\d*))?$").expect("decimal pattern"));

/// Parse an `xsd:integer`.
///
/// Accepts plain integers and integral decimal text (`"20.0"`), which is how
/// spreadsheet exports write integer columns that contain blanks.
pub fn integer(text: &str) -> Result<Literal, String> {
    let caps = INTEGER_RE
        .captures(text.trim())
        .ok_or_else(|| "not an integer".to_string())?;
    let digits = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let value: i64 = digits
        .parse()
        .map_err(|_| "integer out of range".to_string())?;
    Ok(Literal::integer(value))
}

/// Parse an `xsd:decimal` and normalize its lexical form.
///
/// Leading zeros and trailing fractional zeros are removed, and at least one
/// fractional digit is kept (`"07.50"` → `"7.5"`, `"12"` → `"12.0"`).
pub fn decimal(text: &str) -> Result<Literal, String> {
    let caps = DECIMAL_RE
        .captures(text.trim())
        .ok_or_else(|| "not a decimal".to_string())?;
    let sign = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let whole = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
    let fraction = caps.get(3).map(|m| m.as_str()).unwrap_or_default();

    if whole.is_empty() && fraction.is_empty() {
        return Err("not a decimal".to_string());
    }

    let whole = whole.trim_start_matches('0');
    let whole = if whole.is_empty() { "0" } else { whole };
    let fraction = fraction.trim_end_matches('0');
    let fraction = if fraction.is_empty() { "0" } else { fraction };

    let is_zero = whole == "0" && fraction == "0";
    let sign = if sign == "-" && !is_zero { "-" } else { "" };

    Ok(Literal::typed(
        format!("{sign}{whole}.{fraction}"),
        Datatype::Decimal,
    ))
}

/// Normalize a present boolean-like cell under `policy`.
///
/// Truthy tokens (`sí`, `si`, `yes`, `true`, `1`, any case) are `true`.
/// Under [`BooleanPolicy::DefaultFalse`] everything else is `false`; a
/// missing cell produces no value at all.
pub fn boolean(text: &str, policy: BooleanPolicy) -> Result<Literal, String> {
    if is_truthy(text) {
        return Ok(Literal::boolean(true));
    }
    match policy {
        BooleanPolicy::DefaultFalse => Ok(Literal::boolean(false)),
        BooleanPolicy::Strict => {
            let token = text.trim().to_lowercase();
            if FALSY_TOKENS.contains(&token.as_str()) {
                Ok(Literal::boolean(false))
            } else {
                Err("not a recognized boolean".to_string())
            }
        }
    }
}

fn is_truthy(text: &str) -> bool {
    let token = text.trim().to_lowercase();
    TRUTHY_TOKENS.contains(&token.as_str())
}
