//! Decomposition of unit expressions into SI base units.
//!
//! An expression has the form `<numerator> [/ <denominator>]` where each side is a
//! whitespace separated list of factors. A factor is an optional decimal prefix, a
//! base symbol and an optional `^n` exponent, e.g. `mmol`, `l^-1` or `min`. The
//! numerator may be written as `1` for pure reciprocals such as `1 / s`.

use itertools::Itertools;

use crate::units::maps::{KIND_MAPPINGS, PREFIX_MAPPING};
use crate::units::UnitError;
use crate::versions::v2::{BaseUnit, UnitType};

/// Parses a unit expression into its base units.
///
/// # Arguments
///
/// * `expression` - The unit expression, e.g. `"mmol / l"` or `"1 / s"`.
///
/// # Returns
///
/// The base units in the order they appear, denominator factors carrying negated
/// exponents.
///
/// # Errors
///
/// Returns `UnitError::MalformedUnit` if the expression is empty, has more than one
/// `/`, or contains a factor that is not a known prefix/base combination.
pub fn parse_unit(expression: &str) -> Result<Vec<BaseUnit>, UnitError> {
    let malformed = |reason: &str| UnitError::MalformedUnit(expression.to_string(), reason.to_string());

    if expression.trim().is_empty() {
        return Err(malformed("expression is empty"));
    }

    let sides = expression.split('/').collect::<Vec<_>>();
    if sides.len() > 2 {
        return Err(malformed("more than one '/'"));
    }

    let mut base_units = parse_side(sides[0], 1).map_err(|reason| malformed(&reason))?;
    if base_units.is_none() && sides.len() == 1 {
        return Err(malformed("expression has no factors"));
    }

    if let Some(denominator) = sides.get(1) {
        match parse_side(denominator, -1).map_err(|reason| malformed(&reason))? {
            Some(units) => base_units.get_or_insert_with(Vec::new).extend(units),
            None => return Err(malformed("denominator is empty")),
        }
    }

    Ok(base_units.unwrap_or_default())
}

/// Parses one side of the fraction bar. `None` marks a side without any factor.
fn parse_side(side: &str, sign: i64) -> Result<Option<Vec<BaseUnit>>, String> {
    let factors = side.split_whitespace().collect::<Vec<_>>();
    if factors.is_empty() {
        return Ok(None);
    }

    let mut units = Vec::new();
    for factor in factors {
        if factor == "1" {
            continue;
        }
        units.extend(parse_factor(factor, sign)?);
    }

    Ok(Some(units))
}

fn parse_factor(factor: &str, sign: i64) -> Result<Vec<BaseUnit>, String> {
    let (symbol, exponent) = match factor.split_once('^') {
        Some((symbol, exponent)) => {
            let exponent = exponent
                .parse::<i64>()
                .map_err(|_| format!("invalid exponent in '{factor}'"))?;
            (symbol, exponent)
        }
        None => (factor, 1),
    };

    let (scale, definition) =
        split_prefix(symbol).ok_or_else(|| format!("unknown unit '{symbol}'"))?;

    Ok(definition
        .iter()
        .enumerate()
        .map(|(i, (kind, base_exponent, multiplier))| BaseUnit {
            kind: *kind,
            exponent: base_exponent * exponent * sign,
            // The prefix scales the leading factor only (mM is mmol per litre)
            scale: if i == 0 { scale } else { 0 },
            multiplier: *multiplier,
        })
        .collect())
}

/// Splits a symbol into a decimal scale and a base definition.
///
/// Whole-symbol matches win over prefixed readings so that `min` stays minutes and
/// `K` stays kelvin.
fn split_prefix(
    symbol: &str,
) -> Option<(i64, &'static Vec<(UnitType, i64, f64)>)> {
    if let Some(definition) = KIND_MAPPINGS.get(symbol) {
        return Some((0, definition));
    }

    PREFIX_MAPPING
        .iter()
        .sorted_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)))
        .find_map(|(prefix, scale)| {
            symbol
                .strip_prefix(prefix)
                .and_then(|rest| KIND_MAPPINGS.get(rest))
                .map(|definition| (*scale, definition))
        })
}
