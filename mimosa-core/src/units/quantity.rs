//! Quantities: a magnitude paired with a unit, written as `"1000 GtCO2"`.

use super::conversion::{ConversionError, Unit};
use super::parser::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A scalar value with a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub magnitude: f64,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(magnitude: f64, unit: Unit) -> Self {
        Self { magnitude, unit }
    }

    /// Parses `"<number> <unit>"`.
    ///
    /// The number may use exponent notation (`"2.6e3 USD/tCO2"`). A bare
    /// number is rejected: callers decide whether a dimensionless value is
    /// acceptable before reaching for a quantity.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let input = input.trim();
        let split = number_prefix_len(input);
        if split == 0 {
            return Err(ParseError::ParseFailed(format!(
                "'{input}' does not start with a number"
            )));
        }

        let (number, unit) = input.split_at(split);
        let magnitude: f64 = number
            .parse()
            .map_err(|_| ParseError::ParseFailed(format!("invalid number '{number}'")))?;
        if unit.trim().is_empty() {
            return Err(ParseError::EmptyUnit);
        }

        Ok(Self {
            magnitude,
            unit: Unit::parse(unit)?,
        })
    }

    /// Magnitude expressed in `target`.
    pub fn value_in(&self, target: &Unit) -> Result<f64, ConversionError> {
        self.unit.convert_to(self.magnitude, target)
    }
}

impl FromStr for Quantity {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.magnitude, self.unit)
    }
}

/// Length of the leading float literal in `input`.
fn number_prefix_len(input: &str) -> usize {
    let bytes = input.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        i += 1;
    }
    let digits_start = i;
    while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
        i += 1;
    }
    if i == digits_start {
        return 0;
    }
    // Exponent, only when followed by digits so that "1 e" stays a unit
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'-' || bytes[j] == b'+') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_quantity() {
        let q = Quantity::parse("1000 GtCO2").unwrap();
        assert_eq!(q.magnitude, 1000.0);
        assert_eq!(q.unit, Unit::parse("GtCO2").unwrap());
    }

    #[test]
    fn test_parse_without_space_and_exponent() {
        let q: Quantity = "2.6017e3USD/tCO2".parse().unwrap();
        assert_relative_eq!(q.magnitude, 2601.7);
    }

    #[test]
    fn test_negative_magnitude() {
        let q = Quantity::parse("-5 GtCO2/yr").unwrap();
        assert_eq!(q.magnitude, -5.0);
    }

    #[test]
    fn test_value_in() {
        let q = Quantity::parse("40 GtCO2").unwrap();
        let tt = Unit::parse("TtCO2").unwrap();
        assert_relative_eq!(q.value_in(&tt).unwrap(), 0.04, max_relative = 1e-12);
    }

    #[test]
    fn test_rejects_bare_number_and_missing_number() {
        assert!(matches!(Quantity::parse("42"), Err(ParseError::EmptyUnit)));
        assert!(Quantity::parse("GtCO2").is_err());
        assert!(Quantity::parse("1.2.3 GtCO2").is_err());
    }
}
