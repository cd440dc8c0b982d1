//! Conversion between parsed units.
//!
//! ```
//! use mimosa_core::units::Unit;
//!
//! let gtco2 = Unit::parse("GtCO2").unwrap();
//! let ttco2 = Unit::parse("TtCO2").unwrap();
//! let factor = ttco2.conversion_factor(&gtco2).unwrap();
//! assert!((factor - 1000.0).abs() < 1e-9);
//! ```

use super::dimension::Dimension;
use super::parser::{ParseError, ParsedUnit};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("cannot convert '{from_unit}' ({from}) to '{to_unit}' ({to})")]
    IncompatibleDimensions {
        from: Dimension,
        to: Dimension,
        from_unit: String,
        to_unit: String,
    },
    #[error("unit parse error: {0}")]
    ParseError(#[from] ParseError),
}

/// A unit as written in a parameter file, with its parsed form.
///
/// Equality compares the parsed form, so `"USD/tCO2"` equals `"USD per tCO2"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    text: String,
    parsed: ParsedUnit,
}

impl Unit {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        Ok(Self {
            text: input.trim().to_string(),
            parsed: ParsedUnit::parse(input)?,
        })
    }

    /// The unit as it was written.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn dimension(&self) -> Result<Dimension, ParseError> {
        self.parsed.dimension()
    }

    /// Multiplier taking a value in `self` to a value in `target`.
    pub fn conversion_factor(&self, target: &Self) -> Result<f64, ConversionError> {
        let (from, to) = (self.dimension()?, target.dimension()?);
        if !from.is_compatible(&to) {
            return Err(ConversionError::IncompatibleDimensions {
                from,
                to,
                from_unit: self.text.clone(),
                to_unit: target.text.clone(),
            });
        }
        Ok(self.parsed.to_base_factor()? / target.parsed.to_base_factor()?)
    }

    pub fn convert_to(&self, value: f64, target: &Self) -> Result<f64, ConversionError> {
        self.conversion_factor(target).map(|factor| value * factor)
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.parsed == other.parsed
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Conversion factor between two unit strings.
pub fn conversion_factor(from: &str, to: &str) -> Result<f64, ConversionError> {
    Unit::parse(from)?.conversion_factor(&Unit::parse(to)?)
}
