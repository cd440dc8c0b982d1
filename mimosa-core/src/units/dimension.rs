//! Dimensions of the quantities a MIMOSA run is configured with.
//!
//! A dimension is a vector of integer exponents over four base quantities:
//! mass (carbon and CO2 amounts), time, temperature difference and currency.
//! Population counts and magnitude words ("billion") are dimensionless.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Div, Mul};

const SYMBOLS: [&str; 4] = ["M", "T", "Θ", "$"];

/// Exponents of mass, time, temperature and currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Dimension([i8; 4]);

impl Dimension {
    pub const MASS: Self = Self([1, 0, 0, 0]);
    pub const TIME: Self = Self([0, 1, 0, 0]);
    pub const TEMPERATURE: Self = Self([0, 0, 1, 0]);
    pub const CURRENCY: Self = Self([0, 0, 0, 1]);
    /// M T^-1
    pub const EMISSION_RATE: Self = Self([1, -1, 0, 0]);
    /// $ T^-1, e.g. GDP
    pub const CURRENCY_RATE: Self = Self([0, -1, 0, 1]);

    pub const fn dimensionless() -> Self {
        Self([0; 4])
    }

    pub fn is_dimensionless(&self) -> bool {
        self.0 == [0; 4]
    }

    /// Units can only be converted into units of the same dimension.
    pub fn is_compatible(&self, other: &Self) -> bool {
        self == other
    }

    pub fn pow(self, exponent: i8) -> Self {
        Self(self.0.map(|e| e * exponent))
    }

    fn combine(self, other: Self, sign: i8) -> Self {
        let mut exponents = self.0;
        for (e, o) in exponents.iter_mut().zip(other.0) {
            *e += sign * o;
        }
        Self(exponents)
    }
}

impl Mul for Dimension {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.combine(rhs, 1)
    }
}

impl Div for Dimension {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        self.combine(rhs, -1)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "dimensionless");
        }
        let parts: Vec<String> = SYMBOLS
            .iter()
            .zip(self.0)
            .filter(|(_, e)| *e != 0)
            .map(|(symbol, e)| match e {
                1 => symbol.to_string(),
                _ => format!("{symbol}^{e}"),
            })
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensionless() {
        assert!(Dimension::dimensionless().is_dimensionless());
        assert_eq!(Dimension::default().to_string(), "dimensionless");
    }

    #[test]
    fn rates() {
        assert_eq!(Dimension::MASS / Dimension::TIME, Dimension::EMISSION_RATE);
        assert_eq!(Dimension::CURRENCY / Dimension::TIME, Dimension::CURRENCY_RATE);
    }

    #[test]
    fn marginal_cost_does_not_depend_on_time() {
        // ($/yr) / (M/yr) = $/M
        assert_eq!(
            Dimension::CURRENCY_RATE / Dimension::EMISSION_RATE,
            Dimension::CURRENCY / Dimension::MASS
        );
    }

    #[test]
    fn compatibility() {
        assert!(Dimension::MASS.is_compatible(&Dimension::MASS));
        assert!(!Dimension::MASS.is_compatible(&Dimension::CURRENCY));
    }

    #[test]
    fn display() {
        assert_eq!(Dimension::MASS.to_string(), "M");
        assert_eq!(Dimension::CURRENCY_RATE.to_string(), "T^-1 $");
        assert_eq!(Dimension::TEMPERATURE.pow(2).to_string(), "Θ^2");
    }
}
