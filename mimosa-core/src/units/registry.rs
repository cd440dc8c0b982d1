//! Known unit symbols with their dimensions and factors.
//!
//! A factor converts one of the unit into the base unit of its dimension:
//! kg of carbon for mass, seconds for time, kelvin for temperature
//! differences and USD for currency. CO2 units carry the 12/44 ratio, so
//! carbon and CO2 amounts inter-convert.

use super::dimension::Dimension;
use std::collections::HashMap;
use std::sync::LazyLock;

/// A year of 365.25 days, in seconds.
pub const SECONDS_PER_YEAR: f64 = 365.25 * 24.0 * 3600.0;
/// Carbon mass per unit of CO2 mass.
pub const C_TO_CO2_RATIO: f64 = 12.0 / 44.0;

const M: Dimension = Dimension::MASS;
const T: Dimension = Dimension::TIME;
const K: Dimension = Dimension::TEMPERATURE;
const USD: Dimension = Dimension::CURRENCY;
const NONE: Dimension = Dimension::dimensionless();

const UNITS: &[(&str, Dimension, f64)] = &[
    ("1", NONE, 1.0),
    ("kg", M, 1.0),
    ("t", M, 1e3),
    ("s", T, 1.0),
    ("yr", T, SECONDS_PER_YEAR),
    ("K", K, 1.0),
    // Temperatures are always differences
    ("degC", K, 1.0),
    ("delta_degC", K, 1.0),
    ("C", M, 1.0),
    ("tC", M, 1e3),
    ("GtC", M, 1e12),
    ("PgC", M, 1e12),
    ("CO2", M, C_TO_CO2_RATIO),
    ("tCO2", M, 1e3 * C_TO_CO2_RATIO),
    ("MtCO2", M, 1e9 * C_TO_CO2_RATIO),
    ("GtCO2", M, 1e12 * C_TO_CO2_RATIO),
    ("USD", USD, 1.0),
    // Magnitude words, as in "trillion USD" or "billion people"
    ("thousand", NONE, 1e3),
    ("million", NONE, 1e6),
    ("billion", NONE, 1e9),
    ("trillion", NONE, 1e12),
    ("people", NONE, 1.0),
];

const ALIASES: &[(&str, &str)] = &[
    ("dimensionless", "1"),
    ("year", "yr"),
    ("years", "yr"),
    ("a", "yr"),
    ("celsius", "degC"),
    ("deg_C", "degC"),
    ("dollar", "USD"),
    ("dollars", "USD"),
    ("persons", "people"),
];

/// Prefixes accepted in front of any registered symbol, e.g. `TtCO2`.
const PREFIXES: &[(&str, f64)] = &[("P", 1e15), ("T", 1e12), ("G", 1e9), ("M", 1e6), ("k", 1e3)];

/// Dimension and base factor of a unit symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitInfo {
    pub dimension: Dimension,
    pub to_base_factor: f64,
}

/// The registry used by the unit parser.
pub static UNIT_REGISTRY: LazyLock<UnitRegistry> = LazyLock::new(UnitRegistry::new);

#[derive(Debug)]
pub struct UnitRegistry {
    units: HashMap<&'static str, UnitInfo>,
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitRegistry {
    pub fn new() -> Self {
        let mut units: HashMap<&'static str, UnitInfo> = UNITS
            .iter()
            .map(|&(symbol, dimension, to_base_factor)| {
                (
                    symbol,
                    UnitInfo {
                        dimension,
                        to_base_factor,
                    },
                )
            })
            .collect();
        for (alias, symbol) in ALIASES {
            if let Some(info) = units.get(symbol).copied() {
                units.insert(alias, info);
            }
        }
        Self { units }
    }

    /// Looks up a symbol, an alias or a prefixed symbol.
    pub fn lookup(&self, symbol: &str) -> Option<UnitInfo> {
        self.units.get(symbol).copied().or_else(|| {
            PREFIXES.iter().find_map(|(prefix, factor)| {
                let info = self.units.get(symbol.strip_prefix(prefix)?)?;
                Some(UnitInfo {
                    dimension: info.dimension,
                    to_base_factor: info.to_base_factor * factor,
                })
            })
        })
    }
}
