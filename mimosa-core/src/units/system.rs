//! The internal unit system of a model run.
//!
//! Every dimensional parameter is converted into one of a small number of
//! named units before the model is assembled, so the equations themselves
//! never carry units. Derived kinds (marginal costs, the climate response)
//! are built from the named units.

use super::conversion::{conversion_factor, Unit};
use super::dimension::Dimension;
use super::quantity::Quantity;
use crate::errors::{MimosaError, MimosaResult};
use serde::{Deserialize, Serialize};
use std::fmt;

const RATE_TOLERANCE: f64 = 1e-12;

/// What a configured quantity measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuantityKind {
    Emissions,
    EmissionsRate,
    Currency,
    CurrencyRate,
    Population,
    Temperature,
    /// Cost per unit of abated emissions, e.g. the MAC scale `gamma`
    MarginalCost,
    /// Warming per unit of cumulative emissions (TCRE)
    ClimateResponse,
}

impl QuantityKind {
    /// The dimension a unit must have to describe this kind.
    pub fn dimension(&self) -> Dimension {
        match self {
            Self::Emissions => Dimension::MASS,
            Self::EmissionsRate => Dimension::EMISSION_RATE,
            Self::Currency => Dimension::CURRENCY,
            Self::CurrencyRate => Dimension::CURRENCY_RATE,
            Self::Population => Dimension::dimensionless(),
            Self::Temperature => Dimension::TEMPERATURE,
            Self::MarginalCost => Dimension::CURRENCY / Dimension::MASS,
            Self::ClimateResponse => Dimension::TEMPERATURE / Dimension::MASS,
        }
    }
}

impl fmt::Display for QuantityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Emissions => "emissions",
            Self::EmissionsRate => "emissions rate",
            Self::Currency => "currency",
            Self::CurrencyRate => "currency rate",
            Self::Population => "population",
            Self::Temperature => "temperature",
            Self::MarginalCost => "marginal cost",
            Self::ClimateResponse => "climate response",
        };
        write!(f, "{name}")
    }
}

/// Named internal units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UnitSystem {
    /// Cumulative emissions and carbon budgets
    ///
    /// default: GtCO2
    pub emissions: String,
    /// Emission flows, including scenario baseline data
    ///
    /// default: GtCO2/yr
    pub emissions_rate: String,
    /// Capital stock
    ///
    /// default: trillion USD
    pub currency: String,
    /// Output, investment and consumption flows
    ///
    /// default: trillion USD/yr
    pub currency_rate: String,
    /// default: billion
    pub population: String,
    /// Temperature change relative to pre-industrial
    ///
    /// default: delta_degC
    pub temperature: String,
}

impl Default for UnitSystem {
    fn default() -> Self {
        Self {
            emissions: "GtCO2".to_string(),
            emissions_rate: "GtCO2/yr".to_string(),
            currency: "trillion USD".to_string(),
            currency_rate: "trillion USD/yr".to_string(),
            population: "billion".to_string(),
            temperature: "delta_degC".to_string(),
        }
    }
}

impl UnitSystem {
    /// The unit string used internally for `kind`.
    pub fn unit_string(&self, kind: QuantityKind) -> String {
        match kind {
            QuantityKind::Emissions => self.emissions.clone(),
            QuantityKind::EmissionsRate => self.emissions_rate.clone(),
            QuantityKind::Currency => self.currency.clone(),
            QuantityKind::CurrencyRate => self.currency_rate.clone(),
            QuantityKind::Population => self.population.clone(),
            QuantityKind::Temperature => self.temperature.clone(),
            QuantityKind::MarginalCost => {
                format!("({}) / ({})", self.currency_rate, self.emissions_rate)
            }
            QuantityKind::ClimateResponse => {
                format!("({}) / ({})", self.temperature, self.emissions)
            }
        }
    }

    /// Parses the internal unit for `kind` and checks its dimension.
    pub fn unit(&self, kind: QuantityKind) -> MimosaResult<Unit> {
        let unit_string = self.unit_string(kind);
        let parameter = format!("units.{kind}");
        let unit = Unit::parse(&unit_string).map_err(|e| MimosaError::UnitConversion {
            parameter: parameter.clone(),
            unit: unit_string.clone(),
            details: e.to_string(),
        })?;
        let dimension = unit.dimension().map_err(|e| MimosaError::UnitConversion {
            parameter: parameter.clone(),
            unit: unit_string.clone(),
            details: e.to_string(),
        })?;
        if dimension != kind.dimension() {
            return Err(MimosaError::UnitConversion {
                parameter,
                unit: unit_string,
                details: format!("expected dimension {}, found {dimension}", kind.dimension()),
            });
        }
        Ok(unit)
    }

    /// Checks that every named unit parses with the dimension its kind needs.
    pub fn validate(&self) -> MimosaResult<()> {
        for kind in [
            QuantityKind::Emissions,
            QuantityKind::EmissionsRate,
            QuantityKind::Currency,
            QuantityKind::CurrencyRate,
            QuantityKind::Population,
            QuantityKind::Temperature,
        ] {
            self.unit(kind)?;
        }

        // Rates are integrated over model time in years
        for (name, rate, stock) in [
            ("units.emissions_rate", &self.emissions_rate, &self.emissions),
            ("units.currency_rate", &self.currency_rate, &self.currency),
        ] {
            let per_year = format!("({stock}) / yr");
            let error = |details: String| MimosaError::UnitConversion {
                parameter: name.to_string(),
                unit: per_year.clone(),
                details,
            };
            let factor = conversion_factor(rate, &per_year).map_err(|e| error(e.to_string()))?;
            if (factor - 1.0).abs() > RATE_TOLERANCE {
                return Err(error(format!("'{rate}' is {factor} times '{per_year}'")));
            }
        }
        Ok(())
    }

    /// Converts a quantity string (`"1000 GtCO2"`) for the parameter at
    /// `path` into the internal unit for `kind`.
    pub fn convert(&self, path: &str, value: &str, kind: QuantityKind) -> MimosaResult<f64> {
        let target = self.unit(kind)?;
        let trimmed = value.trim();
        if trimmed.parse::<f64>().is_ok() {
            return Err(MimosaError::MissingUnit {
                parameter: path.to_string(),
                unit: target.as_str().to_string(),
            });
        }
        let quantity = Quantity::parse(trimmed).map_err(|e| MimosaError::UnitConversion {
            parameter: path.to_string(),
            unit: target.as_str().to_string(),
            details: e.to_string(),
        })?;
        quantity
            .value_in(&target)
            .map_err(|e| MimosaError::UnitConversion {
                parameter: path.to_string(),
                unit: target.as_str().to_string(),
                details: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_system_is_valid() {
        UnitSystem::default().validate().unwrap();
    }

    #[test]
    fn test_convert_budget() {
        let units = UnitSystem::default();
        let value = units
            .convert("emissions.carbonbudget", "1 TtCO2", QuantityKind::Emissions)
            .unwrap();
        assert_relative_eq!(value, 1000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_convert_gamma() {
        let units = UnitSystem::default();
        let value = units
            .convert("economics.MAC.gamma", "2601.7 USD/tCO2", QuantityKind::MarginalCost)
            .unwrap();
        assert_relative_eq!(value, 2.6017, max_relative = 1e-12);
    }

    #[test]
    fn test_convert_tcre() {
        let units = UnitSystem::default();
        let value = units
            .convert(
                "temperature.TCRE",
                "0.62 delta_degC/TtCO2",
                QuantityKind::ClimateResponse,
            )
            .unwrap();
        assert_relative_eq!(value, 0.00062, max_relative = 1e-12);
    }

    #[test]
    fn test_bare_number_rejected() {
        let units = UnitSystem::default();
        let err = units
            .convert("emissions.carbonbudget", "1000", QuantityKind::Emissions)
            .unwrap_err();
        assert!(matches!(err, MimosaError::MissingUnit { ref parameter, .. } if parameter == "emissions.carbonbudget"));
    }

    #[test]
    fn test_wrong_dimension_names_parameter() {
        let units = UnitSystem::default();
        let err = units
            .convert("temperature.initial", "1 GtCO2", QuantityKind::Temperature)
            .unwrap_err();
        assert!(err.to_string().contains("temperature.initial"));
    }

    #[test]
    fn test_rates_must_be_per_year() {
        let units = UnitSystem {
            emissions: "MtCO2".to_string(),
            emissions_rate: "MtCO2 per year".to_string(),
            currency: "billion USD".to_string(),
            currency_rate: "billion USD/yr".to_string(),
            ..Default::default()
        };
        units.validate().unwrap();

        let mismatched = UnitSystem {
            emissions: "MtCO2".to_string(),
            ..Default::default()
        };
        let err = mismatched.validate().unwrap_err();
        assert!(
            matches!(err, MimosaError::UnitConversion { ref parameter, .. } if parameter == "units.emissions_rate")
        );
    }

    #[test]
    fn test_invalid_internal_unit() {
        let units = UnitSystem {
            emissions: "trillion USD".to_string(),
            ..Default::default()
        };
        assert!(units.validate().is_err());
    }
}
