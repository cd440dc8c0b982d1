//! Run parameters.
//!
//! [`Parameters`] mirrors the nested TOML layout users edit (see
//! `config/default.toml`). Dimensional values are quantity strings such as
//! `"1000 GtCO2"`; optional constraints are switched off with `false`.
//!
//! [`Parameters::validate`] checks every value and converts every quantity to
//! the internal [`UnitSystem`], producing a [`ModelConfig`] that components
//! read their parameters from. Errors always name the parameter path.

use crate::errors::{MimosaError, MimosaResult};
use crate::model::{RegionSet, TimeDomain};
use crate::units::{QuantityKind, UnitSystem};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Contents of the shipped default parameter file.
pub const DEFAULT_PARAMETERS: &str = include_str!("../config/default.toml");

/// Scale of cumulative abated emissions over which learning-by-doing halves
/// costs by `1 - rho`.
pub const LBD_SCALING: &str = "40 GtCO2";

/// A setting that is either switched off with `false` or given a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Toggle<T> {
    Flag(bool),
    Value(T),
}

impl<T: Clone> Toggle<T> {
    /// `false` resolves to `None`. `true` carries no value and is rejected.
    pub fn resolve(&self, path: &str) -> MimosaResult<Option<T>> {
        match self {
            Toggle::Flag(false) => Ok(None),
            Toggle::Flag(true) => Err(MimosaError::InvalidParameter {
                parameter: path.to_string(),
                reason: "expected a value or `false`, found `true`".to_string(),
            }),
            Toggle::Value(value) => Ok(Some(value.clone())),
        }
    }
}

impl<T> Default for Toggle<T> {
    fn default() -> Self {
        Toggle::Flag(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeParameters {
    /// First calendar year of the run
    pub start: f64,
    /// Last calendar year of the run
    pub end: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegionParameters {
    pub name: String,
    /// Capital stock at the start of the run
    /// unit: currency
    pub initial_capital: String,
    /// Regional multiplier on the damage function
    ///
    /// default: 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_factor: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InertiaParameters {
    /// Fastest allowed decline of regional emissions, as a fraction of the
    /// region's initial baseline per year (negative)
    #[serde(default)]
    pub regional: Toggle<f64>,
    /// Same, for global emissions
    #[serde(default)]
    pub global: Toggle<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmissionsParameters {
    /// Cumulative emissions allowed from 2100 onwards
    /// unit: emissions
    #[serde(default)]
    pub carbonbudget: Toggle<String>,
    #[serde(default)]
    pub inertia: InertiaParameters,
    /// Lower bound on global emissions
    /// unit: emissions rate
    #[serde(default)]
    pub min_level: Toggle<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemperatureParameters {
    /// Temperature at the start of the run
    /// unit: temperature
    pub initial: String,
    /// Transient climate response to cumulative emissions
    /// unit: temperature / emissions
    #[serde(rename = "TCRE")]
    pub tcre: String,
}

fn default_savings_rate() -> f64 {
    0.21
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GdpParameters {
    /// Capital share of Cobb-Douglas output
    pub alpha: f64,
    /// Fraction of capital lost per year
    pub depreciation_of_capital: f64,
    #[serde(default = "default_savings_rate")]
    pub savings_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MacParameters {
    /// MAC scale: carbon price at full abatement without learning
    /// unit: currency / emissions
    pub gamma: String,
    /// MAC exponent
    pub beta: f64,
    /// Learning-by-doing progress ratio
    pub rho: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DamageParameters {
    /// Quadratic damage coefficient
    /// unit: 1 / temperature^2
    pub coeff: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LearningParameters {
    /// Annual learning-over-time cost reduction
    #[serde(rename = "LOT_rate", default)]
    pub lot_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EconomicsParameters {
    #[serde(rename = "GDP")]
    pub gdp: GdpParameters,
    /// Elasticity of marginal utility of consumption
    pub elasmu: f64,
    /// Pure rate of time preference
    #[serde(rename = "PRTP")]
    pub prtp: f64,
    #[serde(rename = "MAC")]
    pub mac: MacParameters,
    pub damages: DamageParameters,
    #[serde(default)]
    pub learning: LearningParameters,
}

/// User-facing run parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Parameters {
    pub time: TimeParameters,
    pub regions: Vec<RegionParameters>,
    /// Socioeconomic scenario the trajectory data was taken from
    #[serde(rename = "SSP")]
    pub ssp: String,
    pub emissions: EmissionsParameters,
    pub temperature: TemperatureParameters,
    pub economics: EconomicsParameters,
    #[serde(default)]
    pub units: UnitSystem,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            time: TimeParameters {
                start: 2015.0,
                end: 2200.0,
            },
            regions: vec![RegionParameters {
                name: "WORLD".to_string(),
                initial_capital: "223 trillion USD".to_string(),
                damage_factor: None,
            }],
            ssp: "SSP2".to_string(),
            emissions: EmissionsParameters {
                carbonbudget: Toggle::Value("1000 GtCO2".to_string()),
                inertia: InertiaParameters::default(),
                min_level: Toggle::Flag(false),
            },
            temperature: TemperatureParameters {
                initial: "1.0 delta_degC".to_string(),
                tcre: "0.62 delta_degC/TtCO2".to_string(),
            },
            economics: EconomicsParameters {
                gdp: GdpParameters {
                    alpha: 0.3,
                    depreciation_of_capital: 0.05,
                    savings_rate: default_savings_rate(),
                },
                elasmu: 1.001,
                prtp: 0.015,
                mac: MacParameters {
                    gamma: "2601.7 USD/tCO2".to_string(),
                    beta: 3.0,
                    rho: 0.82,
                },
                damages: DamageParameters { coeff: 0.00267 },
                learning: LearningParameters::default(),
            },
            units: UnitSystem::default(),
        }
    }
}

/// A region after validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub name: String,
    /// Internal currency unit
    pub initial_capital: f64,
    pub damage_factor: f64,
}

/// Validated parameters with every quantity in internal units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub begin_year: f64,
    pub end_year: f64,
    pub ssp: String,
    pub regions: Vec<RegionConfig>,
    pub carbon_budget: Option<f64>,
    pub inertia_regional: Option<f64>,
    pub inertia_global: Option<f64>,
    pub min_level: Option<f64>,
    pub t0: f64,
    pub tcre: f64,
    pub alpha: f64,
    pub dk: f64,
    pub sr: f64,
    pub elasmu: f64,
    pub prtp: f64,
    pub mac_gamma: f64,
    pub mac_beta: f64,
    pub lbd_rate: f64,
    pub lbd_scaling: f64,
    pub lot_rate: f64,
    pub damage_coeff: f64,
    pub units: UnitSystem,
}

impl ModelConfig {
    pub fn time_domain(&self) -> MimosaResult<TimeDomain> {
        TimeDomain::new(self.begin_year, self.end_year)
    }

    pub fn region_set(&self) -> MimosaResult<RegionSet> {
        RegionSet::new(self.regions.iter().map(|r| r.name.as_str()))
    }

    pub fn region_names(&self) -> Vec<String> {
        self.regions.iter().map(|r| r.name.clone()).collect()
    }
}

fn check(parameter: &str, value: f64, valid: bool, expected: &str) -> MimosaResult<f64> {
    if value.is_finite() && valid {
        Ok(value)
    } else {
        Err(MimosaError::InvalidParameter {
            parameter: parameter.to_string(),
            reason: format!("{value} is not {expected}"),
        })
    }
}

impl Parameters {
    pub fn from_toml_str(contents: &str) -> MimosaResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> MimosaResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Checks every parameter and converts quantities to internal units.
    pub fn validate(&self) -> MimosaResult<ModelConfig> {
        let units = &self.units;
        units.validate()?;

        // Checked here so the error is reported before any unit conversion
        TimeDomain::new(self.time.start, self.time.end)?;
        RegionSet::new(self.regions.iter().map(|r| r.name.as_str()))?;

        let mut regions = Vec::with_capacity(self.regions.len());
        for region in &self.regions {
            let path = format!("regions.{}", region.name);
            let initial_capital = units.convert(
                &format!("{path}.initial_capital"),
                &region.initial_capital,
                QuantityKind::Currency,
            )?;
            check(
                &format!("{path}.initial_capital"),
                initial_capital,
                initial_capital > 0.0,
                "positive",
            )?;
            let damage_factor = match region.damage_factor {
                Some(factor) => check(
                    &format!("{path}.damage_factor"),
                    factor,
                    factor >= 0.0,
                    "non-negative",
                )?,
                None => 1.0,
            };
            regions.push(RegionConfig {
                name: region.name.clone(),
                initial_capital,
                damage_factor,
            });
        }

        let emissions = &self.emissions;
        let carbon_budget = emissions
            .carbonbudget
            .resolve("emissions.carbonbudget")?
            .map(|b| units.convert("emissions.carbonbudget", &b, QuantityKind::Emissions))
            .transpose()?;
        let min_level = emissions
            .min_level
            .resolve("emissions.min_level")?
            .map(|m| units.convert("emissions.min_level", &m, QuantityKind::EmissionsRate))
            .transpose()?;
        let inertia_regional = emissions
            .inertia
            .regional
            .resolve("emissions.inertia.regional")?
            .map(|i| check("emissions.inertia.regional", i, true, "finite"))
            .transpose()?;
        let inertia_global = emissions
            .inertia
            .global
            .resolve("emissions.inertia.global")?
            .map(|i| check("emissions.inertia.global", i, true, "finite"))
            .transpose()?;

        let t0 = units.convert(
            "temperature.initial",
            &self.temperature.initial,
            QuantityKind::Temperature,
        )?;
        let tcre = units.convert(
            "temperature.TCRE",
            &self.temperature.tcre,
            QuantityKind::ClimateResponse,
        )?;

        let economics = &self.economics;
        let gdp = &economics.gdp;
        let alpha = check(
            "economics.GDP.alpha",
            gdp.alpha,
            gdp.alpha > 0.0 && gdp.alpha < 1.0,
            "in (0, 1)",
        )?;
        let dk = check(
            "economics.GDP.depreciation_of_capital",
            gdp.depreciation_of_capital,
            (0.0..1.0).contains(&gdp.depreciation_of_capital),
            "in [0, 1)",
        )?;
        let sr = check(
            "economics.GDP.savings_rate",
            gdp.savings_rate,
            (0.0..=1.0).contains(&gdp.savings_rate),
            "in [0, 1]",
        )?;
        let elasmu = check("economics.elasmu", economics.elasmu, economics.elasmu > 0.0, "positive")?;
        let prtp = check("economics.PRTP", economics.prtp, true, "finite")?;

        let mac = &economics.mac;
        let mac_gamma = units.convert("economics.MAC.gamma", &mac.gamma, QuantityKind::MarginalCost)?;
        check("economics.MAC.gamma", mac_gamma, mac_gamma >= 0.0, "non-negative")?;
        let mac_beta = check("economics.MAC.beta", mac.beta, mac.beta > 0.0, "positive")?;
        let lbd_rate = check("economics.MAC.rho", mac.rho, mac.rho > 0.0, "positive")?;
        let lbd_scaling = units.convert("LBD_scaling", LBD_SCALING, QuantityKind::Emissions)?;

        let damage_coeff = check(
            "economics.damages.coeff",
            economics.damages.coeff,
            economics.damages.coeff >= 0.0,
            "non-negative",
        )?;
        let lot_rate = check(
            "economics.learning.LOT_rate",
            economics.learning.lot_rate,
            economics.learning.lot_rate > -1.0,
            "greater than -1",
        )?;

        if damage_coeff == 0.0 {
            for region in self.regions.iter().filter(|r| r.damage_factor.is_some()) {
                warn!(
                    "damage_factor of region '{}' has no effect: economics.damages.coeff is 0",
                    region.name
                );
            }
        }

        Ok(ModelConfig {
            begin_year: self.time.start,
            end_year: self.time.end,
            ssp: self.ssp.clone(),
            regions,
            carbon_budget,
            inertia_regional,
            inertia_global,
            min_level,
            t0,
            tcre,
            alpha,
            dk,
            sr,
            elasmu,
            prtp,
            mac_gamma,
            mac_beta,
            lbd_rate,
            lbd_scaling,
            lot_rate,
            damage_coeff,
            units: units.clone(),
        })
    }
}
