//! Emissions and temperature
//!
//! Abatement reduces each region's baseline emissions. Regional emissions add
//! up to global emissions, which accumulate into cumulative emissions, and
//! warming follows cumulative emissions linearly (TCRE).
//!
//! Optional constraints, registered only when configured:
//!
//! - `carbon_budget`: cumulative emissions stay within the budget from 2100
//! - `regional_inertia` / `global_inertia`: emissions cannot fall faster than
//!   a fraction of initial baseline emissions per year
//! - `emission_floor`: global emissions stay above a minimum level

use crate::variables::*;
use log::debug;
use mimosa_core::component::Component;
use mimosa_core::config::ModelConfig;
use mimosa_core::errors::MimosaResult;
use mimosa_core::model::{Assembly, ParameterDefinition, Rule, VariableDefinition};
use mimosa_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

/// Parameters for the climate component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateParameters {
    /// Temperature at the start of the run
    /// unit: temperature
    pub t0: FloatValue,
    /// Transient climate response to cumulative emissions
    /// unit: temperature / emissions
    pub tcre: FloatValue,
    /// Cumulative emissions allowed from 2100 onwards
    /// unit: emissions
    pub carbon_budget: Option<FloatValue>,
    /// Slowest allowed rate of change of regional emissions, relative to
    /// the region's initial baseline
    /// unit: 1 / yr
    pub inertia_regional: Option<FloatValue>,
    /// Same, for global emissions
    /// unit: 1 / yr
    pub inertia_global: Option<FloatValue>,
    /// Minimum global emissions
    /// unit: emissions rate
    pub min_level: Option<FloatValue>,
}

impl ClimateParameters {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            t0: config.t0,
            tcre: config.tcre,
            carbon_budget: config.carbon_budget,
            inertia_regional: config.inertia_regional,
            inertia_global: config.inertia_global,
            min_level: config.min_level,
        }
    }
}

/// Emissions, cumulative emissions and temperature
///
/// $$ E_r = (1 - a_r) E^{base}_r, \quad E = \sum_r E_r $$
/// $$ \frac{dCE}{dt} = E, \quad T = T_0 + TCRE \cdot CE $$
///
/// Also declares the control `relative_abatement` and the time parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClimateComponent {
    parameters: ClimateParameters,
}

impl ClimateComponent {
    pub fn from_parameters(parameters: ClimateParameters) -> Self {
        Self { parameters }
    }
}

#[typetag::serde]
impl Component for ClimateComponent {
    fn declare(&self, assembly: &mut Assembly) -> MimosaResult<()> {
        let domain = *assembly.context().domain();
        assembly.declare_parameter(ParameterDefinition::scalar(BEGINYEAR, domain.begin_year()))?;
        assembly.declare_parameter(ParameterDefinition::scalar(ENDYEAR, domain.end_year()))?;
        assembly.declare_parameter(ParameterDefinition::scalar(TF, domain.tf()))?;
        assembly.declare_parameter(ParameterDefinition::scalar(YEAR2100, domain.year2100()))?;
        assembly.declare_parameter(
            ParameterDefinition::scalar(T0, self.parameters.t0).with_unit("temperature"),
        )?;
        assembly.declare_parameter(
            ParameterDefinition::scalar(TCRE, self.parameters.tcre)
                .with_unit("temperature / emissions"),
        )?;

        assembly.declare_variable(
            VariableDefinition::regional(RELATIVE_ABATEMENT)
                .control()
                .with_bounds(Some(0.0), Some(2.0))
                .with_initial_guess(0.0)
                .described("Fraction of baseline emissions abated"),
        )?;
        assembly.declare_variable(
            VariableDefinition::regional(REGIONAL_EMISSIONS)
                .state()
                .with_derivative()
                .with_unit("emissions rate"),
        )?;
        assembly.declare_variable(
            VariableDefinition::global(GLOBAL_EMISSIONS)
                .state()
                .with_derivative()
                .with_unit("emissions rate"),
        )?;
        assembly.declare_variable(
            VariableDefinition::global(CUMULATIVE_EMISSIONS)
                .state()
                .with_derivative()
                .with_initial_guess(0.0)
                .with_unit("emissions"),
        )?;
        assembly.declare_variable(
            VariableDefinition::global(TEMPERATURE)
                .state()
                .with_unit("temperature"),
        )?;

        assembly.add_regional(REGIONAL_EMISSIONS, |ctx, t, r| {
            Ok(ctx
                .rvar(REGIONAL_EMISSIONS, t, r)
                .equals((1.0 - ctx.rvar(RELATIVE_ABATEMENT, t, r)) * ctx.baseline(t, r)?)
                .into())
        })?;
        assembly.add_global(GLOBAL_EMISSIONS, |ctx, t| {
            Ok(ctx
                .var(GLOBAL_EMISSIONS, t)
                .equals(ctx.sum_regions(REGIONAL_EMISSIONS, t))
                .into())
        })?;
        assembly.add_global("cumulative_emissions_dynamics", |ctx, t| {
            Ok(ctx
                .dot(CUMULATIVE_EMISSIONS, t)
                .equals(ctx.var(GLOBAL_EMISSIONS, t))
                .into())
        })?;
        assembly.add_global(TEMPERATURE, |ctx, t| {
            Ok(ctx
                .var(TEMPERATURE, t)
                .equals(ctx.param(T0) + ctx.param(TCRE) * ctx.var(CUMULATIVE_EMISSIONS, t))
                .into())
        })?;

        if let Some(budget) = self.parameters.carbon_budget {
            debug!("carbon budget of {budget} from 2100");
            assembly.add_global("carbon_budget", move |ctx, t| {
                if t >= ctx.domain().year2100() {
                    Ok(ctx.var(CUMULATIVE_EMISSIONS, t).at_most(budget).into())
                } else {
                    Ok(Rule::Skip)
                }
            })?;
        }

        if let Some(inertia) = self.parameters.inertia_regional {
            assembly.add_regional("regional_inertia", move |ctx, t, r| {
                Ok(ctx
                    .rdot(REGIONAL_EMISSIONS, t, r)
                    .at_least(inertia * ctx.baseline(0.0, r)?)
                    .into())
            })?;
        }

        if let Some(inertia) = self.parameters.inertia_global {
            assembly.add_global("global_inertia", move |ctx, t| {
                Ok(ctx
                    .dot(GLOBAL_EMISSIONS, t)
                    .at_least(inertia * ctx.global_baseline(0.0)?)
                    .into())
            })?;
        }

        if let Some(min_level) = self.parameters.min_level {
            assembly.add_global("emission_floor", move |ctx, t| {
                Ok(ctx.var(GLOBAL_EMISSIONS, t).at_least(min_level).into())
            })?;
        }

        Ok(())
    }
}
