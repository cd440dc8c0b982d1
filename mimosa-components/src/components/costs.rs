//! Damage costs, abatement costs and the carbon price

use crate::economics::{ac, damage_fct, mac};
use crate::variables::*;
use mimosa_core::component::Component;
use mimosa_core::config::ModelConfig;
use mimosa_core::errors::MimosaResult;
use mimosa_core::model::{Assembly, ParameterDefinition, VariableDefinition};
use mimosa_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

/// Parameters for the cost component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostParameters {
    /// Quadratic damage coefficient
    /// unit: 1 / temperature^2
    pub damage_coeff: FloatValue,
    /// Regional multiplier on damages, one per region
    pub damage_factor: Vec<FloatValue>,
    /// Carbon price at full abatement without learning
    /// unit: currency rate / emissions rate
    pub mac_gamma: FloatValue,
    /// Exponent of the marginal abatement cost curve
    pub mac_beta: FloatValue,
}

impl CostParameters {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            damage_coeff: config.damage_coeff,
            damage_factor: config.regions.iter().map(|r| r.damage_factor).collect(),
            mac_gamma: config.mac_gamma,
            mac_beta: config.mac_beta,
        }
    }
}

/// Costs of climate change and of abating it
///
/// Damages are a fraction of gross output, abatement costs are in currency
/// and scale with baseline emissions:
///
/// $$ D_r = d_r (c T^2 - c T_0^2) $$
/// $$ AC_r = \frac{\gamma f a_r^{\beta + 1}}{\beta + 1} E^{base}_r, \quad p_r = \gamma f a_r^\beta $$
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostComponent {
    parameters: CostParameters,
}

impl CostComponent {
    pub fn from_parameters(parameters: CostParameters) -> Self {
        Self { parameters }
    }
}

#[typetag::serde]
impl Component for CostComponent {
    fn declare(&self, assembly: &mut Assembly) -> MimosaResult<()> {
        let p = &self.parameters;
        assembly.declare_parameter(ParameterDefinition::regional(
            DAMAGE_FACTOR,
            p.damage_factor.clone(),
        ))?;
        assembly.declare_parameter(ParameterDefinition::scalar(DAMAGE_COEFF, p.damage_coeff))?;
        assembly.declare_parameter(
            ParameterDefinition::scalar(MAC_GAMMA, p.mac_gamma)
                .with_unit("currency rate / emissions rate"),
        )?;
        assembly.declare_parameter(ParameterDefinition::scalar(MAC_BETA, p.mac_beta))?;

        assembly.declare_variable(
            VariableDefinition::regional(DAMAGE_COSTS).described("Fraction of gross output lost"),
        )?;
        assembly.declare_variable(
            VariableDefinition::regional(ABATEMENT_COSTS).with_unit("currency rate"),
        )?;
        assembly.declare_variable(
            VariableDefinition::regional(CARBONPRICE)
                .with_initial_guess(0.0)
                .with_unit("currency rate / emissions rate"),
        )?;

        assembly.add_regional(DAMAGE_COSTS, |ctx, t, r| {
            Ok(ctx
                .rvar(DAMAGE_COSTS, t, r)
                .equals(
                    ctx.rparam(DAMAGE_FACTOR, r)
                        * damage_fct(ctx.var(TEMPERATURE, t), ctx.param(DAMAGE_COEFF), ctx.param(T0)),
                )
                .into())
        })?;
        assembly.add_regional(ABATEMENT_COSTS, |ctx, t, r| {
            let cost = ac(
                ctx.rvar(RELATIVE_ABATEMENT, t, r),
                ctx.var(LEARNING_FACTOR, t),
                ctx.param(MAC_GAMMA),
                ctx.param(MAC_BETA),
            );
            Ok(ctx
                .rvar(ABATEMENT_COSTS, t, r)
                .equals(cost * ctx.baseline(t, r)?)
                .into())
        })?;
        assembly.add_regional(CARBONPRICE, |ctx, t, r| {
            Ok(ctx
                .rvar(CARBONPRICE, t, r)
                .equals(mac(
                    ctx.rvar(RELATIVE_ABATEMENT, t, r),
                    ctx.var(LEARNING_FACTOR, t),
                    ctx.param(MAC_GAMMA),
                    ctx.param(MAC_BETA),
                ))
                .into())
        })?;

        Ok(())
    }
}
