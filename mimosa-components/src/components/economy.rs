//! Regional economic growth
//!
//! Cobb-Douglas production from population and capital, reduced by damages
//! and abatement costs. A fixed share of net output is invested and the rest
//! consumed; investment accumulates into the capital stock.

use crate::economics::{calc_gdp, utility};
use crate::variables::*;
use log::debug;
use mimosa_core::component::Component;
use mimosa_core::config::ModelConfig;
use mimosa_core::errors::MimosaResult;
use mimosa_core::expression::Expr;
use mimosa_core::model::{Assembly, ParameterDefinition, VariableDefinition};
use mimosa_core::timeseries::FloatValue;
use mimosa_core::trajectories::Series;
use serde::{Deserialize, Serialize};

/// Parameters for the economy component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyParameters {
    /// Capital share of output
    pub alpha: FloatValue,
    /// Fraction of capital lost per year
    pub dk: FloatValue,
    /// Savings rate
    pub sr: FloatValue,
    /// Elasticity of marginal utility of consumption
    pub elasmu: FloatValue,
    /// Capital stock at the start of the run, one per region
    /// unit: currency
    pub init_capitalstock: Vec<FloatValue>,
}

impl EconomyParameters {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            alpha: config.alpha,
            dk: config.dk,
            sr: config.sr,
            elasmu: config.elasmu,
            init_capitalstock: config.regions.iter().map(|r| r.initial_capital).collect(),
        }
    }
}

/// Output, consumption, utility and capital accumulation
///
/// $$ Y_r = A_r L_r^{1 - \alpha} K_r^\alpha, \quad Y^{net}_r = Y_r (1 - D_r) - AC_r $$
/// $$ I_r = s Y^{net}_r, \quad C_r = (1 - s) Y^{net}_r $$
/// $$ \frac{dK_r}{dt} = \ln(1 - \delta) K_r + I_r $$
///
/// `ln(1 - dk)` is the continuous-time rate equivalent to losing a fraction
/// `dk` of the capital stock each year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomyComponent {
    parameters: EconomyParameters,
}

impl EconomyComponent {
    pub fn from_parameters(parameters: EconomyParameters) -> Self {
        Self { parameters }
    }
}

#[typetag::serde]
impl Component for EconomyComponent {
    fn declare(&self, assembly: &mut Assembly) -> MimosaResult<()> {
        let p = &self.parameters;
        assembly.declare_parameter(ParameterDefinition::scalar(ALPHA, p.alpha))?;
        assembly.declare_parameter(ParameterDefinition::scalar(DK, p.dk))?;
        assembly.declare_parameter(ParameterDefinition::scalar(SR, p.sr))?;
        assembly.declare_parameter(ParameterDefinition::scalar(ELASMU, p.elasmu))?;
        assembly.declare_parameter(
            ParameterDefinition::regional(INIT_CAPITALSTOCK, p.init_capitalstock.clone())
                .with_unit("currency"),
        )?;

        // Initial guesses taken from the first region
        let initial_capital = p.init_capitalstock.first().copied().unwrap_or(0.0);
        let initial_consumption = (1.0 - p.sr) * assembly.context().lookup(0.0, 0, Series::Gdp)?;

        assembly.declare_variable(
            VariableDefinition::regional(CAPITAL_STOCK)
                .state()
                .with_derivative()
                .with_initial_guess(initial_capital)
                .with_unit("currency"),
        )?;
        for name in [GDP_GROSS, GDP_NET, INVESTMENTS] {
            assembly.declare_variable(VariableDefinition::regional(name).with_unit("currency rate"))?;
        }
        assembly.declare_variable(
            VariableDefinition::regional(CONSUMPTION)
                .with_initial_guess(initial_consumption)
                .with_unit("currency rate"),
        )?;
        assembly.declare_variable(VariableDefinition::regional(UTILITY))?;

        assembly.add_regional(GDP_GROSS, |ctx, t, r| {
            let gdp = calc_gdp(
                Expr::constant(ctx.lookup(t, r, Series::Tfp)?),
                Expr::constant(ctx.lookup(t, r, Series::Population)?),
                ctx.rvar(CAPITAL_STOCK, t, r),
                ctx.param(ALPHA),
            );
            Ok(ctx.rvar(GDP_GROSS, t, r).equals(gdp).into())
        })?;
        assembly.add_regional(GDP_NET, |ctx, t, r| {
            Ok(ctx
                .rvar(GDP_NET, t, r)
                .equals(
                    ctx.rvar(GDP_GROSS, t, r) * (1.0 - ctx.rvar(DAMAGE_COSTS, t, r))
                        - ctx.rvar(ABATEMENT_COSTS, t, r),
                )
                .into())
        })?;
        assembly.add_regional(INVESTMENTS, |ctx, t, r| {
            Ok(ctx
                .rvar(INVESTMENTS, t, r)
                .equals(ctx.param(SR) * ctx.rvar(GDP_NET, t, r))
                .into())
        })?;
        assembly.add_regional(CONSUMPTION, |ctx, t, r| {
            Ok(ctx
                .rvar(CONSUMPTION, t, r)
                .equals((1.0 - ctx.param(SR)) * ctx.rvar(GDP_NET, t, r))
                .into())
        })?;

        let elasmu = p.elasmu;
        if (elasmu - 1.0).abs() < crate::economics::LOG_UTILITY_TOLERANCE {
            debug!("elasmu = {elasmu}: using logarithmic utility");
        }
        assembly.add_regional(UTILITY, move |ctx, t, r| {
            let population = ctx.lookup(t, r, Series::Population)?;
            Ok(ctx
                .rvar(UTILITY, t, r)
                .equals(utility(
                    ctx.rvar(CONSUMPTION, t, r),
                    Expr::constant(population),
                    ctx.param(ELASMU),
                    elasmu,
                ))
                .into())
        })?;
        assembly.add_regional("capital_stock_dynamics", |ctx, t, r| {
            Ok(ctx
                .rdot(CAPITAL_STOCK, t, r)
                .equals(
                    (1.0 - ctx.param(DK)).ln() * ctx.rvar(CAPITAL_STOCK, t, r)
                        + ctx.rvar(INVESTMENTS, t, r),
                )
                .into())
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{build, flat_scenario, Boundary};
    use mimosa_core::errors::MimosaError;
    use std::sync::Arc;

    fn parameters(elasmu: f64) -> EconomyParameters {
        EconomyParameters {
            alpha: 0.3,
            dk: 0.1,
            sr: 0.2,
            elasmu,
            init_capitalstock: vec![223.0],
        }
    }

    #[test]
    fn economy_needs_cost_variables() {
        // GDP_net refers to damage and abatement costs declared elsewhere
        let components: Vec<Arc<dyn Component>> = vec![
            Arc::new(EconomyComponent::from_parameters(parameters(1.001))),
            Arc::new(Boundary::zero(&[CAPITAL_STOCK])),
        ];
        assert!(matches!(
            build(components, &["A"], flat_scenario(&["A"], 4.0)),
            Err(MimosaError::UnknownVariable(name)) if name == DAMAGE_COSTS
        ));
    }

    #[test]
    fn utility_form_is_chosen_at_assembly() {
        let isoelastic = crate::test_utils::full_model_with(|config| config.elasmu = 1.5);
        let utility = isoelastic.relations_at(0.0).unwrap();
        let utility = utility.iter().find(|r| r.constraint == UTILITY).unwrap();
        assert!(!utility.relation.to_string().contains("ln("));

        let log = crate::test_utils::full_model_with(|config| config.elasmu = 1.0);
        let utility = log.relations_at(0.0).unwrap();
        let utility = utility.iter().find(|r| r.constraint == UTILITY).unwrap();
        assert_eq!(
            utility.relation.to_string(),
            "utility[0, 0] == 1 * ln(consumption[0, 0] / 1)"
        );
    }

    #[test]
    fn depreciation_is_continuous() {
        let model = crate::test_utils::full_model_with(|_| {});
        let relations = model.relations_at(5.0).unwrap();
        let dynamics = relations
            .iter()
            .find(|r| r.constraint == "capital_stock_dynamics")
            .unwrap();
        assert_eq!(
            dynamics.relation.to_string(),
            "dcapital_stock[5, 0]/dt == ln(1 - dk) * capital_stock[5, 0] + investments[5, 0]"
        );
    }
}
