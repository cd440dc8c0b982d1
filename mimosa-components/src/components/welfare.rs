//! Discounted welfare, the objective and the initial conditions
//!
//! Must be declared last: the initial conditions refer to variables and
//! parameters of every other component.

use crate::variables::*;
use mimosa_core::component::Component;
use mimosa_core::config::ModelConfig;
use mimosa_core::errors::MimosaResult;
use mimosa_core::expression::{Expr, Objective};
use mimosa_core::model::{Assembly, ParameterDefinition, VariableDefinition};
use mimosa_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

/// Parameters for the welfare component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WelfareParameters {
    /// Pure rate of time preference
    /// unit: 1 / yr
    pub prtp: FloatValue,
}

impl WelfareParameters {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self { prtp: config.prtp }
    }
}

/// Net present value of utility
///
/// $$ \frac{dNPV}{dt} = e^{-\rho t} \sum_r U_r $$
///
/// The objective is to maximise $NPV(t_f)$.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelfareComponent {
    parameters: WelfareParameters,
}

impl WelfareComponent {
    pub fn from_parameters(parameters: WelfareParameters) -> Self {
        Self { parameters }
    }
}

#[typetag::serde]
impl Component for WelfareComponent {
    fn declare(&self, assembly: &mut Assembly) -> MimosaResult<()> {
        assembly.declare_parameter(ParameterDefinition::scalar(PRTP, self.parameters.prtp))?;
        assembly.declare_variable(
            VariableDefinition::global(NPV)
                .state()
                .with_derivative()
                .with_initial_guess(0.0),
        )?;

        assembly.add_global("NPV_dynamics", |ctx, t| {
            Ok(ctx
                .dot(NPV, t)
                .equals((-ctx.param(PRTP) * t).exp() * ctx.sum_regions(UTILITY, t))
                .into())
        })?;

        let ctx = assembly.context().clone();
        let mut initial = vec![Expr::var(TEMPERATURE, 0.0, None).equals(ctx.param(T0))];
        for r in ctx.regions().indices() {
            initial.push(Expr::var(REGIONAL_EMISSIONS, 0.0, Some(r)).equals(ctx.baseline(0.0, r)?));
            initial.push(
                Expr::var(CAPITAL_STOCK, 0.0, Some(r)).equals(ctx.rparam(INIT_CAPITALSTOCK, r)),
            );
            initial.push(Expr::var(CARBONPRICE, 0.0, Some(r)).equals(0.0));
        }
        initial.push(Expr::var(GLOBAL_EMISSIONS, 0.0, None).equals(ctx.global_baseline(0.0)?));
        initial.push(Expr::var(CUMULATIVE_EMISSIONS, 0.0, None).equals(0.0));
        initial.push(Expr::var(NPV, 0.0, None).equals(0.0));
        for relation in initial {
            assembly.add_initial_condition(relation)?;
        }

        assembly.set_objective(Objective::maximize(ctx.var(NPV, ctx.domain().tf())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::full_model_with;
    use mimosa_core::expression::ObjectiveSense;

    #[test]
    fn initial_conditions_are_ordered() {
        let model = full_model_with(|config| {
            config.regions.push(mimosa_core::config::RegionConfig {
                name: "B".to_string(),
                initial_capital: 100.0,
                damage_factor: 1.0,
            })
        });
        let initial: Vec<String> = model
            .initial_conditions()
            .iter()
            .map(|r| r.to_string())
            .collect();
        assert_eq!(
            initial,
            vec![
                "temperature[0] == T0",
                "regional_emissions[0, 0] == 4",
                "capital_stock[0, 0] == init_capitalstock[0]",
                "carbonprice[0, 0] == 0",
                "regional_emissions[0, 1] == 4",
                "capital_stock[0, 1] == init_capitalstock[1]",
                "carbonprice[0, 1] == 0",
                "global_emissions[0] == 8",
                "cumulative_emissions[0] == 0",
                "NPV[0] == 0",
            ]
        );
    }

    #[test]
    fn objective_is_final_npv() {
        let model = full_model_with(|_| {});
        assert_eq!(model.objective().sense, ObjectiveSense::Maximize);
        assert_eq!(model.objective().expr.to_string(), "NPV[185]");
    }

    #[test]
    fn discounting() {
        let model = full_model_with(|_| {});
        let relations = model.relations_at(10.0).unwrap();
        let npv = relations
            .iter()
            .find(|r| r.constraint == "NPV_dynamics")
            .unwrap();
        assert_eq!(
            npv.relation.to_string(),
            "dNPV[10]/dt == exp(-PRTP * 10) * utility[10, 0]"
        );
    }
}
