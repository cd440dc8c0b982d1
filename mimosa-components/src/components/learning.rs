//! Technological learning
//!
//! Abatement becomes cheaper as emissions are abated (learning by doing) and
//! over time (learning over time). The learning factor multiplies the
//! marginal abatement cost curve.

use crate::economics::lbd_fct;
use crate::variables::*;
use mimosa_core::component::Component;
use mimosa_core::config::ModelConfig;
use mimosa_core::errors::MimosaResult;
use mimosa_core::model::{Assembly, ParameterDefinition, VariableDefinition};
use mimosa_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

/// Parameters for the learning component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningParameters {
    /// Progress ratio: the cost multiplier for each doubling of abated
    /// emissions (relative to the scaling)
    pub lbd_rate: FloatValue,
    /// Abated emissions over which learning by doing is measured
    /// unit: emissions
    pub lbd_scaling: FloatValue,
    /// Annual cost reduction from learning over time
    pub lot_rate: FloatValue,
}

impl LearningParameters {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            lbd_rate: config.lbd_rate,
            lbd_scaling: config.lbd_scaling,
            lot_rate: config.lot_rate,
        }
    }
}

/// Learning-by-doing and learning-over-time multipliers
///
/// $$ LBD(t) = \left(\frac{\sum_r CE^{base}_r(t) - CE(t)}{S} + 1\right)^{\log_2 \rho} $$
/// $$ LOT(t) = (1 + \ell)^{-t}, \quad f(t) = LBD(t) \cdot LOT(t) $$
///
/// where $CE^{base}_r$ is cumulative baseline emissions of region $r$, so the
/// numerator is the total abated so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningComponent {
    parameters: LearningParameters,
}

impl LearningComponent {
    pub fn from_parameters(parameters: LearningParameters) -> Self {
        Self { parameters }
    }
}

#[typetag::serde]
impl Component for LearningComponent {
    fn declare(&self, assembly: &mut Assembly) -> MimosaResult<()> {
        let p = &self.parameters;
        assembly.declare_parameter(ParameterDefinition::scalar(LBD_RATE, p.lbd_rate))?;
        assembly.declare_parameter(ParameterDefinition::scalar(
            LOG_LBD_RATE,
            p.lbd_rate.log2(),
        ))?;
        assembly.declare_parameter(
            ParameterDefinition::scalar(LBD_SCALING, p.lbd_scaling).with_unit("emissions"),
        )?;
        assembly.declare_parameter(ParameterDefinition::scalar(LOT_RATE, p.lot_rate))?;

        for name in [LBD_FACTOR, LOT_FACTOR, LEARNING_FACTOR] {
            assembly.declare_variable(VariableDefinition::global(name).with_initial_guess(1.0))?;
        }

        assembly.add_global(LBD_FACTOR, |ctx, t| {
            let cumulative_baseline = ctx
                .regions()
                .indices()
                .map(|r| ctx.cumulative_baseline(t, r))
                .sum::<MimosaResult<FloatValue>>()?;
            let abated = cumulative_baseline - ctx.var(CUMULATIVE_EMISSIONS, t);
            Ok(ctx
                .var(LBD_FACTOR, t)
                .equals(lbd_fct(abated, ctx.param(LBD_SCALING), ctx.param(LOG_LBD_RATE)))
                .into())
        })?;
        assembly.add_global(LOT_FACTOR, |ctx, t| {
            Ok(ctx
                .var(LOT_FACTOR, t)
                .equals(1.0 / (1.0 + ctx.param(LOT_RATE)).pow(t))
                .into())
        })?;
        assembly.add_global(LEARNING_FACTOR, |ctx, t| {
            Ok(ctx
                .var(LEARNING_FACTOR, t)
                .equals(ctx.var(LBD_FACTOR, t) * ctx.var(LOT_FACTOR, t))
                .into())
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{ClimateComponent, ClimateParameters};
    use crate::test_utils::{build, flat_scenario, Boundary};
    use approx::assert_relative_eq;
    use mimosa_core::forward::simulate;
    use std::sync::Arc;

    fn parameters() -> LearningParameters {
        LearningParameters {
            lbd_rate: 0.82,
            lbd_scaling: 40.0,
            lot_rate: 0.0,
        }
    }

    fn climate() -> Arc<ClimateComponent> {
        Arc::new(ClimateComponent::from_parameters(ClimateParameters {
            t0: 1.0,
            tcre: 0.00062,
            carbon_budget: None,
            inertia_regional: None,
            inertia_global: None,
            min_level: None,
        }))
    }

    #[test]
    fn learning_factor_starts_at_one() {
        let model = build(
            vec![
                climate(),
                Arc::new(LearningComponent::from_parameters(parameters())),
                Arc::new(Boundary::zero(&[CUMULATIVE_EMISSIONS])),
            ],
            &["A"],
            flat_scenario(&["A"], 4.0),
        )
        .unwrap();

        let trajectories = simulate(&model, &|_, _| 0.0, 1.0).unwrap();
        assert_relative_eq!(trajectories.get(LEARNING_FACTOR, None).unwrap()[0], 1.0);
        // Nothing abated: cumulative emissions track cumulative baseline
        for value in trajectories.get(LBD_FACTOR, None).unwrap() {
            assert_relative_eq!(*value, 1.0, max_relative = 1e-9);
        }
    }

    #[test]
    fn abatement_lowers_costs() {
        let lot = LearningParameters {
            lot_rate: 0.01,
            ..parameters()
        };
        let model = build(
            vec![
                climate(),
                Arc::new(LearningComponent::from_parameters(lot)),
                Arc::new(Boundary::zero(&[CUMULATIVE_EMISSIONS])),
            ],
            &["A"],
            flat_scenario(&["A"], 4.0),
        )
        .unwrap();

        // Half of 4 GtCO2/yr abated for 85 years: 170 GtCO2
        let trajectories = simulate(&model, &|_, _| 0.5, 1.0).unwrap();
        let lbd = *trajectories.get(LBD_FACTOR, None).unwrap().last().unwrap();
        assert_relative_eq!(lbd, (170.0_f64 / 40.0 + 1.0).powf(0.82_f64.log2()), max_relative = 1e-9);

        let lot_factor = *trajectories.get(LOT_FACTOR, None).unwrap().last().unwrap();
        assert_relative_eq!(lot_factor, 1.01_f64.powf(-85.0), max_relative = 1e-12);

        let learning = *trajectories.get(LEARNING_FACTOR, None).unwrap().last().unwrap();
        assert_relative_eq!(learning, lbd * lot_factor, max_relative = 1e-12);
    }
}
