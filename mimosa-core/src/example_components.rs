//! A small formulation used to exercise the core machinery in tests.
//!
//! Each region holds a `stock` that decays at a fixed rate and is topped up by
//! an algebraic `inflow`, a fraction `share` of the region's baseline series.
//! The objective maximises the total stock at the end of the horizon.

use crate::component::Component;
use crate::errors::MimosaResult;
use crate::expression::{Expr, Objective};
use crate::model::{Assembly, ParameterDefinition, Rule, VariableDefinition};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestComponentParameters {
    /// Continuous decay rate of the stock
    /// unit: 1 / yr
    pub decay: f64,
    /// Initial stock in every region
    pub initial: f64,
    /// Include an initial condition for the stock
    pub with_initial_condition: bool,
}

impl Default for TestComponentParameters {
    fn default() -> Self {
        Self {
            decay: 0.1,
            initial: 1.0,
            with_initial_condition: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestComponent {
    parameters: TestComponentParameters,
}

impl TestComponent {
    pub fn from_parameters(parameters: TestComponentParameters) -> Self {
        Self { parameters }
    }
}

#[typetag::serde]
impl Component for TestComponent {
    fn declare(&self, assembly: &mut Assembly) -> MimosaResult<()> {
        assembly.declare_parameter(ParameterDefinition::scalar("decay", self.parameters.decay))?;
        assembly.declare_variable(
            VariableDefinition::regional("share")
                .control()
                .with_bounds(Some(0.0), Some(1.0))
                .with_initial_guess(0.0),
        )?;
        assembly.declare_variable(VariableDefinition::regional("inflow"))?;
        assembly.declare_variable(
            VariableDefinition::regional("stock")
                .state()
                .with_derivative(),
        )?;

        assembly.add_regional("inflow", |ctx, t, r| {
            Ok(ctx
                .rvar("inflow", t, r)
                .equals(ctx.rvar("share", t, r) * ctx.baseline(t, r)?)
                .into())
        })?;
        assembly.add_regional("stock_dynamics", |ctx, t, r| {
            Ok(ctx
                .rdot("stock", t, r)
                .equals(-ctx.param("decay") * ctx.rvar("stock", t, r) + ctx.rvar("inflow", t, r))
                .into())
        })?;
        assembly.add_regional("early_cap", |ctx, t, r| {
            if t < 10.0 {
                Ok(ctx.rvar("stock", t, r).at_most(100.0).into())
            } else {
                Ok(Rule::Skip)
            }
        })?;

        if self.parameters.with_initial_condition {
            for r in assembly.context().regions().indices() {
                assembly.add_initial_condition(
                    Expr::var("stock", 0.0, Some(r)).equals(self.parameters.initial),
                )?;
            }
        }

        let tf = assembly.context().domain().tf();
        let total = assembly.context().sum_regions("stock", tf);
        assembly.set_objective(Objective::maximize(total))
    }
}
