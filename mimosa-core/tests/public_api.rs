//! Builds and integrates a formulation defined outside the crate.

use approx::assert_relative_eq;
use mimosa_core::component::Component;
use mimosa_core::config::{Parameters, DEFAULT_PARAMETERS};
use mimosa_core::errors::{MimosaError, MimosaResult};
use mimosa_core::expression::{Expr, Objective};
use mimosa_core::forward::simulate;
use mimosa_core::model::{
    Assembly, ModelBuilder, ParameterDefinition, RegionSet, TimeDomain, VariableDefinition,
};
use mimosa_core::timeseries::Timeseries;
use mimosa_core::trajectories::{ScenarioData, Series};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// A single global stock growing at a rate reduced by the mean control:
/// dx/dt = g (1 - mean_r u_r) x
#[derive(Debug, Serialize, Deserialize)]
struct Growth {
    rate: f64,
    initial: f64,
}

#[typetag::serde]
impl Component for Growth {
    fn declare(&self, assembly: &mut Assembly) -> MimosaResult<()> {
        assembly.declare_parameter(ParameterDefinition::scalar("g", self.rate))?;
        assembly.declare_variable(
            VariableDefinition::regional("u")
                .control()
                .with_bounds(Some(0.0), Some(1.0)),
        )?;
        assembly.declare_variable(VariableDefinition::global("mean_u"))?;
        assembly.declare_variable(VariableDefinition::global("x").state().with_derivative())?;

        assembly.add_global("mean_u", |ctx, t| {
            let n = ctx.regions().len() as f64;
            Ok(ctx
                .var("mean_u", t)
                .equals(ctx.sum_regions("u", t) / n)
                .into())
        })?;
        assembly.add_global("x_dynamics", |ctx, t| {
            Ok(ctx
                .dot("x", t)
                .equals(ctx.param("g") * (1.0 - ctx.var("mean_u", t)) * ctx.var("x", t))
                .into())
        })?;
        assembly.add_initial_condition(Expr::var("x", 0.0, None).equals(self.initial))?;

        let tf = assembly.context().domain().tf();
        assembly.set_objective(Objective::maximize(assembly.context().var("x", tf)))
    }
}

fn scenario(regions: &[&str]) -> ScenarioData {
    let years = vec![2000.0, 2100.0];
    let mut data = ScenarioData::new();
    for region in regions {
        for series in Series::ALL {
            data.with_series(
                region,
                series,
                Timeseries::from_values(years.clone(), vec![1.0, 1.0], "1").unwrap(),
            );
        }
    }
    data
}

fn builder(component: Growth) -> ModelBuilder {
    let mut builder = ModelBuilder::new(
        TimeDomain::new(2000.0, 2050.0).unwrap(),
        RegionSet::new(["north", "south"]).unwrap(),
        Arc::new(scenario(&["north", "south"])),
    );
    builder.with_component(Arc::new(component));
    builder
}

#[test]
fn growth_matches_the_exponential() {
    let model = builder(Growth {
        rate: 0.02,
        initial: 5.0,
    })
    .build()
    .unwrap();
    assert_eq!(model.constraint_names(), vec!["mean_u", "x_dynamics"]);

    // Mean control of 0.5 halves the growth rate
    let policy = |_: f64, r: usize| if r == 0 { 0.0 } else { 1.0 };
    let trajectories = simulate(&model, &policy, 0.5).unwrap();

    assert_eq!(trajectories.len(), 101);
    for (i, t) in trajectories.times().iter().enumerate() {
        assert_relative_eq!(
            trajectories.get("x", None).unwrap()[i],
            5.0 * (0.01 * t).exp(),
            max_relative = 1e-9
        );
    }
    assert_relative_eq!(trajectories.objective(), 5.0 * 0.5_f64.exp(), max_relative = 1e-9);
}

#[test]
fn scenario_must_span_the_domain() {
    let mut builder = ModelBuilder::new(
        TimeDomain::new(2000.0, 2150.0).unwrap(),
        RegionSet::new(["north"]).unwrap(),
        Arc::new(scenario(&["north"])),
    );
    builder.with_component(Arc::new(Growth {
        rate: 0.02,
        initial: 1.0,
    }));
    assert!(matches!(
        builder.build(),
        Err(MimosaError::ExtrapolationNotAllowed { .. })
    ));
}

#[test]
fn shipped_configuration_file() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/default.toml");
    let from_file = Parameters::from_file(&path).unwrap();
    assert_eq!(from_file, Parameters::from_toml_str(DEFAULT_PARAMETERS).unwrap());

    let config = from_file.validate().unwrap();
    assert_eq!(config.region_names(), vec!["WORLD"]);
    assert_relative_eq!(config.carbon_budget.unwrap(), 1000.0);
    // 0.62 K per 1000 GtCO2
    assert_relative_eq!(config.tcre, 0.00062, max_relative = 1e-12);
    // 2601.7 USD/tCO2 in trillion USD per GtCO2
    assert_relative_eq!(config.mac_gamma, 2.6017, max_relative = 1e-12);
    assert_eq!(config.time_domain().unwrap().tf(), 185.0);
}
