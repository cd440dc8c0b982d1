//! Shared fixtures for the component tests.

use crate::standard_components;
use mimosa_core::component::Component;
use mimosa_core::config::{ModelConfig, Parameters};
use mimosa_core::errors::MimosaResult;
use mimosa_core::expression::{Expr, Objective};
use mimosa_core::model::{Assembly, Model, ModelBuilder, RegionSet, TimeDomain};
use mimosa_core::timeseries::Timeseries;
use mimosa_core::trajectories::{ScenarioData, Series};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Constant scenario over 2015-2200: population 1, GDP 10, TFP 1 and the given
/// baseline emissions in every region.
pub fn flat_scenario(regions: &[&str], baseline: f64) -> ScenarioData {
    let years: Vec<f64> = (2015..=2200).map(f64::from).collect();
    let constant = |value: f64, units: &str| {
        Timeseries::from_values(years.clone(), vec![value; years.len()], units).unwrap()
    };

    let mut data = ScenarioData::new();
    for region in regions {
        data.with_series(region, Series::Baseline, constant(baseline, "GtCO2/yr"))
            .with_series(region, Series::Population, constant(1.0, "billion"))
            .with_series(region, Series::Gdp, constant(10.0, "trillion USD/yr"))
            .with_series(region, Series::Tfp, constant(1.0, "1"));
    }
    data
}

/// Builds a model over 2015-2100 from an explicit list of components.
pub fn build(
    components: Vec<Arc<dyn Component>>,
    regions: &[&str],
    scenario: ScenarioData,
) -> MimosaResult<Model> {
    let mut builder = ModelBuilder::new(
        TimeDomain::new(2015.0, 2100.0)?,
        RegionSet::new(regions.iter().copied())?,
        Arc::new(scenario),
    );
    for component in components {
        builder.with_component(component);
    }
    builder.build()
}

/// The standard formulation over 2015-2200 with a single WORLD region,
/// after applying `f` to the default configuration.
pub fn full_model_with(f: impl FnOnce(&mut ModelConfig)) -> Model {
    let mut config = Parameters::default().validate().unwrap();
    f(&mut config);

    let names = config.region_names();
    let regions: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut builder = ModelBuilder::new(
        config.time_domain().unwrap(),
        config.region_set().unwrap(),
        Arc::new(flat_scenario(&regions, 4.0)),
    );
    for component in standard_components(&config) {
        builder.with_component(component);
    }
    builder.build().unwrap()
}

/// Closes a partial formulation: fixes the named variables to zero at t = 0
/// and sets a constant objective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boundary {
    zero: Vec<String>,
}

impl Boundary {
    pub fn zero(names: &[&str]) -> Self {
        Self {
            zero: names.iter().map(|n| n.to_string()).collect(),
        }
    }
}

#[typetag::serde]
impl Component for Boundary {
    fn declare(&self, assembly: &mut Assembly) -> MimosaResult<()> {
        let regions = assembly.context().regions().clone();
        for name in &self.zero {
            let regional = assembly
                .context()
                .registry()
                .variable(name)
                .is_some_and(|v| v.is_regional());
            if regional {
                for r in regions.indices() {
                    assembly.add_initial_condition(Expr::var(name, 0.0, Some(r)).equals(0.0))?;
                }
            } else {
                assembly.add_initial_condition(Expr::var(name, 0.0, None).equals(0.0))?;
            }
        }
        assembly.set_objective(Objective::maximize(Expr::constant(0.0)))
    }
}
