//! The standard MIMOSA formulation

use crate::components::*;
use log::info;
use mimosa_core::component::Component;
use mimosa_core::config::{ModelConfig, Parameters};
use mimosa_core::errors::MimosaResult;
use mimosa_core::model::{Model, ModelBuilder};
use mimosa_core::trajectories::{InternalUnits, TrajectoryProvider};
use std::sync::Arc;

/// Components of the standard formulation, in declaration order.
///
/// Welfare comes last as its initial conditions refer to variables declared by
/// every other component.
pub fn standard_components(config: &ModelConfig) -> Vec<Arc<dyn Component>> {
    vec![
        Arc::new(ClimateComponent::from_parameters(
            ClimateParameters::from_config(config),
        )),
        Arc::new(LearningComponent::from_parameters(
            LearningParameters::from_config(config),
        )),
        Arc::new(CostComponent::from_parameters(CostParameters::from_config(
            config,
        ))),
        Arc::new(EconomyComponent::from_parameters(
            EconomyParameters::from_config(config),
        )),
        Arc::new(WelfareComponent::from_parameters(
            WelfareParameters::from_config(config),
        )),
    ]
}

/// Validates `parameters` and builds the standard formulation over the
/// scenario data in `provider`, converted into the configured unit system.
pub fn build_model(
    parameters: &Parameters,
    provider: Arc<dyn TrajectoryProvider>,
) -> MimosaResult<Model> {
    let config = parameters.validate()?;
    info!(
        "Building {} model for {} region(s), {}-{}",
        config.ssp,
        config.regions.len(),
        config.begin_year,
        config.end_year
    );

    let provider = InternalUnits::new(provider, &config.region_names(), &config.units)?;
    let mut builder =
        ModelBuilder::new(config.time_domain()?, config.region_set()?, Arc::new(provider));
    for component in standard_components(&config) {
        builder.with_component(component);
    }
    builder.build()
}
