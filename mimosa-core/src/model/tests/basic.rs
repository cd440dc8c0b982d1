//! Basic model tests: build, instantiate, introspect, serialise components.

use super::flat_scenario;
use crate::component::Component;
use crate::example_components::{TestComponent, TestComponentParameters};
use crate::expression::{ObjectiveSense, Sense};
use crate::model::{IndexSet, ModelBuilder, RegionSet, TimeDomain, VariableKind};
use std::sync::Arc;

fn builder(regions: &[&str]) -> ModelBuilder {
    let mut builder = ModelBuilder::new(
        TimeDomain::new(2015.0, 2100.0).unwrap(),
        RegionSet::new(regions.iter().copied()).unwrap(),
        Arc::new(flat_scenario(regions, 2.0)),
    );
    builder.with_component(Arc::new(TestComponent::from_parameters(
        TestComponentParameters::default(),
    )));
    builder
}

#[test]
fn build() {
    let model = builder(&["A", "B"]).build().unwrap();

    assert_eq!(model.domain().tf(), 85.0);
    assert_eq!(model.regions().len(), 2);
    assert_eq!(
        model.constraint_names(),
        vec!["inflow", "stock_dynamics", "early_cap"]
    );
    assert!(model.has_constraint("early_cap"));
    assert!(!model.has_constraint("carbon_budget"));
    assert_eq!(model.initial_conditions().len(), 2);
    assert_eq!(model.objective().sense, ObjectiveSense::Maximize);
    assert_eq!(
        model.objective().expr.to_string(),
        "stock[85, 0] + stock[85, 1]"
    );

    let stock = model.variable("stock").unwrap();
    assert_eq!(stock.index, IndexSet::TimeRegion);
    assert!(stock.has_derivative);
    assert_eq!(model.variable("share").unwrap().kind, VariableKind::Control);
    assert_eq!(model.differential_states().unwrap(), vec!["stock".to_string()]);
}

#[test]
fn relations_at_skip_conditional_rules() {
    let model = builder(&["A"]).build().unwrap();

    let early = model.relations_at(0.0).unwrap();
    assert_eq!(early.len(), 3);
    assert_eq!(early[0].relation.to_string(), "inflow[0, 0] == share[0, 0] * 2");
    assert_eq!(early[2].constraint, "early_cap");
    assert_eq!(early[2].relation.sense, Sense::Le);

    let late = model.relations_at(50.0).unwrap();
    assert_eq!(late.len(), 2);
    assert!(late.iter().all(|r| r.constraint != "early_cap"));

    assert!(model.relations_at(86.0).is_err());
    assert!(model.relations_at(-1.0).is_err());
}

#[test]
fn summary() {
    let model = builder(&["A", "B"]).build().unwrap();
    let summary = model.summary();

    assert_eq!(summary.n_regions, 2);
    assert_eq!(summary.n_variables, 3);
    assert_eq!(summary.n_controls, 1);
    assert_eq!(summary.n_derivatives, 1);
    assert_eq!(summary.n_parameters, 1);
    assert_eq!(summary.n_global_constraints, 0);
    assert_eq!(summary.n_regional_constraints, 3);
    assert_eq!(summary.n_initial_conditions, 2);

    let serialised = serde_json::to_string(&summary).unwrap();
    let deserialised = serde_json::from_str(&serialised).unwrap();
    assert_eq!(summary, deserialised);
}

#[test]
fn build_is_repeatable() {
    let builder = builder(&["A", "B"]);
    let first = builder.build().unwrap();
    let second = builder.build().unwrap();
    assert_eq!(first.summary(), second.summary());
    assert_eq!(
        first.relations_at(12.5).unwrap(),
        second.relations_at(12.5).unwrap()
    );
}

#[test]
fn parameters_resolve_through_valuation() {
    let model = builder(&["A"]).build().unwrap();
    let relations = model.relations_at(1.0).unwrap();
    let ode = &relations[1].relation;

    let variables = |symbol: &crate::expression::Symbol| match symbol.name() {
        "stock" => Some(2.0),
        "inflow" => Some(0.5),
        _ => None,
    };
    let values = model.valuation(&variables);
    // rhs: -0.1 * 2 + 0.5
    let rhs = ode.rhs.evaluate(&values).unwrap();
    assert!((rhs - 0.3).abs() < 1e-12);
}

#[test]
fn component_serialisation() {
    let component: Arc<dyn Component> = Arc::new(TestComponent::from_parameters(
        TestComponentParameters::default(),
    ));
    let serialised = serde_json::to_string(&component).unwrap();
    assert!(serialised.contains("\"type\":\"TestComponent\""));

    let deserialised: Box<dyn Component> = serde_json::from_str(&serialised).unwrap();
    assert_eq!(format!("{deserialised:?}"), format!("{component:?}"));
}

#[test]
fn model_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<crate::model::Model>();
}
