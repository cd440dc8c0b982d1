//! Structural checks performed when a model is sealed.

use super::runtime::Model;
use crate::errors::{MimosaError, MimosaResult};
use crate::timeseries::Time;
use log::debug;
use std::collections::HashMap;

/// Time points at which every rule is instantiated for checking.
///
/// Rules may switch on part-way through the domain (the carbon budget only
/// applies from 2100), so the end points alone are not enough.
fn probe_times(model: &Model) -> Vec<Time> {
    let domain = model.domain();
    let mut times = vec![0.0, domain.tf()];
    if domain.contains(domain.year2100()) {
        times.push(domain.year2100());
    }
    times
}

/// Checks that the sealed model is well-formed:
///
/// - every symbol refers to a declared variable or parameter with matching
///   indices, and derivatives are only taken of variables that carry one
/// - no derivative is defined by more than one differential equation
/// - every differential state has exactly one initial condition per index
pub(crate) fn validate(model: &Model) -> MimosaResult<()> {
    let registry = model.context().registry();

    for t in probe_times(model) {
        let relations = model.relations_at(t)?;

        let mut defined: HashMap<(String, Option<usize>), usize> = HashMap::new();
        for instance in &relations {
            for symbol in instance.relation.symbols() {
                registry.check_symbol(symbol)?;
            }
            if let Some(derivative) = instance.relation.defined_derivative() {
                let count = defined
                    .entry((derivative.name.clone(), derivative.region))
                    .or_insert(0);
                *count += 1;
                if *count > 1 {
                    return Err(MimosaError::DuplicateDifferentialEquation(
                        derivative.name.clone(),
                    ));
                }
            }
        }
        debug!(
            "t={t}: {} relations, {} differential equations",
            relations.len(),
            defined.len()
        );
    }

    for relation in model.initial_conditions() {
        for symbol in relation.symbols() {
            registry.check_symbol(symbol)?;
        }
    }
    for symbol in model.objective().expr.symbols() {
        registry.check_symbol(symbol)?;
    }

    check_initial_conditions(model)
}

fn check_initial_conditions(model: &Model) -> MimosaResult<()> {
    let mut counts: HashMap<(String, Option<usize>), usize> = HashMap::new();
    for relation in model.initial_conditions() {
        if let Some(v) = relation.defined_variable() {
            *counts.entry((v.name.clone(), v.region)).or_insert(0) += 1;
        }
    }

    for state in model.differential_states()? {
        let regions: Vec<Option<usize>> = match model.variable(&state) {
            Some(definition) if definition.is_regional() => {
                model.regions().indices().map(Some).collect()
            }
            _ => vec![None],
        };
        for region in regions {
            let count = counts.get(&(state.clone(), region)).copied().unwrap_or(0);
            if count != 1 {
                let variable = match region {
                    Some(r) => format!("{state}[{}]", model.regions().name(r)?),
                    None => state.clone(),
                };
                return Err(MimosaError::InitialConditionCount { variable, count });
            }
        }
    }
    Ok(())
}
