//! The sealed, immutable model formulation.

use super::constraint::IndexedConstraint;
use super::context::ModelContext;
use super::domain::{RegionSet, TimeDomain};
use super::registry::{IndexSet, ParameterDefinition, VariableDefinition, VariableKind};
use crate::errors::{MimosaError, MimosaResult};
use crate::expression::{Objective, Relation, Symbol};
use crate::timeseries::Time;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One constraint instantiated at a concrete index.
#[derive(Debug, Clone, PartialEq)]
pub struct InstantiatedRelation {
    pub constraint: String,
    pub time: Time,
    pub region: Option<usize>,
    pub relation: Relation,
}

/// Counts describing the size of a formulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub n_regions: usize,
    pub n_variables: usize,
    pub n_controls: usize,
    pub n_derivatives: usize,
    pub n_parameters: usize,
    pub n_global_constraints: usize,
    pub n_regional_constraints: usize,
    pub n_initial_conditions: usize,
    pub constraint_names: Vec<String>,
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} regions, {} variables ({} controls, {} derivatives), {} parameters, \
             {} global and {} regional constraints, {} initial conditions",
            self.n_regions,
            self.n_variables,
            self.n_controls,
            self.n_derivatives,
            self.n_parameters,
            self.n_global_constraints,
            self.n_regional_constraints,
            self.n_initial_conditions
        )
    }
}

/// A continuous-time optimal control problem ready for discretisation.
///
/// The model exposes its index sets, the declared variables and parameters,
/// the constraints (instantiable at any time point in the domain), the
/// ordered initial conditions and the objective. It holds no mutable state
/// and can be shared between threads.
#[derive(Debug, Clone)]
pub struct Model {
    context: ModelContext,
    constraints: Vec<IndexedConstraint>,
    initial_conditions: Vec<Relation>,
    objective: Objective,
}

impl Model {
    pub(crate) fn new(
        context: ModelContext,
        constraints: Vec<IndexedConstraint>,
        initial_conditions: Vec<Relation>,
        objective: Objective,
    ) -> Self {
        Self {
            context,
            constraints,
            initial_conditions,
            objective,
        }
    }

    pub fn context(&self) -> &ModelContext {
        &self.context
    }

    pub fn domain(&self) -> &TimeDomain {
        self.context.domain()
    }

    pub fn regions(&self) -> &RegionSet {
        self.context.regions()
    }

    pub fn variables(&self) -> &[VariableDefinition] {
        self.context.registry().variables()
    }

    pub fn parameters(&self) -> &[ParameterDefinition] {
        self.context.registry().parameters()
    }

    pub fn variable(&self, name: &str) -> Option<&VariableDefinition> {
        self.context.registry().variable(name)
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterDefinition> {
        self.context.registry().parameter(name)
    }

    pub fn parameter_value(&self, name: &str, region: Option<usize>) -> MimosaResult<f64> {
        self.context.registry().parameter_value(name, region)
    }

    pub fn constraints(&self) -> &[IndexedConstraint] {
        &self.constraints
    }

    pub fn constraint(&self, name: &str) -> Option<&IndexedConstraint> {
        self.constraints.iter().find(|c| c.name() == name)
    }

    pub fn constraint_names(&self) -> Vec<&str> {
        self.constraints.iter().map(|c| c.name()).collect()
    }

    pub fn has_constraint(&self, name: &str) -> bool {
        self.constraint(name).is_some()
    }

    pub fn initial_conditions(&self) -> &[Relation] {
        &self.initial_conditions
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    /// Every constraint instantiated at time `t`, in sealed order.
    pub fn relations_at(&self, t: Time) -> MimosaResult<Vec<InstantiatedRelation>> {
        let mut relations = Vec::new();
        for constraint in &self.constraints {
            relations.extend(self.instantiate(constraint, t)?);
        }
        Ok(relations)
    }

    /// A single constraint instantiated at time `t`.
    pub fn instantiate(
        &self,
        constraint: &IndexedConstraint,
        t: Time,
    ) -> MimosaResult<Vec<InstantiatedRelation>> {
        if !self.domain().contains(t) {
            return Err(MimosaError::ExtrapolationNotAllowed {
                target: t,
                start: 0.0,
                end: self.domain().tf(),
            });
        }
        Ok(constraint
            .instantiate(&self.context, t)?
            .into_iter()
            .map(|(region, relation)| InstantiatedRelation {
                constraint: constraint.name().to_string(),
                time: t,
                region,
                relation,
            })
            .collect())
    }

    /// Names of the variables whose derivative is fixed by a differential
    /// equation, in declaration order.
    pub fn differential_states(&self) -> MimosaResult<Vec<String>> {
        let relations = self.relations_at(0.0)?;
        Ok(self
            .variables()
            .iter()
            .filter(|v| {
                relations.iter().any(|r| {
                    r.relation
                        .defined_derivative()
                        .is_some_and(|d| d.name == v.name)
                })
            })
            .map(|v| v.name.clone())
            .collect())
    }

    pub fn summary(&self) -> ModelSummary {
        let variables = self.variables();
        ModelSummary {
            n_regions: self.regions().len(),
            n_variables: variables.len(),
            n_controls: variables
                .iter()
                .filter(|v| v.kind == VariableKind::Control)
                .count(),
            n_derivatives: variables.iter().filter(|v| v.has_derivative).count(),
            n_parameters: self.parameters().len(),
            n_global_constraints: self
                .constraints
                .iter()
                .filter(|c| c.index() == IndexSet::Time)
                .count(),
            n_regional_constraints: self
                .constraints
                .iter()
                .filter(|c| c.index() == IndexSet::TimeRegion)
                .count(),
            n_initial_conditions: self.initial_conditions.len(),
            constraint_names: self
                .constraint_names()
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    /// Wraps a variable valuation so that parameter symbols resolve to their
    /// declared values.
    pub fn valuation<'a>(
        &'a self,
        variables: &'a dyn Fn(&Symbol) -> Option<f64>,
    ) -> impl Fn(&Symbol) -> Option<f64> + 'a {
        move |symbol| match symbol {
            Symbol::Parameter(p) => self.parameter_value(&p.name, p.region).ok(),
            other => variables(other),
        }
    }
}
